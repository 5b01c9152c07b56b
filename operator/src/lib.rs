use async_trait::async_trait;
use kube::runtime::controller::Action;
use manager::Context;
use std::sync::Arc;

pub use common::{Error, Result};

#[async_trait]
pub trait Reconciler {
    async fn reconcile(&self, ctx: Arc<Context>) -> Result<Action>;
    async fn cleanup(&self, ctx: Arc<Context>) -> Result<Action>;
}

/// Broker class handled when BROKER_CLASS is not set
pub static DEFAULT_BROKER_CLASS: &str = "RabbitMQBroker";

pub mod events;
pub mod resources;
pub mod scaledobject;
pub mod trigger;

/// State machinery for kube, as exposeable to actix
pub mod manager;
pub use manager::Manager;

/// Reconciled resource and its collaborators
pub use common::{broker::Broker, scaledobject::ScaledObject};
pub use trigger::Trigger;

/// Log and trace integrations
pub mod telemetry;

/// Metrics
mod metrics;
pub use metrics::Metrics;
