use crate::{trigger, Metrics, ScaledObject, Trigger, DEFAULT_BROKER_CLASS};
use chrono::{DateTime, Utc};
use common::context::get_reporter;
use futures::{future::BoxFuture, FutureExt, StreamExt};
use kube::{
    api::{Api, ListParams},
    client::Client,
    runtime::{
        controller::Controller,
        events::Reporter,
        watcher::Config,
    },
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

// Context for our reconciler
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client
    pub client: Client,
    /// Broker class this controller instance feeds scalers for
    pub broker_class: String,
    /// Diagnostics read by the web server
    pub diagnostics: Arc<RwLock<Diagnostics>>,
    /// Prometheus metrics
    pub metrics: Metrics,
}

/// Diagnostics to be exposed by the web server
#[derive(Clone, Serialize)]
pub struct Diagnostics {
    #[serde(deserialize_with = "from_ts")]
    pub last_event: DateTime<Utc>,
    #[serde(skip)]
    pub reporter: Reporter,
}
impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            last_event: Utc::now(),
            reporter: get_reporter(),
        }
    }
}

/// Data owned by the Manager
#[derive(Clone, Default)]
pub struct Manager {
    /// Diagnostics populated by the reconciler
    diagnostics: Arc<RwLock<Diagnostics>>,
    /// Prometheus metrics shared with the reconciler
    metrics: Metrics,
}

/// Manager that owns a Controller for Trigger
impl Manager {
    /// Lifecycle initialization interface for app
    ///
    /// This returns a `Manager` that drives a `Controller` + a future to be awaited
    /// It is up to `main` to wait for the controller stream.
    pub async fn new() -> (Self, BoxFuture<'static, ()>) {
        let client = Client::try_default().await.expect("create client");
        let broker_class =
            std::env::var("BROKER_CLASS").unwrap_or_else(|_| DEFAULT_BROKER_CLASS.to_string());
        let manager = Manager::default();
        let context = Arc::new(Context {
            client: client.clone(),
            broker_class,
            metrics: manager.metrics.clone(),
            diagnostics: manager.diagnostics.clone(),
        });

        let triggers = Api::<Trigger>::all(client.clone());
        let scaled = Api::<ScaledObject>::all(client);
        // Ensure the collaborator CRDs are installed before loop-watching
        let _r = triggers
            .list(&ListParams::default().limit(1))
            .await
            .expect("is the Trigger crd installed? this controller sits next to knative-eventing");
        let _r = scaled
            .list(&ListParams::default().limit(1))
            .await
            .expect("is the ScaledObject crd installed? this controller needs a running keda");

        // All good. Start controller and return its future.
        let controller_triggers = Controller::new(triggers, Config::default().any_semantic())
            .owns(scaled, Config::default().any_semantic())
            .run(trigger::reconcile, trigger::error_policy, context)
            .filter_map(|x| async move { std::result::Result::ok(x) })
            .for_each(|_| futures::future::ready(()))
            .boxed();

        (manager, controller_triggers)
    }

    /// Metrics getter
    #[must_use] pub fn metrics(&self) -> String {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.metrics.registry)
            .expect("encode metrics to buffer");
        buffer
    }

    /// State getter
    pub async fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.read().await.clone()
    }
}
