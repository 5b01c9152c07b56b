use crate::{
    events, manager::Context, resources,
    scaledobject::{converge, Outcome, ScaledObjectHandler},
    telemetry, Error, Reconciler, Result,
};
use async_trait::async_trait;
use chrono::Utc;
use common::broker::Broker;
use kube::{
    api::{Api, Resource, ResourceExt},
    runtime::{
        controller::Action,
        events::Recorder,
        finalizer::{finalizer, Event as Finalizer},
    },
};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{Span, error, field, info, instrument, warn};

pub use common::trigger::{Trigger, TriggerStatus};

static TRIGGER_FINALIZER: &str = "triggers.crescendo.solidite.fr";

#[instrument(skip(ctx, trig), fields(trace_id))]
pub async fn reconcile(trig: Arc<Trigger>, ctx: Arc<Context>) -> Result<Action> {
    let trace_id = telemetry::get_trace_id();
    Span::current().record("trace_id", &field::display(&trace_id));
    let _mes = ctx.metrics.trigger.count_and_measure(&trace_id);
    let ns = trig.namespace().unwrap_or_default();
    let triggers: Api<Trigger> = Api::namespaced(ctx.client.clone(), &ns);

    info!("Reconciling Trigger \"{}\"", trig.name_any());
    finalizer(&triggers, TRIGGER_FINALIZER, trig, |event| async {
        match event {
            Finalizer::Apply(trig) => trig.reconcile(ctx.clone()).await,
            Finalizer::Cleanup(trig) => trig.cleanup(ctx.clone()).await,
        }
    }).await.map_err(|e| Error::FinalizerError(Box::new(e)))
}

/// Whether this controller owns a trigger's broker
#[derive(Debug, PartialEq, Eq)]
pub enum Gate {
    /// Broker there and annotated with our class: do the work
    Proceed,
    /// Broker not there (yet): nothing to do until it shows up
    NotReady,
    /// Somebody else's broker: stay out of the way
    WrongClass,
}

/// Class check routing triggers between broker implementations.
///
/// A broker without the class annotation counts as foreign, never as ours.
#[must_use] pub fn gate(broker: Option<&Broker>, broker_class: &str) -> Gate {
    match broker {
        None => Gate::NotReady,
        Some(broker) => {
            if broker.broker_class().is_some_and(|class| class == broker_class) {
                Gate::Proceed
            } else {
                Gate::WrongClass
            }
        }
    }
}

#[async_trait]
impl Reconciler for Trigger {
    // Reconcile (for non-finalizer related changes)
    async fn reconcile(&self, ctx: Arc<Context>) -> Result<Action> {
        ctx.diagnostics.write().await.last_event = Utc::now();
        let name = self.name_any();
        let ns = self.namespace().unwrap_or_default();

        let brokers: Api<Broker> = Api::namespaced(ctx.client.clone(), &ns);
        let broker = match brokers.get_opt(&self.spec.broker).await {
            Ok(broker) => broker,
            Err(e) => {
                // Not ours to fail on: log it and let the periodic requeue retry
                error!("Failed to get Broker \"{}/{}\": {e}", ns, self.spec.broker);
                return Ok(Action::requeue(Duration::from_secs(5 * 60)));
            }
        };

        match gate(broker.as_ref(), &ctx.broker_class) {
            Gate::NotReady => {
                // Once the Broker comes available, or the Trigger changes, we get requeued
                return Ok(Action::requeue(Duration::from_secs(5 * 60)));
            }
            Gate::WrongClass => {
                info!("Ignoring trigger {}/{}", ns, name);
                return Ok(Action::requeue(Duration::from_secs(15 * 60)));
            }
            Gate::Proceed => {}
        }

        // TODO: Check for KEDA annotations before proceeding, and clean the
        // ScaledObject up when they get removed
        let desired = resources::dispatcher_scaled_object(self)?;
        let handler = ScaledObjectHandler::new(ctx.client.clone(), &ns);
        let reporter = ctx.diagnostics.read().await.reporter.clone();
        let recorder = Recorder::new(ctx.client.clone(), reporter, self.object_ref(&()));

        match converge(&handler, desired).await? {
            Outcome::Created(so) => {
                info!("Creating {} ScaledObject", so.name_any());
                recorder.publish(
                    events::scaled_object_created(&name, &so.name_any(), Some(so.object_ref(&())))
                ).await.map_err(Error::KubeError)?;
            }
            Outcome::Updated(so) => {
                info!("Updating {} ScaledObject", so.name_any());
                recorder.publish(
                    events::scaled_object_updated(&name, &so.name_any(), Some(so.object_ref(&())))
                ).await.map_err(Error::KubeError)?;
            }
            Outcome::Unchanged => {}
        }
        // If no events were received, check back every 15 minutes
        Ok(Action::requeue(Duration::from_secs(15 * 60)))
    }

    // Reconcile with finalize cleanup (the object was deleted)
    async fn cleanup(&self, ctx: Arc<Context>) -> Result<Action> {
        ctx.diagnostics.write().await.last_event = Utc::now();
        // Nothing to tear down by hand: the ScaledObject carries an owner
        // reference and follows its Trigger out
        Ok(Action::await_change())
    }
}

#[must_use] pub fn error_policy(trig: Arc<Trigger>, error: &Error, ctx: Arc<Context>) -> Action {
    warn!("reconcile failed for {:?}: {:?}", trig.metadata.name, error);
    ctx.metrics.trigger.reconcile_failure(&trig, error);
    Action::requeue(Duration::from_secs(5 * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::broker::{BrokerSpec, BROKER_CLASS_ANNOTATION};

    fn broker(class: Option<&str>) -> Broker {
        let mut broker = Broker::new("b1", BrokerSpec { config: None });
        if let Some(class) = class {
            broker.metadata.annotations = Some(
                [(BROKER_CLASS_ANNOTATION.to_string(), class.to_string())]
                    .into_iter()
                    .collect(),
            );
        }
        broker
    }

    #[test]
    fn test_missing_broker_waits_without_failing() {
        assert_eq!(gate(None, "keda.scaling.knative.dev"), Gate::NotReady);
    }

    #[test]
    fn test_foreign_class_is_skipped() {
        let broker = broker(Some("other-class"));
        assert_eq!(gate(Some(&broker), "keda.scaling.knative.dev"), Gate::WrongClass);
    }

    #[test]
    fn test_unannotated_broker_is_skipped() {
        let broker = broker(None);
        assert_eq!(gate(Some(&broker), "RabbitMQBroker"), Gate::WrongClass);
    }

    #[test]
    fn test_matching_class_proceeds() {
        let broker = broker(Some("RabbitMQBroker"));
        assert_eq!(gate(Some(&broker), "RabbitMQBroker"), Gate::Proceed);
    }
}
