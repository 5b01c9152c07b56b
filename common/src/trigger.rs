use crate::{Condition, Destination};
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Annotation holding the lower replica bound of the dispatcher
pub const MIN_SCALE_ANNOTATION: &str = "autoscaling.knative.dev/minScale";
/// Annotation holding the upper replica bound of the dispatcher
pub const MAX_SCALE_ANNOTATION: &str = "autoscaling.knative.dev/maxScale";
/// Annotation overriding the scaler polling interval (seconds)
pub const POLLING_INTERVAL_ANNOTATION: &str = "keda.autoscaling.knative.dev/pollingInterval";
/// Annotation overriding the scale-to-zero cooldown (seconds)
pub const COOLDOWN_PERIOD_ANNOTATION: &str = "keda.autoscaling.knative.dev/cooldownPeriod";
/// Annotation overriding the queue depth one dispatcher replica should absorb
pub const QUEUE_LENGTH_ANNOTATION: &str = "keda.autoscaling.knative.dev/queueLength";

pub const DEFAULT_MIN_SCALE: i32 = 0;
pub const DEFAULT_MAX_SCALE: i32 = 1;
pub const DEFAULT_POLLING_INTERVAL: i32 = 30;
pub const DEFAULT_COOLDOWN_PERIOD: i32 = 300;
pub const DEFAULT_QUEUE_LENGTH: i32 = 20;

/// Filter on the attributes of dispatched events
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TriggerFilter {
    /// Exact-match constraints on event context attributes
    pub attributes: Option<BTreeMap<String, String>>,
}

/// Subscription of an event sink to a Broker
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    kind = "Trigger",
    status = "TriggerStatus",
    group = "eventing.knative.dev",
    version = "v1",
    namespaced
)]
#[kube(doc = "Custom resource subscribing an event sink to a Broker")]
#[serde(rename_all = "camelCase")]
pub struct TriggerSpec {
    /// Name of the Broker, in the trigger namespace, events are consumed from
    pub broker: String,
    /// Filter applied before dispatching an event
    pub filter: Option<TriggerFilter>,
    /// Sink the matching events are dispatched to
    pub subscriber: Destination,
}

/// The status object of `Trigger`
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TriggerStatus {
    /// Generation last processed by the trigger controller
    pub observed_generation: Option<i64>,
    /// Trigger Conditions
    pub conditions: Option<Vec<Condition>>,
    /// Resolved address of the subscriber
    pub subscriber_uri: Option<String>,
}

impl Trigger {
    /// Lower replica bound for the dispatcher, from the autoscaling annotations
    pub fn min_replica_count(&self) -> i32 {
        self.annotation_or(MIN_SCALE_ANNOTATION, DEFAULT_MIN_SCALE)
    }

    /// Upper replica bound for the dispatcher
    pub fn max_replica_count(&self) -> i32 {
        self.annotation_or(MAX_SCALE_ANNOTATION, DEFAULT_MAX_SCALE)
    }

    /// Seconds between queue-depth polls
    pub fn polling_interval(&self) -> i32 {
        self.annotation_or(POLLING_INTERVAL_ANNOTATION, DEFAULT_POLLING_INTERVAL)
    }

    /// Seconds without activity before scaling back down
    pub fn cooldown_period(&self) -> i32 {
        self.annotation_or(COOLDOWN_PERIOD_ANNOTATION, DEFAULT_COOLDOWN_PERIOD)
    }

    /// Queue depth one dispatcher replica should absorb
    pub fn queue_length(&self) -> i32 {
        self.annotation_or(QUEUE_LENGTH_ANNOTATION, DEFAULT_QUEUE_LENGTH)
    }

    // Unparsable values fall back to the default so the computed spec stays total
    fn annotation_or(&self, key: &str, default: i32) -> i32 {
        self.annotations()
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
