use crate::{Condition, KReference};
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Annotation routing each Broker to the controller implementation managing it
pub const BROKER_CLASS_ANNOTATION: &str = "eventing.knative.dev/broker.class";

/// Event-routing mesh the Triggers subscribe to
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    kind = "Broker",
    status = "BrokerStatus",
    group = "eventing.knative.dev",
    version = "v1",
    namespaced
)]
#[kube(doc = "Custom resource representing an event-routing mesh")]
#[serde(rename_all = "camelCase")]
pub struct BrokerSpec {
    /// Implementation specific configuration object
    pub config: Option<KReference>,
}

/// The status object of `Broker`
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokerStatus {
    /// Generation last processed by the broker controller
    pub observed_generation: Option<i64>,
    /// Broker Conditions
    pub conditions: Option<Vec<Condition>>,
}

impl Broker {
    /// Class annotation value, when the broker carries one
    pub fn broker_class(&self) -> Option<&String> {
        self.annotations().get(BROKER_CLASS_ANNOTATION)
    }
}
