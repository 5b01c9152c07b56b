use crate::Condition;
use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Workload the autoscaler drives
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScaleTarget {
    /// Name of the target resource
    pub name: String,
    /// ApiVersion of the target, apps/v1 unless set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    /// Kind of the target, Deployment unless set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Container to resolve environment references from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_source_container_name: Option<String>,
}

/// Reference to the TriggerAuthentication carrying the scaler credentials
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScaledObjectAuthRef {
    /// Name of the TriggerAuthentication
    pub name: String,
    /// TriggerAuthentication (the default) or ClusterTriggerAuthentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One scaler feeding the autoscaling decision
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScaleTriggers {
    /// Scaler type, `rabbitmq` for dispatcher queues
    #[serde(rename = "type")]
    pub trigger_type: String,
    /// Optional name of the scaler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Scaler specific configuration
    pub metadata: BTreeMap<String, String>,
    /// Credentials source for the scaler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_ref: Option<ScaledObjectAuthRef>,
}

/// Event-driven autoscaling policy for one workload
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    kind = "ScaledObject",
    status = "ScaledObjectStatus",
    shortname = "so",
    group = "keda.sh",
    version = "v1alpha1",
    namespaced
)]
#[kube(doc = "Custom resource binding scalers to a workload")]
#[serde(rename_all = "camelCase")]
pub struct ScaledObjectSpec {
    /// Workload the autoscaler drives
    pub scale_target_ref: ScaleTarget,
    /// Seconds between scaler polls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polling_interval: Option<i32>,
    /// Seconds to wait after the last activity before scaling back to the minimum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_period: Option<i32>,
    /// Lower replica bound, 0 allows scale to zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_replica_count: Option<i32>,
    /// Upper replica bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_replica_count: Option<i32>,
    /// Scalers feeding the autoscaling decision
    pub triggers: Vec<ScaleTriggers>,
}

/// The status object of `ScaledObject`, as far as this controller reads it
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScaledObjectStatus {
    /// Kind of the resolved scale target
    pub scale_target_kind: Option<String>,
    /// Replica count before the autoscaler took over
    pub original_replica_count: Option<i32>,
    /// Last time a scaler reported activity
    pub last_active_time: Option<DateTime<Utc>>,
    /// ScaledObject Conditions
    pub conditions: Option<Vec<Condition>>,
}
