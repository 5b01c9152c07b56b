use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("SerializationError: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("K8s error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Finalizer error: {0}")]
    // NB: awkward type because finalizer::Error embeds the reconciler error (which is this)
    // so boxing this error to break cycles
    FinalizerError(#[from] Box<kube::runtime::finalizer::Error<Error>>),

    #[error("MissingObjectKey: {0}")]
    MissingObjectKey(&'static str),

    #[error("Error: {0}")]
    Other(String),
}
impl Error {
    pub fn metric_label(&self) -> String {
        format!("{self:?}").to_lowercase()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub mod broker;
pub mod context;
pub mod derivative;
pub mod scaledobject;
pub mod trigger;
pub use context::get_client_name;


/// KReference points to an addressable k8s object
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KReference {
    /// ApiVersion of the target
    pub api_version: Option<String>,
    /// Kind of the target
    pub kind: String,
    /// Name of the target
    pub name: String,
    /// Namespace is only needed for cross-namespace references
    pub namespace: Option<String>,
}

/// Destination of dispatched events, either a reference or a bare URI
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    /// Addressable object the events are sent to
    #[serde(rename = "ref")]
    pub reference: Option<KReference>,
    /// Absolute URI, or a path relative to the resolved address of `ref`
    pub uri: Option<String>,
}

/// Latest observation of one aspect of an object state
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of the condition
    #[serde(rename = "type")]
    pub condition_type: String,
    /// Status ("True", "False" or "Unknown") of the condition
    pub status: String,
    /// One-word reason for the last transition
    pub reason: Option<String>,
    /// Human-readable details about the transition
    pub message: Option<String>,
    /// LastTransitionTime is the time the condition was last observed
    pub last_transition_time: Option<DateTime<Utc>>,
}
