use common::{
    scaledobject::{ScaleTarget, ScaleTriggers, ScaledObject, ScaledObjectAuthRef, ScaledObjectSpec},
    trigger::Trigger,
    Error, Result,
};
use kube::{api::ObjectMeta, Resource, ResourceExt};
use std::collections::BTreeMap;

/// Name of the ScaledObject derived from a Trigger name
#[must_use] pub fn scaled_object_name(trigger_name: &str) -> String {
    format!("{}-scaled-object", trigger_name)
}

/// Name of the Deployment dispatching events for a Trigger
#[must_use] pub fn dispatcher_name(trigger_name: &str) -> String {
    format!("{}-dispatcher", trigger_name)
}

// Has to stay in sync with the secret published by the rabbitmq broker controller
#[must_use] pub fn broker_secret_name(broker_name: &str) -> String {
    format!("{}-broker-rabbit", broker_name)
}

// Has to stay in sync with the queue the rabbitmq broker controller declares per Trigger
#[must_use] pub fn queue_name(namespace: &str, trigger_name: &str) -> String {
    format!("t.{}.{}", namespace, trigger_name)
}

/// Computes the ScaledObject driving the dispatcher of the given Trigger.
///
/// Reads nothing but the trigger: calling it twice with the same input
/// yields the same object, cluster state never changes the output.
pub fn dispatcher_scaled_object(trigger: &Trigger) -> Result<ScaledObject> {
    let name = trigger.name_any();
    let namespace = trigger
        .namespace()
        .ok_or(Error::MissingObjectKey("metadata.namespace"))?;
    let owner = trigger
        .controller_owner_ref(&())
        .ok_or(Error::MissingObjectKey("metadata.uid"))?;

    let scaler_metadata = BTreeMap::from([
        ("queueName".to_string(), queue_name(&namespace, &name)),
        ("mode".to_string(), "QueueLength".to_string()),
        ("value".to_string(), trigger.queue_length().to_string()),
    ]);

    Ok(ScaledObject {
        metadata: ObjectMeta {
            name: Some(scaled_object_name(&name)),
            namespace: Some(namespace),
            labels: Some(BTreeMap::from([
                ("eventing.knative.dev/broker".to_string(), trigger.spec.broker.clone()),
                ("eventing.knative.dev/trigger".to_string(), name.clone()),
            ])),
            owner_references: Some(vec![owner]),
            ..ObjectMeta::default()
        },
        spec: ScaledObjectSpec {
            scale_target_ref: ScaleTarget {
                name: dispatcher_name(&name),
                api_version: Some("apps/v1".to_string()),
                kind: Some("Deployment".to_string()),
                env_source_container_name: None,
            },
            polling_interval: Some(trigger.polling_interval()),
            cooldown_period: Some(trigger.cooldown_period()),
            min_replica_count: Some(trigger.min_replica_count()),
            max_replica_count: Some(trigger.max_replica_count()),
            triggers: vec![ScaleTriggers {
                trigger_type: "rabbitmq".to_string(),
                name: None,
                metadata: scaler_metadata,
                authentication_ref: Some(ScaledObjectAuthRef {
                    name: broker_secret_name(&trigger.spec.broker),
                    kind: None,
                }),
            }],
        },
        status: None,
    })
}
