use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType};

/// Reason carried by every normal event this controller emits
pub static TRIGGER_RECONCILED: &str = "TriggerReconciled";

#[must_use] pub fn scaled_object_created(trigger_name: &String, child_name: &String, child: Option<ObjectReference>) -> Event {
    Event {
        type_: EventType::Normal,
        reason: TRIGGER_RECONCILED.to_string(),
        note: Some(format!("Creating `{}` ScaledObject for `{}` Trigger", child_name, trigger_name)),
        action: format!("Creating `{}` ScaledObject", child_name),
        secondary: child,
    }
}

#[must_use] pub fn scaled_object_updated(trigger_name: &String, child_name: &String, child: Option<ObjectReference>) -> Event {
    Event {
        type_: EventType::Normal,
        reason: TRIGGER_RECONCILED.to_string(),
        note: Some(format!("Updating `{}` ScaledObject for `{}` Trigger", child_name, trigger_name)),
        action: format!("Updating `{}` ScaledObject", child_name),
        secondary: child,
    }
}
