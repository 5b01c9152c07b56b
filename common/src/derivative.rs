use crate::Result;
use serde::Serialize;
use serde_json::Value;

/// One-directional semantic comparison.
///
/// Every field `desired` sets must be present and matching in `current`;
/// fields only `current` carries (defaulted or injected server side) are
/// ignored. Null, empty strings, empty arrays and empty objects on the
/// desired side carry no opinion. Desired arrays must be a matching prefix
/// of the current ones.
pub fn deep_derivative(desired: &Value, current: &Value) -> bool {
    match (desired, current) {
        (Value::Null, _) => true,
        (Value::Object(desired), Value::Object(current)) => {
            desired.iter().all(|(key, value)| match value {
                Value::Null => true,
                value => current.get(key).is_some_and(|c| deep_derivative(value, c)),
            })
        }
        (Value::Array(desired), Value::Array(current)) => {
            desired.is_empty()
                || (desired.len() <= current.len()
                    && desired.iter().zip(current).all(|(d, c)| deep_derivative(d, c)))
        }
        (Value::String(desired), Value::String(current)) => desired.is_empty() || desired == current,
        (desired, current) => desired == current,
    }
}

/// Serializes both sides and applies [`deep_derivative`]
pub fn derivative_eq<T: Serialize>(desired: &T, current: &T) -> Result<bool> {
    Ok(deep_derivative(
        &serde_json::to_value(desired)?,
        &serde_json::to_value(current)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equal_objects_match() {
        let desired = json!({"minReplicaCount": 0, "pollingInterval": 30});
        assert!(deep_derivative(&desired, &desired.clone()));
    }

    #[test]
    fn test_extra_current_fields_are_ignored() {
        let desired = json!({"minReplicaCount": 0});
        let current = json!({"minReplicaCount": 0, "cooldownPeriod": 300, "advanced": {}});
        assert!(deep_derivative(&desired, &current));
    }

    #[test]
    fn test_value_divergence_is_detected() {
        let desired = json!({"minReplicaCount": 1});
        let current = json!({"minReplicaCount": 0});
        assert!(!deep_derivative(&desired, &current));
    }

    #[test]
    fn test_desired_field_missing_from_current() {
        let desired = json!({"maxReplicaCount": 5});
        let current = json!({"minReplicaCount": 0});
        assert!(!deep_derivative(&desired, &current));
    }

    #[test]
    fn test_null_desired_fields_carry_no_opinion() {
        let desired = json!({"minReplicaCount": 0, "cooldownPeriod": null});
        let current = json!({"minReplicaCount": 0});
        assert!(deep_derivative(&desired, &current));
    }

    #[test]
    fn test_empty_desired_string_carries_no_opinion() {
        assert!(deep_derivative(&json!({"mode": ""}), &json!({"mode": "QueueLength"})));
        assert!(!deep_derivative(&json!({"mode": "Rate"}), &json!({"mode": "QueueLength"})));
    }

    #[test]
    fn test_nested_objects_compare_per_field() {
        let desired = json!({"scaleTargetRef": {"name": "t1-dispatcher"}});
        let current = json!({"scaleTargetRef": {"name": "t1-dispatcher", "kind": "Deployment"}});
        assert!(deep_derivative(&desired, &current));
        let drifted = json!({"scaleTargetRef": {"name": "t2-dispatcher", "kind": "Deployment"}});
        assert!(!deep_derivative(&desired, &drifted));
    }

    #[test]
    fn test_desired_array_is_a_prefix_of_current() {
        let desired = json!({"triggers": [{"type": "rabbitmq"}]});
        let current = json!({"triggers": [{"type": "rabbitmq", "name": "q"}, {"type": "cpu"}]});
        assert!(deep_derivative(&desired, &current));
    }

    #[test]
    fn test_desired_array_longer_than_current() {
        let desired = json!({"triggers": [{"type": "rabbitmq"}, {"type": "cpu"}]});
        let current = json!({"triggers": [{"type": "rabbitmq"}]});
        assert!(!deep_derivative(&desired, &current));
    }

    #[test]
    fn test_empty_desired_array_carries_no_opinion() {
        let desired = json!({"triggers": []});
        let current = json!({"triggers": [{"type": "rabbitmq"}]});
        assert!(deep_derivative(&desired, &current));
    }

    #[test]
    fn test_kind_mismatch_never_matches() {
        assert!(!deep_derivative(&json!({"a": 1}), &json!([1])));
        assert!(!deep_derivative(&json!("30"), &json!(30)));
    }

    #[test]
    fn test_zero_is_an_opinion() {
        // 0 is a real bound, not an unset marker
        let desired = json!({"minReplicaCount": 0});
        let current = json!({"minReplicaCount": 1});
        assert!(!deep_derivative(&desired, &current));
    }

    #[test]
    fn test_typed_specs_compare_through_serialization() {
        use crate::scaledobject::{ScaleTarget, ScaledObjectSpec};

        let desired = ScaledObjectSpec {
            scale_target_ref: ScaleTarget {
                name: "t1-dispatcher".to_string(),
                api_version: None,
                kind: None,
                env_source_container_name: None,
            },
            polling_interval: None,
            cooldown_period: None,
            min_replica_count: Some(0),
            max_replica_count: None,
            triggers: vec![],
        };
        let mut current = desired.clone();
        current.polling_interval = Some(30);
        assert!(derivative_eq(&desired, &current).unwrap());
        current.min_replica_count = Some(1);
        assert!(!derivative_eq(&desired, &current).unwrap());
    }
}
