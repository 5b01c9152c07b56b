use common::{
    derivative::derivative_eq, get_client_name, scaledobject::ScaledObject, Result,
};
use kube::{
    api::{Api, PostParams},
    Client, ResourceExt,
};

/// Convergence decision for one pass, exactly one store write at most
#[derive(Debug)]
pub enum Plan {
    /// Nothing with the desired identity yet: create it
    Create,
    /// Spec drifted: replace with the carried object
    Update(ScaledObject),
    /// Current spec already covers the desired one
    Unchanged,
}

/// What a convergence pass did to the store, carrying the stored object back
#[derive(Debug)]
pub enum Outcome {
    Created(ScaledObject),
    Updated(ScaledObject),
    Unchanged,
}

/// Decides between create, update and no-op.
///
/// The comparison is one directional: fields the desired spec sets must match,
/// anything else the cluster copy carries (defaulted or injected) is left
/// alone. An update keeps the full cluster copy, metadata included, and only
/// swaps the spec, so resourceVersion still guards the write.
pub fn plan(desired: &ScaledObject, current: Option<&ScaledObject>) -> Result<Plan> {
    let Some(current) = current else {
        return Ok(Plan::Create);
    };
    if derivative_eq(&desired.spec, &current.spec)? {
        return Ok(Plan::Unchanged);
    }
    let mut updated = current.clone();
    updated.spec = desired.spec.clone();
    Ok(Plan::Update(updated))
}

pub struct ScaledObjectHandler {
    api: Api<ScaledObject>,
}

impl ScaledObjectHandler {
    #[must_use] pub fn new(cl: Client, ns: &str) -> ScaledObjectHandler {
        ScaledObjectHandler {
            api: Api::namespaced(cl, ns),
        }
    }

    pub async fn get_opt(&self, name: &str) -> Result<Option<ScaledObject>> {
        Ok(self.api.get_opt(name).await?)
    }

    pub async fn create(&self, so: &ScaledObject) -> Result<ScaledObject> {
        Ok(self.api.create(&self.params(), so).await?)
    }

    pub async fn replace(&self, so: &ScaledObject) -> Result<ScaledObject> {
        Ok(self.api.replace(&so.name_any(), &self.params(), so).await?)
    }

    fn params(&self) -> PostParams {
        PostParams {
            dry_run: false,
            field_manager: Some(get_client_name()),
        }
    }
}

/// Converges the stored ScaledObject onto the desired one.
///
/// Store errors bubble up untouched; retrying is the callers call.
pub async fn converge(handler: &ScaledObjectHandler, desired: ScaledObject) -> Result<Outcome> {
    let current = handler.get_opt(&desired.name_any()).await?;
    match plan(&desired, current.as_ref())? {
        Plan::Create => Ok(Outcome::Created(handler.create(&desired).await?)),
        Plan::Update(updated) => Ok(Outcome::Updated(handler.replace(&updated).await?)),
        Plan::Unchanged => Ok(Outcome::Unchanged),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::dispatcher_scaled_object;
    use common::trigger::{Trigger, TriggerSpec, MIN_SCALE_ANNOTATION};
    use common::{Destination, KReference};

    fn trigger(annotations: &[(&str, &str)]) -> Trigger {
        let mut trigger = Trigger::new("t1", TriggerSpec {
            broker: "b1".to_string(),
            filter: None,
            subscriber: Destination {
                reference: Some(KReference {
                    api_version: Some("serving.knative.dev/v1".to_string()),
                    kind: "Service".to_string(),
                    name: "receiver".to_string(),
                    namespace: None,
                }),
                uri: None,
            },
        });
        trigger.metadata.namespace = Some("ns".to_string());
        trigger.metadata.uid = Some("5e3a1c57-0cae-44d9-b55e-a09e28b38368".to_string());
        trigger.metadata.annotations = Some(
            annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        trigger
    }

    // The cluster copy of a freshly created descriptor: same spec, plus the
    // metadata and defaults the apiserver fills in
    fn stored(desired: &ScaledObject) -> ScaledObject {
        let mut current = desired.clone();
        current.metadata.resource_version = Some("4242".to_string());
        current.metadata.generation = Some(1);
        current
    }

    #[test]
    fn test_absent_descriptor_is_created() {
        let desired = dispatcher_scaled_object(&trigger(&[])).unwrap();
        assert!(matches!(plan(&desired, None).unwrap(), Plan::Create));
    }

    #[test]
    fn test_matching_descriptor_is_left_alone() {
        let desired = dispatcher_scaled_object(&trigger(&[])).unwrap();
        let current = stored(&desired);
        assert!(matches!(plan(&desired, Some(&current)).unwrap(), Plan::Unchanged));
    }

    #[test]
    fn test_cluster_side_additions_are_not_drift() {
        let desired = dispatcher_scaled_object(&trigger(&[])).unwrap();
        let mut current = stored(&desired);
        // A mutating webhook naming the scaler must not trigger a rewrite
        current.spec.triggers[0].name = Some("injected".to_string());
        assert!(matches!(plan(&desired, Some(&current)).unwrap(), Plan::Unchanged));
    }

    #[test]
    fn test_bound_change_is_converged_with_one_update() {
        let current = stored(&dispatcher_scaled_object(&trigger(&[])).unwrap());
        assert_eq!(current.spec.min_replica_count, Some(0));

        let desired = dispatcher_scaled_object(&trigger(&[(MIN_SCALE_ANNOTATION, "1")])).unwrap();
        let Plan::Update(updated) = plan(&desired, Some(&current)).unwrap() else {
            panic!("expected an update");
        };
        assert_eq!(updated.spec.min_replica_count, Some(1));
        // Everything but the spec comes from the cluster copy
        assert_eq!(updated.metadata.resource_version.as_deref(), Some("4242"));
        assert_eq!(updated.metadata.generation, Some(1));
        assert_eq!(updated.metadata.name.as_deref(), Some("t1-scaled-object"));
    }

    #[test]
    fn test_update_keeps_foreign_metadata() {
        let mut current = stored(&dispatcher_scaled_object(&trigger(&[])).unwrap());
        current
            .metadata
            .labels
            .get_or_insert_with(Default::default)
            .insert("team".to_string(), "billing".to_string());

        let desired = dispatcher_scaled_object(&trigger(&[(MIN_SCALE_ANNOTATION, "2")])).unwrap();
        let Plan::Update(updated) = plan(&desired, Some(&current)).unwrap() else {
            panic!("expected an update");
        };
        assert_eq!(
            updated.metadata.labels.unwrap().get("team"),
            Some(&"billing".to_string())
        );
    }
}
