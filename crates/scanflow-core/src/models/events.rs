/// EventBridge payloads the triggers react to
///
/// Only the fields the handlers consume are modeled; everything else in the
/// event is ignored during deserialization. Missing structure (no `detail`,
/// no `containers`) deserializes to an empty work list instead of failing,
/// so irrelevant deliveries become no-ops.
use serde::Deserialize;

/// ECR image action event, delivered on image pushes.
#[derive(Debug, Clone, Deserialize)]
pub struct EcrPushEvent {
    pub account: String,
    pub region: String,
    #[serde(default)]
    pub detail: Option<EcrPushDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EcrPushDetail {
    #[serde(rename = "repository-name")]
    pub repository_name: String,
    #[serde(rename = "image-tag")]
    pub image_tag: String,
}

impl EcrPushEvent {
    /// ECR registry host for the event's account and region.
    pub fn registry(&self) -> String {
        format!("{}.dkr.ecr.{}.amazonaws.com", self.account, self.region)
    }

    /// Fully qualified reference of the pushed image, `None` when the event
    /// carries no push details.
    pub fn image(&self) -> Option<String> {
        self.detail.as_ref().map(|detail| {
            format!(
                "{}/{}:{}",
                self.registry(),
                detail.repository_name,
                detail.image_tag
            )
        })
    }
}

/// ECS task state change event.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStateEvent {
    pub account: String,
    pub region: String,
    #[serde(default)]
    pub detail: Option<TaskStateDetail>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStateDetail {
    #[serde(default)]
    pub task_definition_arn: Option<String>,
    #[serde(default)]
    pub containers: Option<Vec<ContainerStateChange>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContainerStateChange {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl TaskStateEvent {
    /// Container images in list order; containers without an `image` field
    /// are skipped.
    pub fn container_images(&self) -> impl Iterator<Item = &str> + '_ {
        self.containers()
            .iter()
            .filter_map(|container| container.image.as_deref())
    }

    /// `(image, container name)` pairs in list order, skipping containers
    /// without an `image` field.
    pub fn named_container_images(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.containers().iter().filter_map(|container| {
            container
                .image
                .as_deref()
                .map(|image| (image, container.name.as_str()))
        })
    }

    fn containers(&self) -> &[ContainerStateChange] {
        self.detail
            .as_ref()
            .and_then(|detail| detail.containers.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_event() -> EcrPushEvent {
        serde_json::from_value(serde_json::json!({
            "version": "0",
            "detail-type": "ECR Image Action",
            "source": "aws.ecr",
            "account": "845151661675",
            "region": "eu-west-1",
            "detail": {
                "result": "SUCCESS",
                "repository-name": "ecr-trigger",
                "image-digest": "",
                "action-type": "PUSH",
                "image-tag": "latest"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_registry_host_from_account_and_region() {
        assert_eq!(
            push_event().registry(),
            "845151661675.dkr.ecr.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn test_image_reference_from_push_detail() {
        assert_eq!(
            push_event().image().unwrap(),
            "845151661675.dkr.ecr.eu-west-1.amazonaws.com/ecr-trigger:latest"
        );
    }

    #[test]
    fn test_push_event_without_detail_has_no_image() {
        let event: EcrPushEvent = serde_json::from_value(serde_json::json!({
            "account": "845151661675",
            "region": "eu-west-1"
        }))
        .unwrap();

        assert!(event.image().is_none());
    }

    #[test]
    fn test_container_images_in_list_order() {
        let event: TaskStateEvent = serde_json::from_value(serde_json::json!({
            "account": "000000000",
            "region": "eu-west-3",
            "detail": {
                "taskDefinitionArn": "arn:aws:ecs:eu-west-3:000000000:task-definition/agent:1",
                "containers": [
                    { "name": "sysdig-agent", "image": "sysdig/agent", "cpu": "0" },
                    { "name": "alpine", "image": "alpine" }
                ]
            }
        }))
        .unwrap();

        let images: Vec<&str> = event.container_images().collect();
        assert_eq!(images, vec!["sysdig/agent", "alpine"]);

        let named: Vec<(&str, &str)> = event.named_container_images().collect();
        assert_eq!(
            named,
            vec![("sysdig/agent", "sysdig-agent"), ("alpine", "alpine")]
        );
    }

    #[test]
    fn test_containers_without_image_are_skipped() {
        let event: TaskStateEvent = serde_json::from_value(serde_json::json!({
            "account": "000000000",
            "region": "eu-west-3",
            "detail": {
                "containers": [
                    { "name": "sidecar" },
                    { "name": "alpine", "image": "alpine" }
                ]
            }
        }))
        .unwrap();

        let images: Vec<&str> = event.container_images().collect();
        assert_eq!(images, vec!["alpine"]);
    }

    #[test]
    fn test_missing_detail_or_containers_yields_nothing() {
        let no_detail: TaskStateEvent = serde_json::from_value(serde_json::json!({
            "account": "000000000",
            "region": "eu-west-3"
        }))
        .unwrap();
        assert_eq!(no_detail.container_images().count(), 0);

        let no_containers: TaskStateEvent = serde_json::from_value(serde_json::json!({
            "account": "000000000",
            "region": "eu-west-3",
            "detail": { "lastStatus": "PROVISIONING" }
        }))
        .unwrap();
        assert_eq!(no_containers.container_images().count(), 0);
    }
}
