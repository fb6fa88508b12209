/// Integration tests for the credentialed inline scan trigger
#[path = "common/mod.rs"]
mod common;

use scanflow_core::models::TaskStateEvent;
use scanflow_core::services::codebuild::{BuildParameter, BuildParameterKind, MockBuildService};
use scanflow_core::services::ecs::{
    ContainerDefinition, MockTaskDefinitionSource, RepositoryCredentials, TaskDefinition,
};
use scanflow_inline::handlers::credentialed_trigger::{CredentialedTriggerContext, handle};
use std::sync::Arc;

const TASK_DEFINITION_ARN: &str =
    "arn:aws:ecs:eu-west-3:000000000:task-definition/fargate-sysdig-agent:1";

fn container(name: &str, image: &str, secret: Option<&str>) -> ContainerDefinition {
    ContainerDefinition {
        name: name.to_string(),
        image: image.to_string(),
        repository_credentials: secret.map(|secret| RepositoryCredentials {
            credentials_parameter: secret.to_string(),
        }),
    }
}

fn context(
    builds: Arc<MockBuildService>,
    task_definitions: Arc<MockTaskDefinitionSource>,
) -> CredentialedTriggerContext {
    CredentialedTriggerContext {
        builds,
        task_definitions,
        project_name: "inline-scan-project".to_string(),
    }
}

#[tokio::test]
async fn test_injects_secret_parameters_for_containers_with_credentials() {
    let builds = Arc::new(MockBuildService::new());
    let task_definitions = Arc::new(MockTaskDefinitionSource::new().with_definition(
        TASK_DEFINITION_ARN,
        TaskDefinition {
            container_definitions: vec![
                container("sysdig-agent", "sysdig/agent", Some("arn:secret:x")),
                container("alpine", "alpine", None),
            ],
        },
    ));
    let event: TaskStateEvent = common::load_event("ecs-task-state-change.json");

    handle(&context(builds.clone(), task_definitions), event)
        .await
        .unwrap();

    let started = builds.started_builds().await;
    assert_eq!(started.len(), 2);

    assert_eq!(
        started[0].1,
        vec![
            BuildParameter::plaintext("ACCOUNT", "000000000"),
            BuildParameter::plaintext("REGION", "eu-west-3"),
            BuildParameter::plaintext("REPOSITORY", "sysdig/agent"),
            BuildParameter::secrets_manager("DOCKER_USER", "arn:secret:x", "username"),
            BuildParameter::secrets_manager("DOCKER_PASS", "arn:secret:x", "password"),
        ]
    );
    assert_eq!(started[0].1[3].value, "arn:secret:x:username");
    assert_eq!(started[0].1[3].kind, BuildParameterKind::SecretsManager);

    // The container without declared credentials builds without them
    assert_eq!(
        started[1].1,
        vec![
            BuildParameter::plaintext("ACCOUNT", "000000000"),
            BuildParameter::plaintext("REGION", "eu-west-3"),
            BuildParameter::plaintext("REPOSITORY", "alpine"),
        ]
    );
}

#[tokio::test]
async fn test_credentials_require_image_and_name_to_match() {
    let builds = Arc::new(MockBuildService::new());
    // Same images, different container names: nothing matches
    let task_definitions = Arc::new(MockTaskDefinitionSource::new().with_definition(
        TASK_DEFINITION_ARN,
        TaskDefinition {
            container_definitions: vec![
                container("renamed-agent", "sysdig/agent", Some("arn:secret:x")),
                container("renamed-alpine", "alpine", Some("arn:secret:y")),
            ],
        },
    ));
    let event: TaskStateEvent = common::load_event("ecs-task-state-change.json");

    handle(&context(builds.clone(), task_definitions), event)
        .await
        .unwrap();

    for (_, environment) in builds.started_builds().await {
        assert_eq!(environment.len(), 3);
        assert!(
            environment
                .iter()
                .all(|parameter| parameter.kind == BuildParameterKind::Plaintext)
        );
    }
}

#[tokio::test]
async fn test_describes_the_task_definition_once_per_container() {
    let builds = Arc::new(MockBuildService::new());
    let task_definitions = Arc::new(MockTaskDefinitionSource::new().with_definition(
        TASK_DEFINITION_ARN,
        TaskDefinition::default(),
    ));
    let event: TaskStateEvent = common::load_event("ecs-task-state-change.json");

    handle(&context(builds, task_definitions.clone()), event)
        .await
        .unwrap();

    assert_eq!(
        task_definitions.described_arns().await,
        vec![TASK_DEFINITION_ARN, TASK_DEFINITION_ARN]
    );
}

#[tokio::test]
async fn test_event_without_task_definition_arn_is_a_no_op() {
    let builds = Arc::new(MockBuildService::new());
    let task_definitions = Arc::new(MockTaskDefinitionSource::new());
    let event: TaskStateEvent = serde_json::from_str(
        r#"{
            "account": "000000000",
            "region": "eu-west-3",
            "detail": {
                "containers": [
                    { "name": "alpine", "image": "alpine" }
                ]
            }
        }"#,
    )
    .unwrap();

    handle(&context(builds.clone(), task_definitions.clone()), event)
        .await
        .unwrap();

    assert!(builds.started_builds().await.is_empty());
    assert!(task_definitions.described_arns().await.is_empty());
}
