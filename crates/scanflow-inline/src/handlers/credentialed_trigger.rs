/// Credentialed inline scan trigger
///
/// Same build-per-image fan-out as the basic trigger, but each container is
/// first matched against its task definition: when the matching container
/// definition declares repository credentials, the referenced secret is
/// injected into the build as DOCKER_USER/DOCKER_PASS Secrets Manager
/// parameters. A container without declared credentials simply builds
/// without them.
use lambda_runtime::{Error, LambdaEvent};
use scanflow_core::config::{CODE_BUILD_PROJECT_NAME, ConfigResolver};
use scanflow_core::constants::{
    BUILD_VAR_ACCOUNT, BUILD_VAR_DOCKER_PASS, BUILD_VAR_DOCKER_USER, BUILD_VAR_REGION,
    BUILD_VAR_REPOSITORY, SECRET_FIELD_PASSWORD, SECRET_FIELD_USERNAME,
};
use scanflow_core::error::ScanflowError;
use scanflow_core::models::TaskStateEvent;
use scanflow_core::services::codebuild::{BuildParameter, BuildService, CodeBuildService};
use scanflow_core::services::ecs::{EcsTaskDefinitionSource, TaskDefinitionSource};
use scanflow_core::services::ssm::SsmParameterStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Credentialed trigger context
pub struct CredentialedTriggerContext {
    pub builds: Arc<dyn BuildService>,
    pub task_definitions: Arc<dyn TaskDefinitionSource>,
    pub project_name: String,
}

impl CredentialedTriggerContext {
    pub async fn new() -> Result<Self, ScanflowError> {
        let aws_config = aws_config::load_from_env().await;
        let ssm_client = aws_sdk_ssm::Client::new(&aws_config);
        let codebuild_client = aws_sdk_codebuild::Client::new(&aws_config);
        let ecs_client = aws_sdk_ecs::Client::new(&aws_config);

        let resolver =
            ConfigResolver::env_then_store(Arc::new(SsmParameterStore::new(ssm_client)));
        let project_name = resolver.resolve(&CODE_BUILD_PROJECT_NAME).await?;

        Ok(Self {
            builds: Arc::new(CodeBuildService::new(codebuild_client)),
            task_definitions: Arc::new(EcsTaskDefinitionSource::new(ecs_client)),
            project_name,
        })
    }
}

pub async fn handler(event: LambdaEvent<TaskStateEvent>) -> Result<Value, Error> {
    let ctx = CredentialedTriggerContext::new().await?;
    handle(&ctx, event.payload).await?;

    Ok(serde_json::json!({
        "statusCode": 200,
        "body": "OK"
    }))
}

#[tracing::instrument(
    name = "credentialed_trigger.handle",
    skip(ctx, event),
    fields(account = %event.account, region = %event.region)
)]
pub async fn handle(
    ctx: &CredentialedTriggerContext,
    event: TaskStateEvent,
) -> Result<(), ScanflowError> {
    let Some(arn) = event
        .detail
        .as_ref()
        .and_then(|detail| detail.task_definition_arn.as_deref())
    else {
        info!("Task state event names no task definition, nothing to scan");
        return Ok(());
    };

    for (image, name) in event.named_container_images() {
        info!(image, task_definition = arn, "Checking image for registry credentials");

        // One lookup per container, matching the event-by-event shape of the
        // task definition API; not cached across containers.
        let task_definition = ctx.task_definitions.describe_task_definition(arn).await?;

        let mut environment = vec![
            BuildParameter::plaintext(BUILD_VAR_ACCOUNT, &event.account),
            BuildParameter::plaintext(BUILD_VAR_REGION, &event.region),
            BuildParameter::plaintext(BUILD_VAR_REPOSITORY, image),
        ];
        if let Some(secret_id) = task_definition.credentials_parameter_for(image, name) {
            environment.push(BuildParameter::secrets_manager(
                BUILD_VAR_DOCKER_USER,
                secret_id,
                SECRET_FIELD_USERNAME,
            ));
            environment.push(BuildParameter::secrets_manager(
                BUILD_VAR_DOCKER_PASS,
                secret_id,
                SECRET_FIELD_PASSWORD,
            ));
        }

        ctx.builds
            .start_build(&ctx.project_name, &environment)
            .await?;
    }

    Ok(())
}
