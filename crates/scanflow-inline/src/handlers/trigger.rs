/// Inline scan trigger - one CodeBuild job per container image
use lambda_runtime::{Error, LambdaEvent};
use scanflow_core::config::{CODE_BUILD_PROJECT_NAME, ConfigResolver};
use scanflow_core::constants::{BUILD_VAR_ACCOUNT, BUILD_VAR_REGION, BUILD_VAR_REPOSITORY};
use scanflow_core::error::ScanflowError;
use scanflow_core::models::TaskStateEvent;
use scanflow_core::services::codebuild::{BuildParameter, BuildService, CodeBuildService};
use scanflow_core::services::ssm::SsmParameterStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Inline scan trigger context
pub struct TriggerContext {
    pub builds: Arc<dyn BuildService>,
    pub project_name: String,
}

impl TriggerContext {
    pub async fn new() -> Result<Self, ScanflowError> {
        let aws_config = aws_config::load_from_env().await;
        let ssm_client = aws_sdk_ssm::Client::new(&aws_config);
        let codebuild_client = aws_sdk_codebuild::Client::new(&aws_config);

        let resolver =
            ConfigResolver::env_then_store(Arc::new(SsmParameterStore::new(ssm_client)));
        let project_name = resolver.resolve(&CODE_BUILD_PROJECT_NAME).await?;

        Ok(Self {
            builds: Arc::new(CodeBuildService::new(codebuild_client)),
            project_name,
        })
    }
}

pub async fn handler(event: LambdaEvent<TaskStateEvent>) -> Result<Value, Error> {
    let ctx = TriggerContext::new().await?;
    handle(&ctx, event.payload).await?;

    Ok(serde_json::json!({
        "statusCode": 200,
        "body": "OK"
    }))
}

#[tracing::instrument(
    name = "trigger.handle",
    skip(ctx, event),
    fields(account = %event.account, region = %event.region)
)]
pub async fn handle(ctx: &TriggerContext, event: TaskStateEvent) -> Result<(), ScanflowError> {
    for image in event.container_images() {
        info!(image, project = %ctx.project_name, "Triggering inline scan build");

        let environment = [
            BuildParameter::plaintext(BUILD_VAR_ACCOUNT, &event.account),
            BuildParameter::plaintext(BUILD_VAR_REGION, &event.region),
            BuildParameter::plaintext(BUILD_VAR_REPOSITORY, image),
        ];
        ctx.builds
            .start_build(&ctx.project_name, &environment)
            .await?;
    }

    Ok(())
}
