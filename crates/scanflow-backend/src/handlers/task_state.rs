/// ECS task state handler - submits every container image for analysis
use lambda_runtime::{Error, LambdaEvent};
use scanflow_core::config::{ConfigResolver, SECURE_API_TOKEN, SECURE_URL};
use scanflow_core::error::ScanflowError;
use scanflow_core::models::TaskStateEvent;
use scanflow_core::services::scanning::{ScanningService, SecureApiToken, SysdigSecureClient};
use scanflow_core::services::ssm::SsmParameterStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Task state handler context
pub struct TaskStateContext {
    pub scanning: Arc<dyn ScanningService>,
}

impl TaskStateContext {
    pub async fn new() -> Result<Self, ScanflowError> {
        let aws_config = aws_config::load_from_env().await;
        let ssm_client = aws_sdk_ssm::Client::new(&aws_config);

        let resolver =
            ConfigResolver::env_then_store(Arc::new(SsmParameterStore::new(ssm_client)));
        let url = resolver.resolve(&SECURE_URL).await?;
        let token = SecureApiToken(resolver.resolve(&SECURE_API_TOKEN).await?);

        Ok(Self {
            scanning: Arc::new(SysdigSecureClient::new(url, token)),
        })
    }
}

pub async fn handler(event: LambdaEvent<TaskStateEvent>) -> Result<Value, Error> {
    let ctx = TaskStateContext::new().await?;
    handle(&ctx, event.payload).await?;

    Ok(serde_json::json!({
        "statusCode": 200,
        "body": "OK"
    }))
}

/// Images are submitted one at a time in container-list order; the first
/// rejection aborts the invocation and already-submitted images stay
/// submitted. The backend treats resubmission of a known image as a no-op,
/// so duplicate deliveries need no coordination here.
#[tracing::instrument(
    name = "task_state.handle",
    skip(ctx, event),
    fields(account = %event.account, region = %event.region)
)]
pub async fn handle(ctx: &TaskStateContext, event: TaskStateEvent) -> Result<(), ScanflowError> {
    for image in event.container_images() {
        info!(image, "Submitting container image for analysis");

        let response = ctx.scanning.add_image(image, false).await?;
        if !response.ok {
            return Err(ScanflowError::Scanning(format!(
                "Image {} cannot be analyzed from the SaaS backend. More details: {}",
                image, response.detail
            )));
        }
    }

    Ok(())
}
