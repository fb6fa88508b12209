/// ECR push handler - registers the registry and submits the pushed image
use lambda_runtime::{Error, LambdaEvent};
use scanflow_core::config::{
    ConfigResolver, SCAN_AWS_ACCESS_KEY_ID, SCAN_AWS_SECRET_ACCESS_KEY, SECURE_API_TOKEN,
    SECURE_URL,
};
use scanflow_core::constants::{ECR_REGISTRY_TYPE, REGISTRY_ALREADY_EXISTS};
use scanflow_core::error::ScanflowError;
use scanflow_core::models::EcrPushEvent;
use scanflow_core::services::scanning::{
    RegistryCredentials, ScanningService, SecureApiToken, SysdigSecureClient,
};
use scanflow_core::services::ssm::SsmParameterStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// ECR push handler context
pub struct EcrPushContext {
    pub scanning: Arc<dyn ScanningService>,
    pub registry_credentials: RegistryCredentials,
}

impl EcrPushContext {
    pub async fn new() -> Result<Self, ScanflowError> {
        let aws_config = aws_config::load_from_env().await;
        let ssm_client = aws_sdk_ssm::Client::new(&aws_config);

        let resolver =
            ConfigResolver::env_then_store(Arc::new(SsmParameterStore::new(ssm_client)));
        let url = resolver.resolve(&SECURE_URL).await?;
        let token = SecureApiToken(resolver.resolve(&SECURE_API_TOKEN).await?);
        let registry_credentials = RegistryCredentials {
            access_key_id: resolver.resolve(&SCAN_AWS_ACCESS_KEY_ID).await?,
            secret_access_key: resolver.resolve(&SCAN_AWS_SECRET_ACCESS_KEY).await?,
        };

        Ok(Self {
            scanning: Arc::new(SysdigSecureClient::new(url, token)),
            registry_credentials,
        })
    }
}

pub async fn handler(event: LambdaEvent<EcrPushEvent>) -> Result<Value, Error> {
    let ctx = EcrPushContext::new().await?;
    handle(&ctx, event.payload).await?;

    Ok(serde_json::json!({
        "statusCode": 200,
        "body": "OK"
    }))
}

#[tracing::instrument(
    name = "ecr_push.handle",
    skip(ctx, event),
    fields(account = %event.account, region = %event.region)
)]
pub async fn handle(ctx: &EcrPushContext, event: EcrPushEvent) -> Result<(), ScanflowError> {
    let Some(image) = event.image() else {
        info!("Push event carries no image detail, nothing to scan");
        return Ok(());
    };
    let registry = event.registry();

    let response = ctx
        .scanning
        .add_registry(&registry, &ctx.registry_credentials, ECR_REGISTRY_TYPE)
        .await?;
    if !response.ok && response.detail != REGISTRY_ALREADY_EXISTS {
        return Err(ScanflowError::Scanning(format!(
            "Cannot set up registry {} in Secure with the credentials provided. More details: {}",
            registry, response.detail
        )));
    }

    info!(image = %image, "Submitting pushed image for analysis");
    let response = ctx.scanning.add_image(&image, false).await?;
    if !response.ok {
        return Err(ScanflowError::Scanning(format!(
            "Image {} cannot be analyzed from the SaaS backend. More details: {}",
            image, response.detail
        )));
    }

    Ok(())
}
