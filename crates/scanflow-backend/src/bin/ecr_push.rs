use lambda_runtime::{Error, run, service_fn};
use scanflow_backend::handlers::ecr_push;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    info!("Starting ECR push scanning trigger");

    // Run the Lambda runtime
    run(service_fn(ecr_push::handler)).await
}
