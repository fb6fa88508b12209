use lambda_runtime::{Error, run, service_fn};
use scanflow_inline::handlers::credentialed_trigger;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    info!("Starting credentialed inline scan trigger");

    // Run the Lambda runtime
    run(service_fn(credentialed_trigger::handler)).await
}
