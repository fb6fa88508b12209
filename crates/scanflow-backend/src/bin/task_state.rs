use lambda_runtime::{Error, run, service_fn};
use scanflow_backend::handlers::task_state;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    info!("Starting ECS task state scanning trigger");

    // Run the Lambda runtime
    run(service_fn(task_state::handler)).await
}
