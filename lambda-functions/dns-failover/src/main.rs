use dns_failover::{AmbientConfig, FailoverService, Request, Response};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    let service = FailoverService::new().await?;

    service
        .handle_request(&event.payload, &AmbientConfig::from_env())
        .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    run(service_fn(function_handler)).await
}
