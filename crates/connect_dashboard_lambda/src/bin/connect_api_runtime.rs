use std::sync::Arc;

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_connect::config::Region;
use connect_dashboard_lambda::adapters::connect::AwsConnectClient;
use connect_dashboard_lambda::config::RuntimeConfig;
use connect_dashboard_lambda::handlers::gateway::ApiGatewayResponse;
use connect_dashboard_lambda::handlers::{handle_gateway_event, HandlerContext};
use connect_dashboard_lambda::logging::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info;

async fn load_sdk_config(config: &RuntimeConfig) -> SdkConfig {
    let retry = RetryConfig::standard()
        .with_max_attempts(config.max_attempts)
        .with_initial_backoff(config.initial_backoff);
    let mut loader = aws_config::defaults(BehaviorVersion::latest()).retry_config(retry);
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    loader.load().await
}

async fn handle_request(
    event: LambdaEvent<Value>,
    context: &HandlerContext,
) -> Result<ApiGatewayResponse, Error> {
    Ok(handle_gateway_event(event.payload, context).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let mut config = RuntimeConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    init_logging(config.log_format);

    let sdk_config = load_sdk_config(&config).await;
    if config.region.is_none() {
        config.region = sdk_config.region().map(|region| region.to_string());
    }

    let pairing = config.region_pairing();
    info!(
        component = "runtime",
        region = pairing.current_region(),
        paired_region = pairing.paired_region(),
        max_attempts = config.max_attempts,
        "runtime_started"
    );

    let context = Arc::new(HandlerContext::new(
        Arc::new(AwsConnectClient::new(&sdk_config)),
        pairing,
    ));
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let context = Arc::clone(&context);
        async move { handle_request(event, &context).await }
    }))
    .await
}
