use connect_dashboard_core::contract::{require_field, ReplicateInstanceRequest};
use connect_dashboard_core::replication::describe_with_replication;
use tracing::info;

use crate::error::HandlerError;
use crate::handlers::gateway::{success_response, ApiGatewayResponse, GatewayRequest};
use crate::handlers::HandlerContext;

pub async fn list_instances(context: &HandlerContext) -> Result<ApiGatewayResponse, HandlerError> {
    let instances = context.connect.list_instances().await?;
    info!(
        component = "instances",
        count = instances.len(),
        "instances_listed"
    );
    success_response("Connect List Instances", instances)
}

pub async fn show_instance(
    request: &GatewayRequest,
    context: &HandlerContext,
) -> Result<ApiGatewayResponse, HandlerError> {
    let instance_id = require_field("instanceId", request.query("instanceId"))?;
    let details =
        describe_with_replication(context.connect.as_ref(), &context.pairing, &instance_id)
            .await?;
    success_response("Connect Show Instance", details)
}

pub async fn replicate_instance(
    request: &GatewayRequest,
    context: &HandlerContext,
) -> Result<ApiGatewayResponse, HandlerError> {
    let replication = request
        .parse_body::<ReplicateInstanceRequest>()?
        .normalize()?;
    let replica_region = context.pairing.replica_region().ok_or_else(|| {
        HandlerError::Misconfiguration(format!(
            "No paired region is configured for replication from {}",
            context.pairing.current_region().unwrap_or("an unknown region")
        ))
    })?;

    let replica = context
        .connect
        .replicate_instance(
            &replication.instance_id,
            replica_region,
            &replication.replica_alias,
        )
        .await?;
    info!(
        component = "instances",
        instance_id = %replication.instance_id,
        replica_region,
        "instance_replication_started"
    );
    success_response("Connect Replicate Instance", replica)
}
