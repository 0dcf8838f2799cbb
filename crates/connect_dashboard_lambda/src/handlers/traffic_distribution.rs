use connect_dashboard_core::contract::{
    require_field, CreateTrafficDistributionGroupRequest, DeleteTrafficDistributionGroupRequest,
    ListTrafficDistributionGroupsQuery, TrafficDistributionGroupView,
    UpdateTrafficDistributionRequest,
};
use serde_json::json;
use tracing::info;

use crate::error::HandlerError;
use crate::handlers::gateway::{success_response, ApiGatewayResponse, GatewayRequest};
use crate::handlers::HandlerContext;

pub async fn create_group(
    request: &GatewayRequest,
    context: &HandlerContext,
) -> Result<ApiGatewayResponse, HandlerError> {
    let group = request
        .parse_body::<CreateTrafficDistributionGroupRequest>()?
        .normalize()?;
    let created = context
        .connect
        .create_traffic_distribution_group(&group)
        .await?;
    info!(
        component = "traffic_distribution",
        name = %group.name,
        instance_id = %group.instance_id,
        "traffic_distribution_group_created"
    );
    success_response("Connect Create Traffic Distribution Group", created)
}

pub async fn list_groups(
    request: &GatewayRequest,
    context: &HandlerContext,
) -> Result<ApiGatewayResponse, HandlerError> {
    let query = ListTrafficDistributionGroupsQuery::from_parameters(
        request.query("instanceId"),
        request.query("maxResults"),
        request.query("nextToken"),
    )?;
    let page = context
        .connect
        .list_traffic_distribution_groups(&query)
        .await?;
    success_response("Connect List Traffic Distribution Groups", page.summaries)
}

/// Describes a group and folds its current distribution into the result.
pub async fn show_group(
    request: &GatewayRequest,
    context: &HandlerContext,
) -> Result<ApiGatewayResponse, HandlerError> {
    let group_id = require_field(
        "trafficDistributionGroupId",
        request.query("trafficDistributionGroupId"),
    )?;
    let mut group = context
        .connect
        .describe_traffic_distribution_group(&group_id)
        .await?;
    let distribution = context.connect.get_traffic_distribution(&group_id).await?;
    group.traffic_distribution = Some(distribution);

    success_response(
        "Connect Show Traffic Distribution Group",
        TrafficDistributionGroupView {
            traffic_distribution_group: group,
        },
    )
}

pub async fn update_distribution(
    request: &GatewayRequest,
    context: &HandlerContext,
) -> Result<ApiGatewayResponse, HandlerError> {
    let update = request
        .parse_body::<UpdateTrafficDistributionRequest>()?
        .normalize()?;
    context.connect.update_traffic_distribution(&update).await?;
    info!(
        component = "traffic_distribution",
        group_id = %update.id,
        regions = update.telephony_config.distributions.len(),
        "traffic_distribution_updated"
    );
    success_response("Connect Update Traffic Distribution", json!({}))
}

pub async fn delete_group(
    request: &GatewayRequest,
    context: &HandlerContext,
) -> Result<ApiGatewayResponse, HandlerError> {
    let group_id = request
        .parse_body::<DeleteTrafficDistributionGroupRequest>()?
        .normalize()?;
    context
        .connect
        .delete_traffic_distribution_group(&group_id)
        .await?;
    info!(
        component = "traffic_distribution",
        group_id = %group_id,
        "traffic_distribution_group_deleted"
    );
    success_response("Connect Delete Traffic Distribution Group", json!({}))
}
