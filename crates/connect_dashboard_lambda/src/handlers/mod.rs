//! Routing of API Gateway events to the dashboard operations.
//!
//! Every route requires a decodable identity token in the `Authorization`
//! header. Handlers return `Result<ApiGatewayResponse, HandlerError>` and the
//! router turns errors into `{message}` responses with the mapped status.

pub mod gateway;
pub mod instances;
pub mod phone_numbers;
pub mod traffic_distribution;

use std::sync::Arc;
use std::time::Instant;

use connect_dashboard_core::client::ConnectApi;
use connect_dashboard_core::replication::RegionPairing;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::adapters::identity::{decode_identity_token, CallerIdentity, IdentityError};
use crate::error::HandlerError;
use gateway::{error_response, ApiGatewayResponse, GatewayRequest};

pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Shared, per-process dependencies of every handler.
#[derive(Clone)]
pub struct HandlerContext {
    pub connect: Arc<dyn ConnectApi>,
    pub pairing: RegionPairing,
}

impl HandlerContext {
    pub fn new(connect: Arc<dyn ConnectApi>, pairing: RegionPairing) -> Self {
        Self { connect, pairing }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ListInstances,
    ShowInstance,
    ReplicateInstance,
    CreateTrafficDistributionGroup,
    ListTrafficDistributionGroups,
    ShowTrafficDistributionGroup,
    UpdateTrafficDistribution,
    DeleteTrafficDistributionGroup,
    ListPhoneNumbers,
    UpdatePhoneNumbers,
}

impl Route {
    pub fn resolve(method: &str, path: &str) -> Option<Self> {
        let route = match (method, path) {
            ("GET", "/connectListInstances") => Self::ListInstances,
            ("GET", "/connectShowInstance") => Self::ShowInstance,
            ("POST", "/connectReplicateInstance") => Self::ReplicateInstance,
            ("PUT", "/connectCreateTrafficDistributionGroup") => {
                Self::CreateTrafficDistributionGroup
            }
            ("GET", "/connectListTrafficDistributionGroups") => {
                Self::ListTrafficDistributionGroups
            }
            ("GET", "/connectShowTrafficDistributionGroup") => Self::ShowTrafficDistributionGroup,
            ("PUT", "/connectUpdateTrafficDistribution") => Self::UpdateTrafficDistribution,
            ("DELETE", "/connectDeleteTrafficDistributionGroup") => {
                Self::DeleteTrafficDistributionGroup
            }
            ("POST", "/connectListPhoneNumbers") => Self::ListPhoneNumbers,
            ("PUT", "/connectUpdatePhoneNumbers") => Self::UpdatePhoneNumbers,
            _ => return None,
        };
        Some(route)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ListInstances => "list_instances",
            Self::ShowInstance => "show_instance",
            Self::ReplicateInstance => "replicate_instance",
            Self::CreateTrafficDistributionGroup => "create_traffic_distribution_group",
            Self::ListTrafficDistributionGroups => "list_traffic_distribution_groups",
            Self::ShowTrafficDistributionGroup => "show_traffic_distribution_group",
            Self::UpdateTrafficDistribution => "update_traffic_distribution",
            Self::DeleteTrafficDistributionGroup => "delete_traffic_distribution_group",
            Self::ListPhoneNumbers => "list_phone_numbers",
            Self::UpdatePhoneNumbers => "update_phone_numbers",
        }
    }
}

pub fn authenticate(request: &GatewayRequest) -> Result<CallerIdentity, HandlerError> {
    let token = request
        .header(AUTHORIZATION_HEADER)
        .ok_or(IdentityError::MissingToken)?;
    Ok(decode_identity_token(token)?)
}

pub async fn handle_gateway_event(event: Value, context: &HandlerContext) -> ApiGatewayResponse {
    let started = Instant::now();
    let request = match GatewayRequest::from_event(event) {
        Ok(request) => request,
        Err(error) => return failure_response(None, &error),
    };

    let (route, result) = match resolve_route(&request) {
        Ok(route) => (Some(route), dispatch(route, &request, context).await),
        Err(error) => (None, Err(error)),
    };

    match result {
        Ok(response) => {
            info!(
                component = "router",
                route = route.map(Route::name),
                request_id = request.request_id(),
                status_code = response.status_code,
                duration_ms = started.elapsed().as_millis() as u64,
                "request_completed"
            );
            response
        }
        Err(error) => failure_response(route, &error),
    }
}

fn resolve_route(request: &GatewayRequest) -> Result<Route, HandlerError> {
    let (method, path) = request
        .route()
        .ok_or_else(|| HandlerError::RouteNotFound("request has no method or path".to_string()))?;
    Route::resolve(&method, &path)
        .ok_or_else(|| HandlerError::RouteNotFound(format!("{method} {path}")))
}

async fn dispatch(
    route: Route,
    request: &GatewayRequest,
    context: &HandlerContext,
) -> Result<ApiGatewayResponse, HandlerError> {
    let caller = authenticate(request)?;
    info!(
        component = "router",
        route = route.name(),
        username = caller.username.as_deref(),
        groups = ?caller.groups,
        "request_authenticated"
    );

    match route {
        Route::ListInstances => instances::list_instances(context).await,
        Route::ShowInstance => instances::show_instance(request, context).await,
        Route::ReplicateInstance => instances::replicate_instance(request, context).await,
        Route::CreateTrafficDistributionGroup => {
            traffic_distribution::create_group(request, context).await
        }
        Route::ListTrafficDistributionGroups => {
            traffic_distribution::list_groups(request, context).await
        }
        Route::ShowTrafficDistributionGroup => {
            traffic_distribution::show_group(request, context).await
        }
        Route::UpdateTrafficDistribution => {
            traffic_distribution::update_distribution(request, context).await
        }
        Route::DeleteTrafficDistributionGroup => {
            traffic_distribution::delete_group(request, context).await
        }
        Route::ListPhoneNumbers => phone_numbers::list_phone_numbers(request, context).await,
        Route::UpdatePhoneNumbers => phone_numbers::update_phone_numbers(request, context).await,
    }
}

fn failure_response(route: Option<Route>, failure: &HandlerError) -> ApiGatewayResponse {
    let status_code = failure.status_code();
    let message = failure.to_string();
    if status_code >= 500 {
        error!(
            component = "router",
            route = route.map(Route::name),
            status_code,
            error = %message,
            "request_failed"
        );
    } else {
        warn!(
            component = "router",
            route = route.map(Route::name),
            status_code,
            error = %message,
            "request_rejected"
        );
    }
    error_response(status_code, &message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_routes_only() {
        assert_eq!(
            Route::resolve("PUT", "/connectUpdatePhoneNumbers"),
            Some(Route::UpdatePhoneNumbers)
        );
        assert_eq!(
            Route::resolve("DELETE", "/connectDeleteTrafficDistributionGroup"),
            Some(Route::DeleteTrafficDistributionGroup)
        );
        assert_eq!(Route::resolve("GET", "/connectUpdatePhoneNumbers"), None);
        assert_eq!(Route::resolve("GET", "/unknown"), None);
    }
}
