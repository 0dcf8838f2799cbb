use connect_dashboard_core::batch::{reassign, PhoneNumberUpdater};
use connect_dashboard_core::contract::{
    ListPhoneNumbersRequest, PhoneNumberReassignmentResponse, UpdatePhoneNumbersRequest,
};

use crate::error::HandlerError;
use crate::handlers::gateway::{json_response, success_response, ApiGatewayResponse, GatewayRequest};
use crate::handlers::HandlerContext;

/// Multi-status: every item carries its own outcome.
pub const REASSIGNMENT_STATUS: u16 = 207;

pub async fn list_phone_numbers(
    request: &GatewayRequest,
    context: &HandlerContext,
) -> Result<ApiGatewayResponse, HandlerError> {
    let query = request
        .parse_body::<ListPhoneNumbersRequest>()?
        .normalize()?;
    let page = context.connect.list_phone_numbers(&query).await?;
    success_response("Connect List Phone Numbers", page)
}

/// Moves every listed phone number to the target. Individual failures are
/// reported per item; only validation stops the batch.
pub async fn update_phone_numbers(
    request: &GatewayRequest,
    context: &HandlerContext,
) -> Result<ApiGatewayResponse, HandlerError> {
    let update = request
        .parse_body::<UpdatePhoneNumbersRequest>()?
        .normalize()?;

    let updater = PhoneNumberUpdater::new(context.connect.as_ref());
    let result = reassign(&updater, &update.target_arn, update.phone_number_ids).await?;

    json_response(
        REASSIGNMENT_STATUS,
        &PhoneNumberReassignmentResponse::from(&result),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use connect_dashboard_core::contract::{PhoneNumberPage, PhoneNumberSummary};
    use connect_dashboard_core::error::RemoteError;
    use connect_dashboard_core::replication::RegionPairing;
    use connect_dashboard_core::testing::RecordingConnect;
    use serde_json::{json, Value};

    use super::*;

    fn context(connect: Arc<RecordingConnect>) -> HandlerContext {
        HandlerContext::new(
            connect,
            RegionPairing::resolve(Some("us-east-1".to_string()), None),
        )
    }

    fn update_request(ids: Vec<String>) -> GatewayRequest {
        GatewayRequest::from_event(json!({
            "body": {"targetArn": "arn:tdg", "phoneNumberIds": ids}
        }))
        .expect("event should parse")
    }

    #[tokio::test]
    async fn partial_failure_reports_each_item() {
        let connect = Arc::new(
            RecordingConnect::new()
                .fail_phone_number("p2", RemoteError::with_status(500, "throttled")),
        );
        let ids = vec!["p1".to_string(), "p2".to_string(), "p3".to_string()];

        let response = update_phone_numbers(&update_request(ids), &context(connect.clone()))
            .await
            .expect("batch should complete");

        assert_eq!(response.status_code, 207);
        let body: Value = serde_json::from_str(&response.body).expect("body should parse");
        assert_eq!(body["metadata"], json!({"success": 2, "failure": 1, "total": 3}));
        assert_eq!(body["data"][0]["message"], "success");
        assert_eq!(body["data"][0]["status"], 200);
        assert_eq!(
            body["data"][1],
            json!({
                "message": "error",
                "resource": {
                    "phoneNumberId": "p2",
                    "error": {"statusCode": 500, "message": "throttled"}
                },
                "status": 500
            })
        );
        assert_eq!(connect.calls_for("update_phone_number").len(), 3);
    }

    #[tokio::test]
    async fn oversized_batch_is_rejected_without_calls() {
        let connect = Arc::new(RecordingConnect::new());
        let ids = (0..26).map(|index| format!("p{index}")).collect();

        let error = update_phone_numbers(&update_request(ids), &context(connect.clone()))
            .await
            .expect_err("26 ids should fail");

        assert_eq!(error.status_code(), 400);
        assert_eq!(
            error.to_string(),
            "Only 25 phoneNumberIds are accepted, 26 were passed."
        );
        assert!(connect.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_target_is_rejected() {
        let connect = Arc::new(RecordingConnect::new());
        let request = GatewayRequest::from_event(json!({"body": {"phoneNumberIds": ["p1"]}}))
            .expect("event should parse");

        let error = update_phone_numbers(&request, &context(connect.clone()))
            .await
            .expect_err("missing target should fail");

        assert_eq!(error.to_string(), "targetArn is required");
        assert!(connect.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_phone_number_ids_are_rejected() {
        let connect = Arc::new(RecordingConnect::new());
        let request = GatewayRequest::from_event(json!({"body": {"targetArn": "arn:tdg"}}))
            .expect("event should parse");

        let error = update_phone_numbers(&request, &context(connect.clone()))
            .await
            .expect_err("missing ids should fail");

        assert_eq!(error.status_code(), 400);
        assert_eq!(error.to_string(), "phoneNumberIds is required");
        assert!(connect.calls().is_empty());
    }

    #[tokio::test]
    async fn null_phone_number_ids_are_rejected() {
        let connect = Arc::new(RecordingConnect::new());
        let request = GatewayRequest::from_event(json!({
            "body": {"targetArn": "arn:tdg", "phoneNumberIds": null}
        }))
        .expect("event should parse");

        let error = update_phone_numbers(&request, &context(connect.clone()))
            .await
            .expect_err("null ids should fail");

        assert_eq!(error.to_string(), "phoneNumberIds is required");
        assert!(connect.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_reports_zero_counts() {
        let connect = Arc::new(RecordingConnect::new());

        let response = update_phone_numbers(&update_request(Vec::new()), &context(connect))
            .await
            .expect("empty batch should complete");

        let body: Value = serde_json::from_str(&response.body).expect("body should parse");
        assert_eq!(response.status_code, 207);
        assert_eq!(body["metadata"]["total"], 0);
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn lists_phone_numbers_for_target() {
        let connect = Arc::new(RecordingConnect::new().with_phone_numbers(PhoneNumberPage {
            list_phone_numbers_summary_list: vec![PhoneNumberSummary {
                phone_number_id: Some("p1".to_string()),
                phone_number: Some("+15555550100".to_string()),
                ..PhoneNumberSummary::default()
            }],
            next_token: Some("page-2".to_string()),
        }));
        let request = GatewayRequest::from_event(json!({
            "body": "{\"TargetArn\":\"arn:tdg\",\"MaxResults\":50}"
        }))
        .expect("event should parse");

        let response = list_phone_numbers(&request, &context(connect.clone()))
            .await
            .expect("list should succeed");

        let body: Value = serde_json::from_str(&response.body).expect("body should parse");
        assert_eq!(body["success"], "Connect List Phone Numbers succeeded!");
        assert_eq!(
            body["data"]["ListPhoneNumbersSummaryList"][0]["PhoneNumber"],
            "+15555550100"
        );
        assert_eq!(body["data"]["NextToken"], "page-2");
        assert_eq!(
            connect.calls_for("list_phone_numbers")[0].arguments[0],
            "arn:tdg"
        );
    }
}
