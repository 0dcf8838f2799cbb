//! API Gateway HTTP API (payload v2) request and response shapes.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::HandlerError;

pub const DEFAULT_ROUTE_KEY: &str = "$default";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayRequest {
    pub route_key: Option<String>,
    pub raw_path: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    pub query_string_parameters: Option<BTreeMap<String, String>>,
    pub body: Option<Value>,
    pub is_base64_encoded: bool,
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContext {
    pub request_id: Option<String>,
    pub http: Option<HttpContext>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpContext {
    pub method: Option<String>,
    pub path: Option<String>,
}

impl GatewayRequest {
    pub fn from_event(event: Value) -> Result<Self, HandlerError> {
        if !event.is_object() {
            return Err(HandlerError::validation(
                "Request payload must be a JSON object",
            ));
        }
        serde_json::from_value(event)
            .map_err(|error| HandlerError::validation(format!("Malformed request event: {error}")))
    }

    /// Method and path of the request, taken from the route key when the
    /// gateway matched an explicit route and from the raw path otherwise.
    pub fn route(&self) -> Option<(String, String)> {
        if let Some((method, path)) = self
            .route_key
            .as_deref()
            .filter(|key| *key != DEFAULT_ROUTE_KEY)
            .and_then(|key| key.split_once(' '))
        {
            return Some((method.to_ascii_uppercase(), normalize_path(path)));
        }

        let http = self.request_context.as_ref()?.http.as_ref()?;
        let method = http.method.as_deref()?;
        let path = self.raw_path.as_deref().or(http.path.as_deref())?;
        Some((method.to_ascii_uppercase(), normalize_path(path)))
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_context.as_ref()?.request_id.as_deref()
    }

    /// Header lookup ignoring case; HTTP APIs lowercase names but direct
    /// invocations may not.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()?
            .get(name)
            .map(String::as_str)
    }

    /// The body as a JSON object. A missing or null body is an empty object.
    pub fn json_body(&self) -> Result<Value, HandlerError> {
        match &self.body {
            None | Some(Value::Null) => Ok(json!({})),
            Some(body @ Value::Object(_)) => Ok(body.clone()),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(json!({})),
            Some(Value::String(text)) => {
                let decoded = if self.is_base64_encoded {
                    let bytes = STANDARD.decode(text.trim()).map_err(|error| {
                        HandlerError::validation(format!("Malformed base64 body: {error}"))
                    })?;
                    String::from_utf8(bytes).map_err(|error| {
                        HandlerError::validation(format!("Malformed UTF-8 body: {error}"))
                    })?
                } else {
                    text.clone()
                };
                let value: Value = serde_json::from_str(&decoded).map_err(|error| {
                    HandlerError::validation(format!("Malformed JSON body: {error}"))
                })?;
                if value.is_object() {
                    Ok(value)
                } else {
                    Err(HandlerError::validation("Request body must be a JSON object"))
                }
            }
            Some(_) => Err(HandlerError::validation("Request body must be a JSON object")),
        }
    }

    pub fn parse_body<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(self.json_body()?)
            .map_err(|error| HandlerError::validation(format!("Malformed request: {error}")))
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn response_headers() -> Value {
    json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": "*",
        "Access-Control-Allow-Headers": "Content-Type,Authorization",
    })
}

#[derive(Debug, Serialize)]
struct SuccessEnvelope<'a, T> {
    success: &'a str,
    data: T,
}

/// Standard `{success, data}` envelope for a completed operation.
pub fn success_response(
    operation: &str,
    data: impl Serialize,
) -> Result<ApiGatewayResponse, HandlerError> {
    let message = format!("{operation} succeeded!");
    json_response(
        200,
        &SuccessEnvelope {
            success: &message,
            data,
        },
    )
}

pub fn json_response(
    status_code: u16,
    payload: &impl Serialize,
) -> Result<ApiGatewayResponse, HandlerError> {
    Ok(ApiGatewayResponse {
        status_code,
        headers: response_headers(),
        body: serde_json::to_string(payload)?,
    })
}

pub fn error_response(status_code: u16, message: &str) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: response_headers(),
        body: json!({ "message": message }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(event: Value) -> GatewayRequest {
        GatewayRequest::from_event(event).expect("event should parse")
    }

    #[test]
    fn route_prefers_explicit_route_key() {
        let parsed = request(json!({
            "routeKey": "GET /connectListInstances",
            "rawPath": "/prod/connectListInstances"
        }));
        assert_eq!(
            parsed.route(),
            Some(("GET".to_string(), "/connectListInstances".to_string()))
        );
    }

    #[test]
    fn default_route_falls_back_to_raw_path() {
        let parsed = request(json!({
            "routeKey": "$default",
            "rawPath": "/connectShowInstance/",
            "requestContext": {"http": {"method": "get"}}
        }));
        assert_eq!(
            parsed.route(),
            Some(("GET".to_string(), "/connectShowInstance".to_string()))
        );
    }

    #[test]
    fn headers_are_case_insensitive() {
        let parsed = request(json!({"headers": {"Authorization": "token"}}));
        assert_eq!(parsed.header("authorization"), Some("token"));
        assert_eq!(parsed.header("x-missing"), None);
    }

    #[test]
    fn null_and_missing_bodies_are_empty_objects() {
        assert_eq!(request(json!({"body": null})).json_body().ok(), Some(json!({})));
        assert_eq!(request(json!({})).json_body().ok(), Some(json!({})));
    }

    #[test]
    fn string_and_base64_bodies_are_decoded() {
        let plain = request(json!({"body": "{\"instanceId\":\"inst-1\"}"}));
        assert_eq!(plain.json_body().ok(), Some(json!({"instanceId": "inst-1"})));

        let encoded = STANDARD.encode("{\"instanceId\":\"inst-2\"}");
        let base64 = request(json!({"body": encoded, "isBase64Encoded": true}));
        assert_eq!(base64.json_body().ok(), Some(json!({"instanceId": "inst-2"})));
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        let error = request(json!({"body": "[1, 2]"}))
            .json_body()
            .expect_err("arrays should fail");
        assert_eq!(error.status_code(), 400);
        assert!(GatewayRequest::from_event(json!("text")).is_err());
    }

    #[test]
    fn success_envelope_names_operation() {
        let response =
            success_response("Connect List Instances", json!([])).expect("response should build");
        let body: Value = serde_json::from_str(&response.body).expect("body should parse");
        assert_eq!(response.status_code, 200);
        assert_eq!(body["success"], "Connect List Instances succeeded!");
        assert_eq!(body["data"], json!([]));
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
    }
}
