#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use connect_dashboard_core::replication::RegionPairing;
use connect_dashboard_core::testing::RecordingConnect;
use connect_dashboard_lambda::handlers::gateway::ApiGatewayResponse;
use connect_dashboard_lambda::handlers::HandlerContext;
use serde_json::{json, Value};

/// Unsigned ID token carrying the claims the gateway authorizer forwards.
pub fn id_token(username: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"test"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "cognito:username": username,
            "cognito:groups": ["dashboard-admins"],
            "email": format!("{username}@example.com")
        })
        .to_string(),
    );
    format!("{header}.{payload}.signature")
}

/// Builds an HTTP API v2 event the way the gateway delivers it.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    method: String,
    path: String,
    token: Option<String>,
    query: Option<Value>,
    body: Option<Value>,
}

impl EventBuilder {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            token: Some(id_token("operator")),
            query: None,
            body: None,
        }
    }

    pub fn anonymous(mut self) -> Self {
        self.token = None;
        self
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    /// Bodies arrive as JSON text, never as objects.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(Value::String(body.to_string()));
        self
    }

    pub fn build(self) -> Value {
        let mut headers = json!({"content-type": "application/json"});
        if let Some(token) = self.token {
            headers["authorization"] = Value::String(token);
        }
        json!({
            "version": "2.0",
            "routeKey": format!("{} {}", self.method, self.path),
            "rawPath": self.path,
            "headers": headers,
            "queryStringParameters": self.query,
            "body": self.body,
            "isBase64Encoded": false,
            "requestContext": {
                "requestId": "req-1",
                "http": {"method": self.method, "path": self.path}
            }
        })
    }
}

pub fn context(connect: Arc<RecordingConnect>) -> HandlerContext {
    HandlerContext::new(
        connect,
        RegionPairing::resolve(Some("us-east-1".to_string()), None),
    )
}

pub fn body(response: &ApiGatewayResponse) -> Value {
    serde_json::from_str(&response.body).expect("response body should be JSON")
}
