//! Shared test infrastructure for cloudmcp end-to-end tests.
//!
//! This module provides:
//! - A stub Linode API (wiremock) shared by every configured account
//! - A service configured with `primary`, `development` and `staging`
//! - Helper functions for test assertions

use cloudmcp_core::{AccountConfig, CloudMcpConfig};
use cloudmcp_mcp::protocol::{CallToolParams, CallToolResult, RequestContext};
use cloudmcp_mcp::Service;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// ACCOUNTS
// =============================================================================

pub const ACCOUNTS: [(&str, &str); 3] = [
    ("primary", "Production"),
    ("development", "Development"),
    ("staging", "Staging"),
];

/// Bearer token configured for an account.
pub fn token(account: &str) -> String {
    format!("{account}-token")
}

pub fn bearer(account: &str) -> String {
    format!("Bearer {}", token(account))
}

// =============================================================================
// TEST CONTEXT
// =============================================================================

pub struct TestContext {
    pub api: MockServer,
    pub service: Arc<Service>,
}

impl TestContext {
    /// Start the stub API, build the service and initialize it.
    pub async fn setup() -> Self {
        let api = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uid": 1,
                "username": "ops",
                "email": "ops@example.com",
                "restricted": false
            })))
            .mount(&api)
            .await;

        let mut config = CloudMcpConfig {
            default_account: Some("primary".to_string()),
            ..Default::default()
        };
        for (name, label) in ACCOUNTS {
            config.accounts.insert(
                name.to_string(),
                AccountConfig::new(token(name), label).with_api_url(api.uri()),
            );
        }

        let service = Arc::new(Service::new(&config).expect("service should build"));
        service
            .initialize(&RequestContext::new())
            .await
            .expect("initialize should succeed");

        Self { api, service }
    }

    /// Invoke a tool through the service.
    pub async fn call(&self, tool: &str, arguments: Value) -> CallToolResult {
        self.service
            .call_tool_for_testing(&RequestContext::new(), CallToolParams::new(tool, arguments))
            .await
            .unwrap_or_else(|e| panic!("{tool} failed at the protocol level: {e}"))
    }

    /// Serve `body` for `GET <path>` when called with `account`'s token.
    pub async fn stub_get(&self, account: &str, route: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("Authorization", bearer(account).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.api)
            .await;
    }

    /// Requests the stub API received on `route`, optionally filtered by account.
    pub async fn requests_to(&self, route: &str, account: Option<&str>) -> usize {
        let expected = account.map(bearer);
        self.api
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == route)
            .filter(|r| match &expected {
                Some(b) => r
                    .headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some(b.as_str()),
                None => true,
            })
            .count()
    }

    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> f64 {
        self.service.metrics().counter_value(name, labels)
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

/// A paginated list envelope.
pub fn page(data: Vec<Value>) -> Value {
    let results = data.len();
    json!({ "data": data, "page": 1, "pages": 1, "results": results })
}

pub fn instance(id: i64, label: &str) -> Value {
    json!({
        "id": id,
        "label": label,
        "status": "running",
        "region": "us-east",
        "type": "g6-nanode-1",
        "image": "linode/debian12",
        "ipv4": ["192.0.2.10"],
        "ipv6": "2600:3c03::f03c:91ff:fe24:3a2f/128",
        "hypervisor": "kvm",
        "specs": { "disk": 25600, "memory": 1024, "vcpus": 1, "transfer": 1000 },
        "tags": ["web"],
        "created": "2024-01-01T00:00:00",
        "updated": "2024-01-02T00:00:00"
    })
}

// =============================================================================
// ASSERTIONS
// =============================================================================

pub fn assert_success(result: &CallToolResult, msg: &str) {
    assert!(
        !result.is_error,
        "{}: expected success, got error: {}",
        msg,
        result.text_content()
    );
}

pub fn assert_error(result: &CallToolResult, msg: &str) {
    assert!(
        result.is_error,
        "{}: expected error, got: {}",
        msg,
        result.text_content()
    );
}

pub fn assert_contains(result: &CallToolResult, needle: &str) {
    let text = result.text_content();
    assert!(text.contains(needle), "expected {needle:?} in:\n{text}");
}
