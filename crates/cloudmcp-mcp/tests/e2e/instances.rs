//! Instance tool tests.
//!
//! Tests argument validation before any API call, successful fetches with
//! their tool and API metrics, provider failures and instance mutations.

use super::common::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const INSTANCE_PATH: &str = "/v4/linode/instances/123456";

pub async fn test_missing_required_parameter() {
    println!("  🧪 test_missing_required_parameter");
    let ctx = TestContext::setup().await;

    let result = ctx.call("linode_instance_get", json!({})).await;

    assert_error(&result, "instance get without an id should fail");
    assert_contains(&result, "instance_id");
    assert_eq!(
        result.text_content(),
        "missing required parameter: instance_id"
    );
    assert_eq!(ctx.requests_to(INSTANCE_PATH, None).await, 0);
    assert_eq!(
        ctx.counter("cloudmcp_linode_api_requests_total", &[("method", "GET")]),
        0.0
    );

    println!("     ✓ Rejected before any provider call");
}

pub async fn test_invalid_identifiers() {
    println!("  🧪 test_invalid_identifiers");
    let ctx = TestContext::setup().await;

    let result = ctx
        .call("linode_instance_get", json!({ "instance_id": -4 }))
        .await;
    assert_error(&result, "negative id should fail");
    assert_contains(&result, "must not be negative");

    let result = ctx
        .call("linode_instance_get", json!({ "instance_id": 1.5 }))
        .await;
    assert_error(&result, "fractional id should fail");
    assert_contains(&result, "whole number");

    let result = ctx
        .call("linode_instance_get", json!({ "instance_id": true }))
        .await;
    assert_error(&result, "boolean id should fail");
    assert_contains(&result, "expected number");

    assert_eq!(ctx.api.received_requests().await.unwrap().len(), 1);

    println!("     ✓ Negative, fractional and non-numeric ids rejected");
}

pub async fn test_get_instance() {
    println!("  🧪 test_get_instance");
    let ctx = TestContext::setup().await;
    ctx.stub_get("primary", INSTANCE_PATH, instance(123456, "web-1"))
        .await;

    let result = ctx
        .call("linode_instance_get", json!({ "instance_id": 123456 }))
        .await;

    assert_success(&result, "instance get should succeed");
    assert_contains(&result, "Instance Details:");
    assert_contains(&result, "ID: 123456");
    assert_contains(&result, "Label: web-1");
    assert_contains(&result, "IPv4: 192.0.2.10");
    assert_contains(&result, "Memory: 1024 MB");

    assert_eq!(
        ctx.counter(
            "cloudmcp_tool_execution_total",
            &[("tool", "linode_instance_get"), ("account", "primary"), ("status", "success")]
        ),
        1.0
    );
    assert_eq!(
        ctx.counter(
            "cloudmcp_linode_api_requests_total",
            &[("method", "GET"), ("endpoint", "/v4/linode/instances/{id}"), ("status", "200")]
        ),
        1.0
    );
    assert_eq!(
        ctx.service.metrics().histogram_count(
            "cloudmcp_tool_execution_duration_seconds",
            &[("tool", "linode_instance_get")]
        ),
        1
    );

    println!("     ✓ Details rendered and both metric families recorded once");
}

pub async fn test_string_identifier_is_accepted() {
    println!("  🧪 test_string_identifier_is_accepted");
    let ctx = TestContext::setup().await;
    ctx.stub_get("primary", INSTANCE_PATH, instance(123456, "web-1"))
        .await;

    let result = ctx
        .call("linode_instance_get", json!({ "instance_id": "123456" }))
        .await;
    assert_success(&result, "numeric string id should be coerced");
    assert_contains(&result, "ID: 123456");

    println!("     ✓ Numeric strings coerce to identifiers");
}

pub async fn test_provider_error() {
    println!("  🧪 test_provider_error");
    let ctx = TestContext::setup().await;
    Mock::given(method("GET"))
        .and(path("/v4/linode/instances/999"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"errors": [{"reason": "Not found"}]})),
        )
        .mount(&ctx.api)
        .await;

    let result = ctx
        .call("linode_instance_get", json!({ "instance_id": 999 }))
        .await;

    assert_error(&result, "missing instance should fail");
    assert_contains(&result, "linode_instance_get: failed to get instance:");
    assert_contains(&result, "Not found");
    assert_eq!(
        ctx.counter(
            "cloudmcp_linode_api_requests_total",
            &[("endpoint", "/v4/linode/instances/{id}"), ("status", "404")]
        ),
        1.0
    );
    assert_eq!(
        ctx.counter(
            "cloudmcp_tool_execution_total",
            &[("tool", "linode_instance_get"), ("status", "error")]
        ),
        1.0
    );

    println!("     ✓ Provider failure wrapped with tool and action");
}

pub async fn test_list_instances_updates_gauge() {
    println!("  🧪 test_list_instances_updates_gauge");
    let ctx = TestContext::setup().await;
    ctx.stub_get(
        "primary",
        "/v4/linode/instances",
        page(vec![instance(1, "web-1"), instance(2, "web-2")]),
    )
    .await;

    let result = ctx.call("linode_instances_list", json!({})).await;

    assert_success(&result, "instance list should succeed");
    assert_contains(&result, "Found 2 instances:");
    assert_contains(&result, "web-2 (ID: 2)");
    assert_eq!(
        ctx.service.metrics().gauge_value(
            "cloudmcp_resources",
            &[("resource_type", "instances"), ("account", "primary")]
        ),
        2.0
    );

    println!("     ✓ List rendered and resource gauge set");
}

pub async fn test_create_instance() {
    println!("  🧪 test_create_instance");
    let ctx = TestContext::setup().await;
    Mock::given(method("POST"))
        .and(path("/v4/linode/instances"))
        .and(header("Authorization", bearer("primary").as_str()))
        .and(body_json(json!({
            "region": "us-east",
            "type": "g6-nanode-1",
            "label": "api-1",
            "tags": ["api", "prod"],
            "booted": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(instance(777, "api-1")))
        .expect(1)
        .mount(&ctx.api)
        .await;

    let result = ctx
        .call(
            "linode_instance_create",
            json!({
                "region": "us-east",
                "type": "g6-nanode-1",
                "label": "api-1",
                "tags": ["api", "prod"],
                "booted": true,
                "unknown_key": "ignored"
            }),
        )
        .await;

    assert_success(&result, "create should succeed");
    assert_contains(&result, "Instance created successfully:");
    assert_contains(&result, "ID: 777");

    println!("     ✓ Request body built from coerced arguments");
}

pub async fn test_create_instance_reports_every_bad_argument() {
    println!("  🧪 test_create_instance_reports_every_bad_argument");
    let ctx = TestContext::setup().await;

    let result = ctx
        .call(
            "linode_instance_create",
            json!({ "type": 3, "booted": "yes", "tags": "web" }),
        )
        .await;

    assert_error(&result, "create with bad arguments should fail");
    for key in ["region", "type", "booted", "tags"] {
        assert_contains(&result, key);
    }
    assert_eq!(ctx.requests_to("/v4/linode/instances", None).await, 0);

    println!("     ✓ All argument errors reported together");
}

pub async fn test_power_operations() {
    println!("  🧪 test_power_operations");
    let ctx = TestContext::setup().await;
    for action in ["boot", "shutdown", "reboot"] {
        Mock::given(method("POST"))
            .and(path(format!("/v4/linode/instances/55/{action}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&ctx.api)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path("/v4/linode/instances/55"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&ctx.api)
        .await;

    let result = ctx
        .call("linode_instance_boot", json!({ "instance_id": 55 }))
        .await;
    assert_contains(&result, "Instance boot initiated successfully:");

    let result = ctx
        .call("linode_instance_shutdown", json!({ "instance_id": 55 }))
        .await;
    assert_contains(&result, "Instance shutdown initiated successfully:");

    let result = ctx
        .call("linode_instance_reboot", json!({ "instance_id": 55 }))
        .await;
    assert_contains(&result, "Instance reboot initiated successfully:");

    let result = ctx
        .call("linode_instance_delete", json!({ "instance_id": 55 }))
        .await;
    assert_success(&result, "delete should succeed");
    assert_eq!(result.text_content(), "Instance 55 deleted successfully.");

    println!("     ✓ Boot, shutdown, reboot and delete issued once each");
}

pub async fn run_all_tests() {
    println!("\n📦 Instance tests");
    test_missing_required_parameter().await;
    test_invalid_identifiers().await;
    test_get_instance().await;
    test_string_identifier_is_accepted().await;
    test_provider_error().await;
    test_list_instances_updates_gauge().await;
    test_create_instance().await;
    test_create_instance_reports_every_bad_argument().await;
    test_power_operations().await;
}
