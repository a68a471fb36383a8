//! Concurrency tests.
//!
//! Calls in flight keep the account they were dispatched with even when the
//! current account changes underneath them. Cancellation and shutdown stop
//! calls without touching other requests.

use super::common::*;
use cloudmcp_mcp::McpError;
use cloudmcp_mcp::protocol::{CallToolParams, CallToolResult, RequestContext};
use serde_json::json;
use std::time::Duration;
use tokio::task::JoinSet;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

const LIST_PATH: &str = "/v4/linode/instances";
const PER_ACCOUNT: usize = 5;

async fn stub_slow_list(ctx: &TestContext, account: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(header("Authorization", bearer(account).as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(vec![instance(1, &format!("{account}-web"))]))
                .set_delay(delay),
        )
        .mount(&ctx.api)
        .await;
}

fn spawn_list(ctx: &TestContext, calls: &mut JoinSet<Result<CallToolResult, McpError>>) {
    let service = ctx.service.clone();
    calls.spawn(async move {
        service
            .call_tool_for_testing(
                &RequestContext::new(),
                CallToolParams::new("linode_instances_list", json!({})),
            )
            .await
    });
}

/// Poll until `account` has `expected` calls running.
async fn wait_for_active(ctx: &TestContext, account: &str, expected: f64) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let active = ctx
            .service
            .metrics()
            .gauge_value("cloudmcp_active_connections", &[("account", account)]);
        if active == expected {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {expected} active calls on {account}, saw {active}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub async fn test_switch_during_parallel_calls() {
    println!("  🧪 test_switch_during_parallel_calls");
    let ctx = TestContext::setup().await;
    stub_slow_list(&ctx, "primary", Duration::from_millis(300)).await;
    stub_slow_list(&ctx, "staging", Duration::from_millis(50)).await;

    let mut calls = JoinSet::new();
    for _ in 0..PER_ACCOUNT {
        spawn_list(&ctx, &mut calls);
    }
    wait_for_active(&ctx, "primary", PER_ACCOUNT as f64).await;

    let switched = ctx
        .call("linode_account_switch", json!({ "account_name": "staging" }))
        .await;
    assert_success(&switched, "switch mid-flight should succeed");

    for _ in 0..PER_ACCOUNT {
        spawn_list(&ctx, &mut calls);
    }

    let mut texts = Vec::new();
    while let Some(joined) = calls.join_next().await {
        let result = joined
            .expect("call task should not panic")
            .expect("call should not fail at the protocol level");
        assert_success(&result, "parallel list should succeed");
        texts.push(result.text_content());
    }

    assert_eq!(texts.len(), 2 * PER_ACCOUNT);
    let primary = texts.iter().filter(|t| t.contains("primary-web")).count();
    let staging = texts.iter().filter(|t| t.contains("staging-web")).count();
    assert_eq!((primary, staging), (PER_ACCOUNT, PER_ACCOUNT));

    for account in ["primary", "staging"] {
        assert_eq!(
            ctx.counter(
                "cloudmcp_tool_execution_total",
                &[("tool", "linode_instances_list"), ("account", account)]
            ),
            PER_ACCOUNT as f64,
            "{account} should own exactly its own calls"
        );
        assert_eq!(ctx.requests_to(LIST_PATH, Some(account)).await, PER_ACCOUNT);
    }
    assert_eq!(
        ctx.counter(
            "cloudmcp_tool_execution_total",
            &[("tool", "linode_instances_list")]
        ),
        (2 * PER_ACCOUNT) as f64
    );
    assert_eq!(ctx.service.accounts().current_name(), "staging");
    wait_for_active(&ctx, "primary", 0.0).await;
    wait_for_active(&ctx, "staging", 0.0).await;

    println!("     ✓ Every call labeled with the account it started on");
}

pub async fn test_cancel_one_of_many() {
    println!("  🧪 test_cancel_one_of_many");
    let ctx = TestContext::setup().await;
    stub_slow_list(&ctx, "primary", Duration::from_millis(200)).await;

    let doomed = RequestContext::new().with_request_id("7");
    let cancel = doomed.cancellation.clone();
    let service = ctx.service.clone();
    let cancelled = tokio::spawn(async move {
        service
            .call_tool_for_testing(
                &doomed,
                CallToolParams::new("linode_instances_list", json!({})),
            )
            .await
    });

    let mut others = JoinSet::new();
    for _ in 0..3 {
        spawn_list(&ctx, &mut others);
    }
    wait_for_active(&ctx, "primary", 4.0).await;
    cancel.cancel();

    let outcome = cancelled.await.expect("cancelled task should not panic");
    assert!(matches!(outcome, Err(McpError::Cancelled)), "got {outcome:?}");

    while let Some(joined) = others.join_next().await {
        let result = joined
            .expect("call task should not panic")
            .expect("other calls should complete");
        assert_success(&result, "uncancelled call should succeed");
    }

    assert_eq!(
        ctx.counter(
            "cloudmcp_tool_execution_total",
            &[("tool", "linode_instances_list"), ("status", "error")]
        ),
        1.0
    );
    assert_eq!(
        ctx.counter(
            "cloudmcp_tool_execution_total",
            &[("tool", "linode_instances_list"), ("status", "success")]
        ),
        3.0
    );

    println!("     ✓ Only the cancelled call stopped");
}

pub async fn test_calls_after_shutdown_fail() {
    println!("  🧪 test_calls_after_shutdown_fail");
    let ctx = TestContext::setup().await;

    ctx.service
        .shutdown(&RequestContext::new())
        .await
        .expect("shutdown should succeed");

    let outcome = ctx
        .service
        .call_tool_for_testing(
            &RequestContext::new(),
            CallToolParams::new("linode_account_list", json!({})),
        )
        .await;
    assert!(matches!(outcome, Err(McpError::ShutDown)), "got {outcome:?}");
    assert_eq!(
        ctx.counter("cloudmcp_tool_execution_total", &[("tool", "linode_account_list")]),
        0.0
    );

    println!("     ✓ Shut down service rejects calls");
}

pub async fn run_all_tests() {
    println!("\n📦 Concurrency tests");
    test_switch_during_parallel_calls().await;
    test_cancel_one_of_many().await;
    test_calls_after_shutdown_fail().await;
}
