//! Account management tests.
//!
//! Covers listing the configured accounts, switching between them and the
//! metrics a failed switch leaves behind.

use super::common::*;
use serde_json::json;

pub async fn test_account_list() {
    println!("  🧪 test_account_list");
    let ctx = TestContext::setup().await;

    let result = ctx.call("linode_account_list", json!({})).await;

    assert_success(&result, "account list should succeed");
    assert_contains(&result, "Configured Linode Accounts:");
    assert_contains(&result, "Current Account:");
    for (name, _) in ACCOUNTS {
        assert_contains(&result, name);
    }
    assert_contains(&result, "primary: Production (current)");
    assert_eq!(ctx.requests_to("/v4/account", None).await, 0);

    println!("     ✓ All accounts listed with the current one marked");
}

pub async fn test_account_switch_success() {
    println!("  🧪 test_account_switch_success");
    let ctx = TestContext::setup().await;
    ctx.stub_get(
        "development",
        "/v4/account",
        json!({
            "company": "Dev Co",
            "email": "dev@example.com",
            "first_name": "Dana",
            "last_name": "Dev",
            "country": "US",
            "balance": 0.0,
            "balance_uninvoiced": 1.5
        }),
    )
    .await;

    let result = ctx
        .call("linode_account_switch", json!({ "account_name": "development" }))
        .await;
    assert_success(&result, "switch should succeed");
    assert_contains(&result, "Account switched successfully");
    assert_contains(&result, "Previous Account: primary");
    assert_contains(&result, "development");

    let result = ctx.call("linode_account_get", json!({})).await;
    assert_success(&result, "account get should use the new account");
    assert_contains(&result, "Account: development");
    assert_contains(&result, "Company: Dev Co");
    assert_eq!(ctx.requests_to("/v4/account", Some("development")).await, 1);
    assert_eq!(ctx.requests_to("/v4/account", Some("primary")).await, 0);

    assert_eq!(
        ctx.counter(
            "cloudmcp_account_switches_total",
            &[("from_account", "primary"), ("to_account", "development"), ("status", "success")]
        ),
        1.0
    );

    println!("     ✓ Subsequent calls route through the development client");
}

pub async fn test_account_switch_failure() {
    println!("  🧪 test_account_switch_failure");
    let ctx = TestContext::setup().await;
    ctx.call("linode_account_switch", json!({ "account_name": "development" }))
        .await;

    let result = ctx
        .call("linode_account_switch", json!({ "account_name": "nonexistent" }))
        .await;

    assert_error(&result, "switch to an unknown account should fail");
    assert_contains(&result, "account not found: nonexistent");
    assert_eq!(ctx.service.accounts().current_name(), "development");
    assert_eq!(
        ctx.counter(
            "cloudmcp_account_switches_total",
            &[("from_account", "development"), ("to_account", "nonexistent"), ("status", "error")]
        ),
        1.0
    );
    assert_eq!(
        ctx.counter(
            "cloudmcp_tool_execution_total",
            &[("tool", "linode_account_switch"), ("account", "development"), ("status", "error")]
        ),
        1.0
    );

    println!("     ✓ Current account unchanged and failure counted");
}

pub async fn test_account_switch_requires_name() {
    println!("  🧪 test_account_switch_requires_name");
    let ctx = TestContext::setup().await;

    let result = ctx
        .call("linode_account_switch", json!({ "account_name": 7 }))
        .await;
    assert_error(&result, "non-string account name should fail");
    assert_contains(&result, "account_name");
    assert_eq!(ctx.service.accounts().current_name(), "primary");

    println!("     ✓ Wrong argument type rejected");
}

pub async fn run_all_tests() {
    println!("\n📦 Account tests");
    test_account_list().await;
    test_account_switch_success().await;
    test_account_switch_failure().await;
    test_account_switch_requires_name().await;
}
