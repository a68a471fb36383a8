//! Resource family tests.
//!
//! One or two representative tools per family: volumes, images, IP
//! addresses, NodeBalancers and managed databases.

use super::common::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn volume(id: i64, label: &str, linode_id: Option<i64>) -> Value {
    json!({
        "id": id,
        "label": label,
        "status": "active",
        "size": 20,
        "region": "us-east",
        "linode_id": linode_id,
        "linode_label": linode_id.map(|_| "web-1"),
        "filesystem_path": format!("/dev/disk/by-id/scsi-0Linode_Volume_{label}"),
        "tags": []
    })
}

fn image(id: &str, is_public: bool) -> Value {
    json!({
        "id": id,
        "label": id,
        "status": "available",
        "type": if is_public { "manual" } else { "automatic" },
        "is_public": is_public,
        "deprecated": false,
        "size": 2500,
        "vendor": if is_public { Some("Debian") } else { None },
        "regions": [{ "region": "us-east", "status": "available" }],
        "tags": []
    })
}

fn database(id: i64, engine: &str) -> Value {
    json!({
        "id": id,
        "label": format!("{engine}-db"),
        "engine": engine,
        "version": "8.0.30",
        "region": "us-east",
        "status": "active",
        "type": "g6-dedicated-2",
        "cluster_size": 3,
        "hosts": { "primary": "lin-1-mysql-primary.servers.linodedb.net", "secondary": null },
        "port": 3306,
        "ssl_connection": true,
        "encrypted": false,
        "allow_list": ["203.0.113.1/32"]
    })
}

// =============================================================================
// VOLUMES
// =============================================================================

pub async fn test_volume_list_and_get() {
    println!("  🧪 test_volume_list_and_get");
    let ctx = TestContext::setup().await;
    ctx.stub_get(
        "primary",
        "/v4/volumes",
        page(vec![volume(1, "data", Some(9)), volume(2, "backup", None)]),
    )
    .await;
    ctx.stub_get("primary", "/v4/volumes/1", volume(1, "data", Some(9)))
        .await;

    let result = ctx.call("linode_volumes_list", json!({})).await;
    assert_success(&result, "volume list should succeed");
    assert_contains(&result, "Found 2 volumes:");
    assert_contains(&result, "Attached To: web-1 (ID: 9)");
    assert_contains(&result, "Attached To: none");

    let result = ctx.call("linode_volume_get", json!({ "volume_id": 1 })).await;
    assert_contains(&result, "Volume Details:");
    assert_contains(&result, "Size: 20 GB");
    assert_contains(&result, "Filesystem Path: /dev/disk/by-id/scsi-0Linode_Volume_data");

    println!("     ✓ Volumes listed and fetched");
}

pub async fn test_volume_attach() {
    println!("  🧪 test_volume_attach");
    let ctx = TestContext::setup().await;
    Mock::given(method("POST"))
        .and(path("/v4/volumes/3/attach"))
        .and(body_json(json!({ "linode_id": 9, "persist_across_boots": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(volume(3, "logs", Some(9))))
        .expect(1)
        .mount(&ctx.api)
        .await;

    let result = ctx
        .call(
            "linode_volume_attach",
            json!({ "volume_id": 3, "linode_id": "9", "persist_across_boots": true }),
        )
        .await;

    assert_success(&result, "attach should succeed");
    assert_contains(&result, "Volume attached successfully:");
    assert_contains(&result, "Attached To: web-1 (ID: 9)");

    println!("     ✓ Attach body built from coerced arguments");
}

// =============================================================================
// IMAGES
// =============================================================================

pub async fn test_image_list_filter_and_get() {
    println!("  🧪 test_image_list_filter_and_get");
    let ctx = TestContext::setup().await;
    ctx.stub_get(
        "primary",
        "/v4/images",
        page(vec![image("linode/debian12", true), image("private/42", false)]),
    )
    .await;
    ctx.stub_get("primary", "/v4/images/private/42", image("private/42", false))
        .await;

    let result = ctx
        .call("linode_images_list", json!({ "is_public": false }))
        .await;
    assert_success(&result, "image list should succeed");
    assert_contains(&result, "Found 1 images:");
    assert_contains(&result, "private/42");
    assert!(!result.text_content().contains("linode/debian12"));

    let result = ctx
        .call("linode_image_get", json!({ "image_id": "private/42" }))
        .await;
    assert_contains(&result, "Image Details:");
    assert_contains(&result, "ID: private/42");
    assert_contains(&result, "Regions: us-east (available)");

    let result = ctx.call("linode_image_get", json!({ "image_id": 42 })).await;
    assert_error(&result, "numeric image id should fail");
    assert_contains(&result, "image_id");

    println!("     ✓ Filter applied and string image ids used");
}

pub async fn test_image_id_path_escape_rejected() {
    println!("  🧪 test_image_id_path_escape_rejected");
    let ctx = TestContext::setup().await;
    Mock::given(method("DELETE"))
        .and(path("/v4/linode/instances/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&ctx.api)
        .await;

    let result = ctx
        .call("linode_image_delete", json!({ "image_id": "../linode/instances/123" }))
        .await;
    assert_error(&result, "traversal image id should fail");
    assert_contains(&result, "invalid value for parameter image_id");

    let result = ctx
        .call(
            "linode_image_update",
            json!({ "image_id": "private/42?label=x", "label": "renamed" }),
        )
        .await;
    assert_error(&result, "image id with a query should fail");

    let result = ctx
        .call("linode_ip_get", json!({ "address": "../../account" }))
        .await;
    assert_error(&result, "traversal address should fail");
    assert_contains(&result, "invalid value for parameter address");

    assert_eq!(ctx.requests_to("/v4/linode/instances/123", None).await, 0);
    assert_eq!(ctx.requests_to("/v4/account", None).await, 0);
    assert_eq!(
        ctx.counter(
            "cloudmcp_linode_api_requests_total",
            &[("endpoint", "/v4/images/{id}")]
        ),
        0.0
    );

    println!("     ✓ Identifiers cannot escape their resource path");
}

pub async fn test_image_upload_create() {
    println!("  🧪 test_image_upload_create");
    let ctx = TestContext::setup().await;
    Mock::given(method("POST"))
        .and(path("/v4/images/upload"))
        .and(body_json(json!({ "label": "golden", "region": "us-east" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "image": image("private/77", false),
            "upload_to": "https://us-east-1.linodeobjects.com/upload/abc"
        })))
        .mount(&ctx.api)
        .await;

    let result = ctx
        .call(
            "linode_image_upload_create",
            json!({ "label": "golden", "region": "us-east" }),
        )
        .await;

    assert_success(&result, "upload create should succeed");
    assert_contains(&result, "Upload URL: https://us-east-1.linodeobjects.com/upload/abc");

    println!("     ✓ Upload URL returned");
}

// =============================================================================
// NETWORKING
// =============================================================================

pub async fn test_ip_list_and_get() {
    println!("  🧪 test_ip_list_and_get");
    let ctx = TestContext::setup().await;
    let public_ip = json!({
        "address": "192.0.2.10", "type": "ipv4", "public": true, "region": "us-east",
        "linode_id": 9, "gateway": "192.0.2.1", "subnet_mask": "255.255.255.0",
        "prefix": 24, "rdns": "web-1.example.com"
    });
    let private_ip = json!({
        "address": "192.168.1.5", "type": "ipv4", "public": false, "region": "us-east",
        "linode_id": 9, "prefix": 17
    });
    ctx.stub_get("primary", "/v4/networking/ips", page(vec![public_ip.clone(), private_ip]))
        .await;
    ctx.stub_get("primary", "/v4/networking/ips/192.0.2.10", public_ip)
        .await;

    let result = ctx.call("linode_ips_list", json!({ "public": true })).await;
    assert_contains(&result, "Found 1 IP addresses:");
    assert!(!result.text_content().contains("192.168.1.5"));

    let result = ctx
        .call("linode_ip_get", json!({ "address": "192.0.2.10" }))
        .await;
    assert_contains(&result, "IP Address Details:");
    assert_contains(&result, "Reverse DNS: web-1.example.com");
    assert_contains(&result, "Gateway: 192.0.2.1");

    println!("     ✓ Public filter applied and address fetched");
}

// =============================================================================
// NODEBALANCERS
// =============================================================================

pub async fn test_nodebalancer_get_with_configs() {
    println!("  🧪 test_nodebalancer_get_with_configs");
    let ctx = TestContext::setup().await;
    ctx.stub_get(
        "primary",
        "/v4/nodebalancers/12",
        json!({
            "id": 12, "label": "lb-1", "region": "us-east",
            "hostname": "nb-192-0-2-20.newark.nodebalancer.linode.com",
            "ipv4": "192.0.2.20", "ipv6": null, "client_conn_throttle": 0,
            "transfer": { "in": 10.5, "out": null, "total": 10.5 }, "tags": []
        }),
    )
    .await;
    ctx.stub_get(
        "primary",
        "/v4/nodebalancers/12/configs",
        page(vec![json!({
            "id": 4, "nodebalancer_id": 12, "port": 443, "protocol": "https",
            "algorithm": "roundrobin", "stickiness": "none", "check": "connection",
            "nodes_status": { "up": 2, "down": 0 }
        })]),
    )
    .await;

    let result = ctx
        .call("linode_nodebalancer_get", json!({ "nodebalancer_id": 12 }))
        .await;

    assert_success(&result, "nodebalancer get should succeed");
    assert_contains(&result, "NodeBalancer Details:");
    assert_contains(&result, "IPv6: none");
    assert_contains(&result, "Configurations (1):");
    assert_contains(&result, "Port 443 (https, roundrobin, ID: 4) nodes up: 2, down: 0");

    println!("     ✓ NodeBalancer rendered with its configurations");
}

pub async fn test_nodebalancer_config_delete() {
    println!("  🧪 test_nodebalancer_config_delete");
    let ctx = TestContext::setup().await;
    Mock::given(method("DELETE"))
        .and(path("/v4/nodebalancers/12/configs/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&ctx.api)
        .await;

    let result = ctx
        .call("linode_nodebalancer_config_delete", json!({ "nodebalancer_id": 12 }))
        .await;
    assert_error(&result, "config delete without config_id should fail");
    assert_contains(&result, "missing required parameter: config_id");

    let result = ctx
        .call(
            "linode_nodebalancer_config_delete",
            json!({ "nodebalancer_id": 12, "config_id": 4 }),
        )
        .await;
    assert_success(&result, "config delete should succeed");
    assert_contains(&result, "config 4 deleted successfully from NodeBalancer 12");

    println!("     ✓ Both identifiers required and used");
}

// =============================================================================
// DATABASES
// =============================================================================

pub async fn test_database_engines() {
    println!("  🧪 test_database_engines");
    let ctx = TestContext::setup().await;
    ctx.stub_get(
        "primary",
        "/v4/databases/instances",
        page(vec![database(1, "mysql"), database(2, "postgresql")]),
    )
    .await;
    ctx.stub_get(
        "primary",
        "/v4/databases/mysql/instances/1",
        database(1, "mysql"),
    )
    .await;
    ctx.stub_get(
        "primary",
        "/v4/databases/postgresql/instances/2/credentials",
        json!({ "username": "linroot", "password": "s3cret" }),
    )
    .await;

    let result = ctx.call("linode_databases_list", json!({})).await;
    assert_contains(&result, "Found 2 databases:");

    let result = ctx
        .call("linode_mysql_database_get", json!({ "database_id": 1 }))
        .await;
    assert_contains(&result, "MySQL Database Details:");
    assert_contains(&result, "Primary: lin-1-mysql-primary.servers.linodedb.net");
    assert_contains(&result, "Secondary: none");

    let result = ctx
        .call("linode_postgres_database_credentials", json!({ "database_id": 2 }))
        .await;
    assert_contains(&result, "PostgreSQL Database Credentials:");
    assert_contains(&result, "Username: linroot");

    assert_eq!(
        ctx.counter(
            "cloudmcp_linode_api_requests_total",
            &[("endpoint", "/v4/databases/postgresql/instances/{id}/credentials")]
        ),
        1.0
    );

    println!("     ✓ Each engine routed to its own endpoint tree");
}

pub async fn run_all_tests() {
    println!("\n📦 Resource tests");
    test_volume_list_and_get().await;
    test_volume_attach().await;
    test_image_list_filter_and_get().await;
    test_image_id_path_escape_rejected().await;
    test_image_upload_create().await;
    test_ip_list_and_get().await;
    test_nodebalancer_get_with_configs().await;
    test_nodebalancer_config_delete().await;
    test_database_engines().await;
}
