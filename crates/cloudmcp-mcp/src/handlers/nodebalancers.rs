//! NodeBalancer tools and their port configurations.

use super::format::{Details, list_result, or_none};
use super::id_schema;
use crate::args::{Arguments, Fields, parse_struct, require_id};
use crate::error::{McpError, ToolError};
use crate::protocol::{CallToolResult, InputSchema, PropertySpec, ToolDefinition};
use crate::tools::{ToolContext, ToolRegistry, handler};
use cloudmcp_linode::{
    CreateNodeBalancerRequest, NodeBalancer, NodeBalancerConfig, NodeBalancerConfigRequest,
    UpdateNodeBalancerRequest,
};

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), McpError> {
    registry.register(
        ToolDefinition::new(
            "linode_nodebalancers_list",
            "List all NodeBalancers",
            InputSchema::object(),
        )
        .read_only(),
        handler(nodebalancers_list),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_nodebalancer_get",
            "Get details of a NodeBalancer and its configurations",
            id_schema("nodebalancer_id", "ID of the NodeBalancer"),
        )
        .read_only(),
        handler(nodebalancer_get),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_nodebalancer_create",
            "Create a new NodeBalancer",
            create_schema(),
        ),
        handler(nodebalancer_create),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_nodebalancer_update",
            "Update a NodeBalancer",
            update_schema(),
        ),
        handler(nodebalancer_update),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_nodebalancer_delete",
            "Delete a NodeBalancer",
            id_schema("nodebalancer_id", "ID of the NodeBalancer to delete"),
        )
        .destructive(),
        handler(nodebalancer_delete),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_nodebalancer_config_create",
            "Add a port configuration to a NodeBalancer",
            config_schema(false),
        ),
        handler(config_create),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_nodebalancer_config_update",
            "Update a NodeBalancer port configuration",
            config_schema(true),
        ),
        handler(config_update),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_nodebalancer_config_delete",
            "Delete a NodeBalancer port configuration",
            InputSchema::object()
                .required("nodebalancer_id", PropertySpec::number("ID of the NodeBalancer"))
                .required(
                    "config_id",
                    PropertySpec::number("ID of the configuration to delete"),
                ),
        )
        .destructive(),
        handler(config_delete),
    )?;
    Ok(())
}

fn create_schema() -> InputSchema {
    InputSchema::object()
        .required("region", PropertySpec::string("Region ID, e.g. us-east"))
        .optional("label", PropertySpec::string("Label for the NodeBalancer"))
        .optional(
            "client_conn_throttle",
            PropertySpec::number("Connections per second allowed per client IP (0-20)"),
        )
        .optional("tags", PropertySpec::string_array("Tags to apply"))
}

fn update_schema() -> InputSchema {
    InputSchema::object()
        .required(
            "nodebalancer_id",
            PropertySpec::number("ID of the NodeBalancer to update"),
        )
        .optional("label", PropertySpec::string("New label"))
        .optional(
            "client_conn_throttle",
            PropertySpec::number("Connections per second allowed per client IP (0-20)"),
        )
        .optional("tags", PropertySpec::string_array("Replacement tags"))
}

/// Shared by create and update; update also names the configuration.
fn config_schema(with_config_id: bool) -> InputSchema {
    let mut schema = InputSchema::object()
        .required("nodebalancer_id", PropertySpec::number("ID of the NodeBalancer"));
    if with_config_id {
        schema = schema.required(
            "config_id",
            PropertySpec::number("ID of the configuration to update"),
        );
    }
    schema
        .optional("port", PropertySpec::number("Port to listen on (1-65535)"))
        .optional("protocol", PropertySpec::string("http, https or tcp"))
        .optional(
            "algorithm",
            PropertySpec::string("roundrobin, leastconn or source"),
        )
        .optional(
            "stickiness",
            PropertySpec::string("none, table or http_cookie"),
        )
        .optional("check", PropertySpec::string("none, connection, http or http_body"))
        .optional("check_path", PropertySpec::string("Path for HTTP health checks"))
        .optional(
            "check_interval",
            PropertySpec::number("Seconds between health checks"),
        )
        .optional(
            "check_timeout",
            PropertySpec::number("Seconds to wait for a health check response"),
        )
        .optional(
            "check_attempts",
            PropertySpec::number("Failed checks before a node is taken out of rotation"),
        )
}

fn config_request(fields: &Fields) -> NodeBalancerConfigRequest {
    NodeBalancerConfigRequest {
        port: fields.number("port"),
        protocol: fields.string("protocol").map(str::to_string),
        algorithm: fields.string("algorithm").map(str::to_string),
        stickiness: fields.string("stickiness").map(str::to_string),
        check: fields.string("check").map(str::to_string),
        check_path: fields.string("check_path").map(str::to_string),
        check_interval: fields.number("check_interval"),
        check_timeout: fields.number("check_timeout"),
        check_attempts: fields.number("check_attempts"),
    }
}

fn summary(nb: &NodeBalancer) -> String {
    Details::new(&format!("{} (ID: {})", nb.label, nb.id))
        .field("Region", &nb.region)
        .field("Hostname", or_none(Some(&nb.hostname)))
        .field("IPv4", or_none(Some(&nb.ipv4)))
        .finish()
}

fn config_details(title: &str, config: &NodeBalancerConfig) -> Details {
    let mut details = Details::new(title)
        .field("ID", config.id)
        .field("NodeBalancer ID", config.nodebalancer_id)
        .field("Port", config.port)
        .field("Protocol", &config.protocol)
        .field("Algorithm", &config.algorithm)
        .field("Stickiness", &config.stickiness)
        .field("Check", &config.check);
    if !config.check_path.is_empty() {
        details = details.field("Check Path", &config.check_path);
    }
    details
}

async fn nodebalancers_list(
    ctx: ToolContext,
    _args: Arguments,
) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let nodebalancers = account
        .client()
        .list_nodebalancers()
        .await
        .map_err(ctx.provider_err("list NodeBalancers"))?;

    ctx.metrics()
        .update_resource_count("nodebalancers", account.name(), nodebalancers.len());
    Ok(list_result("NodeBalancers", &nodebalancers, summary))
}

async fn nodebalancer_get(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "nodebalancer_id")?;
    let client = account.client();

    let nb = client
        .get_nodebalancer(id)
        .await
        .map_err(ctx.provider_err("get NodeBalancer"))?;
    let configs = client
        .list_nodebalancer_configs(id)
        .await
        .map_err(ctx.provider_err("list NodeBalancer configs"))?;

    let mut details = Details::new("NodeBalancer Details")
        .field("ID", nb.id)
        .field("Label", &nb.label)
        .field("Region", &nb.region)
        .field("Hostname", or_none(Some(&nb.hostname)))
        .field("IPv4", or_none(Some(&nb.ipv4)))
        .field("IPv6", or_none(nb.ipv6.as_deref()))
        .field("Client Connection Throttle", nb.client_conn_throttle)
        .list("Tags", &nb.tags)
        .field_opt("Created", nb.created.as_deref())
        .field_opt("Updated", nb.updated.as_deref());

    if let Some(transfer) = &nb.transfer {
        details = details
            .section("Transfer (MB)")
            .field_opt("In", transfer.inbound)
            .field_opt("Out", transfer.outbound)
            .field_opt("Total", transfer.total);
    }

    details = details.section(&format!("Configurations ({})", configs.len()));
    for config in &configs {
        let mut line = format!(
            "Port {} ({}, {}, ID: {})",
            config.port, config.protocol, config.algorithm, config.id
        );
        if let Some(status) = &config.nodes_status {
            line.push_str(&format!(" nodes up: {}, down: {}", status.up, status.down));
        }
        details = details.line(line);
    }

    Ok(details.into_result())
}

async fn nodebalancer_create(
    ctx: ToolContext,
    args: Arguments,
) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &create_schema())?;

    let request = CreateNodeBalancerRequest {
        region: fields.required_string("region"),
        label: fields.string("label").map(str::to_string),
        client_conn_throttle: fields.number("client_conn_throttle"),
        tags: fields.strings("tags"),
    };

    let nb = account
        .client()
        .create_nodebalancer(&request)
        .await
        .map_err(ctx.provider_err("create NodeBalancer"))?;

    Ok(Details::new("NodeBalancer created successfully")
        .field("ID", nb.id)
        .field("Label", &nb.label)
        .field("Region", &nb.region)
        .field("Hostname", or_none(Some(&nb.hostname)))
        .field("IPv4", or_none(Some(&nb.ipv4)))
        .into_result())
}

async fn nodebalancer_update(
    ctx: ToolContext,
    args: Arguments,
) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &update_schema())?;
    let id = fields.required_number("nodebalancer_id");

    let request = UpdateNodeBalancerRequest {
        label: fields.string("label").map(str::to_string),
        client_conn_throttle: fields.number("client_conn_throttle"),
        tags: fields.strings_if_present("tags"),
    };

    let nb = account
        .client()
        .update_nodebalancer(id, &request)
        .await
        .map_err(ctx.provider_err("update NodeBalancer"))?;

    Ok(Details::new("NodeBalancer updated successfully")
        .field("ID", nb.id)
        .field("Label", &nb.label)
        .field("Client Connection Throttle", nb.client_conn_throttle)
        .list("Tags", &nb.tags)
        .into_result())
}

async fn nodebalancer_delete(
    ctx: ToolContext,
    args: Arguments,
) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "nodebalancer_id")?;
    account
        .client()
        .delete_nodebalancer(id)
        .await
        .map_err(ctx.provider_err("delete NodeBalancer"))?;

    Ok(CallToolResult::text(format!(
        "NodeBalancer {id} deleted successfully."
    )))
}

async fn config_create(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &config_schema(false))?;
    let id = fields.required_number("nodebalancer_id");

    let config = account
        .client()
        .create_nodebalancer_config(id, &config_request(&fields))
        .await
        .map_err(ctx.provider_err("create NodeBalancer config"))?;

    Ok(config_details("NodeBalancer config created successfully", &config).into_result())
}

async fn config_update(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &config_schema(true))?;
    let id = fields.required_number("nodebalancer_id");
    let config_id = fields.required_number("config_id");

    let config = account
        .client()
        .update_nodebalancer_config(id, config_id, &config_request(&fields))
        .await
        .map_err(ctx.provider_err("update NodeBalancer config"))?;

    Ok(config_details("NodeBalancer config updated successfully", &config).into_result())
}

async fn config_delete(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "nodebalancer_id")?;
    let config_id = require_id(&args, "config_id")?;
    account
        .client()
        .delete_nodebalancer_config(id, config_id)
        .await
        .map_err(ctx.provider_err("delete NodeBalancer config"))?;

    Ok(CallToolResult::text(format!(
        "NodeBalancer config {config_id} deleted successfully from NodeBalancer {id}."
    )))
}
