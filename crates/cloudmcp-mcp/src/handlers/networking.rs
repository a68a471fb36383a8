//! IP address tools.

use super::format::{Details, list_result, or_none, yes_no};
use crate::args::{Arguments, optional_bool, require_identifier};
use crate::error::{McpError, ToolError};
use crate::protocol::{CallToolResult, InputSchema, PropertySpec, ToolDefinition};
use crate::tools::{ToolContext, ToolRegistry, handler};
use cloudmcp_linode::IpAddress;

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), McpError> {
    registry.register(
        ToolDefinition::new(
            "linode_ips_list",
            "List IP addresses on the current account",
            InputSchema::object().optional(
                "public",
                PropertySpec::boolean("Only public (true) or only private (false) addresses"),
            ),
        )
        .read_only(),
        handler(ips_list),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_ip_get",
            "Get details of an IP address",
            InputSchema::object()
                .required("address", PropertySpec::string("The IP address to look up")),
        )
        .read_only(),
        handler(ip_get),
    )?;
    Ok(())
}

fn assigned_to(ip: &IpAddress) -> String {
    ip.linode_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "none".to_string())
}

fn summary(ip: &IpAddress) -> String {
    Details::new(&ip.address)
        .field("Type", &ip.address_type)
        .field("Public", yes_no(ip.public))
        .field("Region", &ip.region)
        .field("Linode ID", assigned_to(ip))
        .finish()
}

async fn ips_list(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let public = optional_bool(&args, "public")?;
    let mut ips = account
        .client()
        .list_ips()
        .await
        .map_err(ctx.provider_err("list IP addresses"))?;

    if let Some(public) = public {
        ips.retain(|ip| ip.public == public);
    }

    ctx.metrics()
        .update_resource_count("ips", account.name(), ips.len());
    Ok(list_result("IP addresses", &ips, summary))
}

async fn ip_get(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let address = require_identifier(&args, "address")?;
    let ip = account
        .client()
        .get_ip(&address)
        .await
        .map_err(ctx.provider_err("get IP address"))?;

    Ok(Details::new("IP Address Details")
        .field("Address", &ip.address)
        .field("Type", &ip.address_type)
        .field("Public", yes_no(ip.public))
        .field("Region", &ip.region)
        .field("Linode ID", assigned_to(&ip))
        .field_opt("Gateway", ip.gateway.as_deref())
        .field_opt("Subnet Mask", ip.subnet_mask.as_deref())
        .field_opt("Prefix", ip.prefix)
        .field("Reverse DNS", or_none(ip.rdns.as_deref()))
        .into_result())
}
