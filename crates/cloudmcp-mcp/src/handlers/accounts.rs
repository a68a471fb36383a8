//! Account tools: inspect, list and switch the configured accounts.

use super::format::{Details, or_none};
use crate::args::{Arguments, require_string};
use crate::error::{McpError, ToolError};
use crate::protocol::{CallToolResult, InputSchema, PropertySpec, ToolDefinition};
use crate::tools::{ToolContext, ToolRegistry, handler};
use std::fmt::Write;

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), McpError> {
    registry.register(
        ToolDefinition::new(
            "linode_account_get",
            "Get details of the Linode account currently in use",
            InputSchema::object(),
        )
        .read_only(),
        handler(account_get),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_account_list",
            "List all configured Linode accounts and show which one is current",
            InputSchema::object(),
        )
        .read_only(),
        handler(account_list),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_account_switch",
            "Switch the account used by subsequent tool calls",
            InputSchema::object().required(
                "account_name",
                PropertySpec::string("Name of the configured account to switch to"),
            ),
        ),
        handler(account_switch),
    )?;
    Ok(())
}

async fn account_get(ctx: ToolContext, _args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let info = account
        .client()
        .get_account()
        .await
        .map_err(ctx.provider_err("get account"))?;

    let name = format!("{} {}", info.first_name, info.last_name);
    Ok(Details::new("Account Details")
        .field("Account", account.name())
        .field("Label", or_none(Some(account.label())))
        .field("Name", or_none(Some(name.trim())))
        .field("Company", or_none(Some(&info.company)))
        .field("Email", or_none(Some(&info.email)))
        .field("Country", or_none(Some(&info.country)))
        .field("Balance", format!("${:.2}", info.balance))
        .field("Uninvoiced Balance", format!("${:.2}", info.balance_uninvoiced))
        .field_opt("Active Since", info.active_since.as_deref())
        .field_opt("EUUID", info.euuid.as_deref())
        .into_result())
}

async fn account_list(ctx: ToolContext, _args: Arguments) -> Result<CallToolResult, ToolError> {
    let accounts = ctx.accounts().list();
    let current = ctx.accounts().current_name();

    let mut out = String::from("Configured Linode Accounts:\n");
    for (name, label) in &accounts {
        let marker = if *name == current { " (current)" } else { "" };
        let _ = writeln!(out, "  - {name}: {}{marker}", or_none(Some(label)));
    }
    let _ = write!(out, "\nCurrent Account: {current}");

    Ok(CallToolResult::text(out))
}

async fn account_switch(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let name = require_string(&args, "account_name")?;
    let previous = ctx.accounts().switch(&name)?;
    let account = ctx.accounts().get(&name)?;

    Ok(Details::new("Account switched successfully")
        .field("Previous Account", previous)
        .field("Current Account", account.name())
        .field("Label", or_none(Some(account.label())))
        .into_result())
}
