//! Tools introspection commands.
//!
//! `cloudmcp tools list` - List every tool in the catalog (offline).
//! `cloudmcp tools describe` - Show the input schema of one tool.
//!
//! Both read the same catalog the server publishes, so no configuration or
//! token is needed.

use anyhow::{Context, Result};
use cloudmcp_mcp::handlers;
use cloudmcp_mcp::protocol::ToolDefinition;

fn catalog() -> Result<Vec<ToolDefinition>> {
    let registry = handlers::catalog().context("Failed to build the tool catalog")?;
    Ok(registry.list().into_iter().cloned().collect())
}

fn badges(tool: &ToolDefinition) -> &'static str {
    match &tool.annotations {
        Some(a) if a.destructive_hint == Some(true) => "write, destructive",
        Some(a) if a.read_only_hint == Some(true) => "read",
        _ => "write",
    }
}

/// List every tool.
pub fn list(verbose: bool) -> Result<()> {
    let tools = catalog()?;

    println!("\n🔧 Available Tools ({}):", tools.len());

    for tool in &tools {
        println!("   • {} ({})", tool.name, badges(tool));
        println!("     {}", tool.description);

        if verbose {
            println!(
                "     Schema: {}",
                serde_json::to_string_pretty(&tool.input_schema)?
            );
        }
    }

    println!();

    Ok(())
}

/// Show detailed schema for a specific tool.
pub fn describe(tool_name: &str) -> Result<()> {
    let tools = catalog()?;

    let tool = tools
        .iter()
        .find(|t| t.name == tool_name)
        .ok_or_else(|| anyhow::anyhow!("Tool '{}' not found", tool_name))?;

    println!("\nTool: {}", tool.name);
    println!("\nDescription: {}", tool.description);

    let required = &tool.input_schema.required;
    if !required.is_empty() {
        println!("\nRequired: {}", required.join(", "));
    }

    println!("\nInput Schema:");
    println!("{}", serde_json::to_string_pretty(&tool.input_schema)?);

    if let Some(annotations) = &tool.annotations {
        println!("\nAnnotations:");
        if let Some(true) = annotations.read_only_hint {
            println!("  • readOnlyHint: true");
        }
        if let Some(true) = annotations.destructive_hint {
            println!("  • destructiveHint: true");
        }
    }

    println!();

    Ok(())
}
