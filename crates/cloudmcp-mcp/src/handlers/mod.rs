//! Tool handlers, one module per resource family.
//!
//! Every handler resolves the account snapshot from its [`ToolContext`],
//! coerces its arguments, makes one or two client calls and renders the
//! response as text.
//!
//! [`ToolContext`]: crate::tools::ToolContext

mod accounts;
mod databases;
mod format;
mod images;
mod instances;
mod networking;
mod nodebalancers;
mod volumes;

use crate::error::McpError;
use crate::protocol::{InputSchema, PropertySpec};
use crate::tools::ToolRegistry;

/// Register every tool of the catalog.
pub fn register_all(registry: &mut ToolRegistry) -> Result<(), McpError> {
    accounts::register(registry)?;
    instances::register(registry)?;
    volumes::register(registry)?;
    images::register(registry)?;
    networking::register(registry)?;
    nodebalancers::register(registry)?;
    databases::register(registry)?;
    Ok(())
}

/// A registry holding the full catalog.
pub fn catalog() -> Result<ToolRegistry, McpError> {
    let mut registry = ToolRegistry::new();
    register_all(&mut registry)?;
    Ok(registry)
}

/// Schema with a single required numeric identifier.
fn id_schema(key: &str, description: &str) -> InputSchema {
    InputSchema::object().required(key, PropertySpec::number(description))
}
