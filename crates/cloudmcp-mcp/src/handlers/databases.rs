//! Managed database tools.
//!
//! MySQL and PostgreSQL expose the same operations under different endpoint
//! trees, so each tool is registered once per [`DatabaseEngine`] with the
//! engine captured by the handler closure.

use super::format::{Details, list_result, or_none, yes_no};
use super::id_schema;
use crate::args::{Arguments, parse_struct, require_id};
use crate::error::{McpError, ToolError};
use crate::protocol::{CallToolResult, InputSchema, PropertySpec, ToolDefinition};
use crate::tools::{ToolContext, ToolRegistry, handler};
use cloudmcp_linode::{CreateDatabaseRequest, Database, DatabaseEngine, UpdateDatabaseRequest};

const ENGINES: [DatabaseEngine; 2] = [DatabaseEngine::MySql, DatabaseEngine::PostgreSql];

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), McpError> {
    registry.register(
        ToolDefinition::new(
            "linode_databases_list",
            "List managed databases of every engine",
            InputSchema::object(),
        )
        .read_only(),
        handler(databases_list),
    )?;

    for engine in ENGINES {
        register_engine(registry, engine)?;
    }
    Ok(())
}

/// Tool name prefix for an engine.
fn prefix(engine: DatabaseEngine) -> &'static str {
    match engine {
        DatabaseEngine::MySql => "mysql",
        DatabaseEngine::PostgreSql => "postgres",
    }
}

fn register_engine(registry: &mut ToolRegistry, engine: DatabaseEngine) -> Result<(), McpError> {
    let p = prefix(engine);
    let name = engine.display_name();

    registry.register(
        ToolDefinition::new(
            format!("linode_{p}_databases_list"),
            format!("List {name} managed databases"),
            InputSchema::object(),
        )
        .read_only(),
        handler(move |ctx, args| engine_list(engine, ctx, args)),
    )?;
    registry.register(
        ToolDefinition::new(
            format!("linode_{p}_database_get"),
            format!("Get details of a {name} managed database"),
            id_schema("database_id", "ID of the database"),
        )
        .read_only(),
        handler(move |ctx, args| database_get(engine, ctx, args)),
    )?;
    registry.register(
        ToolDefinition::new(
            format!("linode_{p}_database_create"),
            format!("Create a {name} managed database"),
            create_schema(engine),
        ),
        handler(move |ctx, args| database_create(engine, ctx, args)),
    )?;
    registry.register(
        ToolDefinition::new(
            format!("linode_{p}_database_update"),
            format!("Update the label or allow list of a {name} managed database"),
            update_schema(),
        ),
        handler(move |ctx, args| database_update(engine, ctx, args)),
    )?;
    registry.register(
        ToolDefinition::new(
            format!("linode_{p}_database_delete"),
            format!("Delete a {name} managed database"),
            id_schema("database_id", "ID of the database to delete"),
        )
        .destructive(),
        handler(move |ctx, args| database_delete(engine, ctx, args)),
    )?;
    registry.register(
        ToolDefinition::new(
            format!("linode_{p}_database_credentials"),
            format!("Show the root credentials of a {name} managed database"),
            id_schema("database_id", "ID of the database"),
        )
        .read_only(),
        handler(move |ctx, args| credentials_get(engine, ctx, args)),
    )?;
    registry.register(
        ToolDefinition::new(
            format!("linode_{p}_database_credentials_reset"),
            format!("Reset the root password of a {name} managed database"),
            id_schema("database_id", "ID of the database"),
        ),
        handler(move |ctx, args| credentials_reset(engine, ctx, args)),
    )?;
    Ok(())
}

fn create_schema(engine: DatabaseEngine) -> InputSchema {
    let example = match engine {
        DatabaseEngine::MySql => "mysql/8.0.30",
        DatabaseEngine::PostgreSql => "postgresql/14.6",
    };
    InputSchema::object()
        .required("label", PropertySpec::string("Label for the database"))
        .required("region", PropertySpec::string("Region ID, e.g. us-east"))
        .required("type", PropertySpec::string("Node plan type, e.g. g6-dedicated-2"))
        .required(
            "engine",
            PropertySpec::string(format!("Engine and version, e.g. {example}")),
        )
        .optional(
            "cluster_size",
            PropertySpec::number("Number of nodes: 1 or 3"),
        )
        .optional("encrypted", PropertySpec::boolean("Encrypt data at rest"))
        .optional(
            "ssl_connection",
            PropertySpec::boolean("Require SSL for client connections"),
        )
        .optional(
            "allow_list",
            PropertySpec::string_array("IP addresses or CIDR ranges allowed to connect"),
        )
}

fn update_schema() -> InputSchema {
    InputSchema::object()
        .required("database_id", PropertySpec::number("ID of the database to update"))
        .optional("label", PropertySpec::string("New label"))
        .optional(
            "allow_list",
            PropertySpec::string_array("Replacement allow list"),
        )
}

fn summary(db: &Database) -> String {
    Details::new(&format!("{} (ID: {})", db.label, db.id))
        .field("Engine", format!("{} {}", db.engine, db.version))
        .field("Status", &db.status)
        .field("Region", &db.region)
        .field("Type", &db.instance_type)
        .field("Cluster Size", db.cluster_size)
        .finish()
}

async fn databases_list(ctx: ToolContext, _args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let databases = account
        .client()
        .list_databases()
        .await
        .map_err(ctx.provider_err("list databases"))?;

    ctx.metrics()
        .update_resource_count("databases", account.name(), databases.len());
    Ok(list_result("databases", &databases, summary))
}

async fn engine_list(
    engine: DatabaseEngine,
    ctx: ToolContext,
    _args: Arguments,
) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let databases = account
        .client()
        .list_engine_databases(engine)
        .await
        .map_err(ctx.provider_err(&format!("list {engine} databases")))?;

    let resource = format!("{engine} databases");
    ctx.metrics().update_resource_count(
        &format!("{}_databases", prefix(engine)),
        account.name(),
        databases.len(),
    );
    Ok(list_result(&resource, &databases, summary))
}

async fn database_get(
    engine: DatabaseEngine,
    ctx: ToolContext,
    args: Arguments,
) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "database_id")?;
    let db = account
        .client()
        .get_database(engine, id)
        .await
        .map_err(ctx.provider_err(&format!("get {engine} database")))?;

    let mut details = Details::new(&format!("{engine} Database Details"))
        .field("ID", db.id)
        .field("Label", &db.label)
        .field("Engine", format!("{} {}", db.engine, db.version))
        .field("Status", &db.status)
        .field("Region", &db.region)
        .field("Type", &db.instance_type)
        .field("Cluster Size", db.cluster_size)
        .field_opt("Port", db.port)
        .field("SSL Connection", yes_no(db.ssl_connection))
        .field("Encrypted", yes_no(db.encrypted))
        .list("Allow List", &db.allow_list)
        .field_opt("Created", db.created.as_deref())
        .field_opt("Updated", db.updated.as_deref());

    if let Some(hosts) = &db.hosts {
        details = details
            .section("Hosts")
            .field("Primary", or_none(hosts.primary.as_deref()))
            .field("Secondary", or_none(hosts.secondary.as_deref()));
    }

    Ok(details.into_result())
}

async fn database_create(
    engine: DatabaseEngine,
    ctx: ToolContext,
    args: Arguments,
) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &create_schema(engine))?;

    let request = CreateDatabaseRequest {
        label: fields.required_string("label"),
        region: fields.required_string("region"),
        instance_type: fields.required_string("type"),
        engine: fields.required_string("engine"),
        cluster_size: fields.number("cluster_size"),
        encrypted: fields.boolean("encrypted"),
        ssl_connection: fields.boolean("ssl_connection"),
        allow_list: fields.strings("allow_list"),
    };

    let db = account
        .client()
        .create_database(engine, &request)
        .await
        .map_err(ctx.provider_err(&format!("create {engine} database")))?;

    Ok(Details::new(&format!("{engine} database created successfully"))
        .field("ID", db.id)
        .field("Label", &db.label)
        .field("Engine", format!("{} {}", db.engine, db.version))
        .field("Status", &db.status)
        .field("Region", &db.region)
        .into_result())
}

async fn database_update(
    engine: DatabaseEngine,
    ctx: ToolContext,
    args: Arguments,
) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &update_schema())?;
    let id = fields.required_number("database_id");

    let request = UpdateDatabaseRequest {
        label: fields.string("label").map(str::to_string),
        allow_list: fields.strings_if_present("allow_list"),
    };

    let db = account
        .client()
        .update_database(engine, id, &request)
        .await
        .map_err(ctx.provider_err(&format!("update {engine} database")))?;

    Ok(Details::new(&format!("{engine} database updated successfully"))
        .field("ID", db.id)
        .field("Label", &db.label)
        .list("Allow List", &db.allow_list)
        .into_result())
}

async fn database_delete(
    engine: DatabaseEngine,
    ctx: ToolContext,
    args: Arguments,
) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "database_id")?;
    account
        .client()
        .delete_database(engine, id)
        .await
        .map_err(ctx.provider_err(&format!("delete {engine} database")))?;

    Ok(CallToolResult::text(format!(
        "{engine} database {id} deleted successfully."
    )))
}

async fn credentials_get(
    engine: DatabaseEngine,
    ctx: ToolContext,
    args: Arguments,
) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "database_id")?;
    let credentials = account
        .client()
        .get_database_credentials(engine, id)
        .await
        .map_err(ctx.provider_err(&format!("get {engine} database credentials")))?;

    Ok(Details::new(&format!("{engine} Database Credentials"))
        .field("Database ID", id)
        .field("Username", &credentials.username)
        .field("Password", &credentials.password)
        .into_result())
}

async fn credentials_reset(
    engine: DatabaseEngine,
    ctx: ToolContext,
    args: Arguments,
) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "database_id")?;
    account
        .client()
        .reset_database_credentials(engine, id)
        .await
        .map_err(ctx.provider_err(&format!("reset {engine} database credentials")))?;

    Ok(Details::new(&format!("{engine} database credentials reset successfully"))
        .field("Database ID", id)
        .line("")
        .line("Fetch the new password with the credentials tool.")
        .into_result())
}
