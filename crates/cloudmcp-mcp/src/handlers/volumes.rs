//! Block storage volume tools.

use super::format::{Details, list_result};
use super::id_schema;
use crate::args::{Arguments, parse_struct, require_id};
use crate::error::{McpError, ToolError};
use crate::protocol::{CallToolResult, InputSchema, PropertySpec, ToolDefinition};
use crate::tools::{ToolContext, ToolRegistry, handler};
use cloudmcp_linode::{AttachVolumeRequest, CreateVolumeRequest, Volume};

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), McpError> {
    registry.register(
        ToolDefinition::new(
            "linode_volumes_list",
            "List all block storage volumes",
            InputSchema::object(),
        )
        .read_only(),
        handler(volumes_list),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_volume_get",
            "Get details of a block storage volume",
            id_schema("volume_id", "ID of the volume"),
        )
        .read_only(),
        handler(volume_get),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_volume_create",
            "Create a new block storage volume",
            create_schema(),
        ),
        handler(volume_create),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_volume_delete",
            "Delete a block storage volume",
            id_schema("volume_id", "ID of the volume to delete"),
        )
        .destructive(),
        handler(volume_delete),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_volume_attach",
            "Attach a volume to a Linode instance",
            attach_schema(),
        ),
        handler(volume_attach),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_volume_detach",
            "Detach a volume from its Linode instance",
            id_schema("volume_id", "ID of the volume to detach"),
        ),
        handler(volume_detach),
    )?;
    Ok(())
}

fn create_schema() -> InputSchema {
    InputSchema::object()
        .required("label", PropertySpec::string("Label for the volume"))
        .optional("size", PropertySpec::number("Size in GB (default 20)"))
        .optional(
            "region",
            PropertySpec::string("Region ID; required unless linode_id is set"),
        )
        .optional(
            "linode_id",
            PropertySpec::number("ID of an instance to attach the volume to"),
        )
        .optional("tags", PropertySpec::string_array("Tags to apply"))
}

fn attach_schema() -> InputSchema {
    InputSchema::object()
        .required("volume_id", PropertySpec::number("ID of the volume to attach"))
        .required("linode_id", PropertySpec::number("ID of the instance"))
        .optional(
            "config_id",
            PropertySpec::number("Configuration profile to attach to"),
        )
        .optional(
            "persist_across_boots",
            PropertySpec::boolean("Keep the volume attached across reboots"),
        )
}

fn attachment(volume: &Volume) -> String {
    match (volume.linode_id, volume.linode_label.as_deref()) {
        (Some(id), Some(label)) => format!("{label} (ID: {id})"),
        (Some(id), None) => id.to_string(),
        (None, _) => "none".to_string(),
    }
}

fn summary(volume: &Volume) -> String {
    Details::new(&format!("{} (ID: {})", volume.label, volume.id))
        .field("Status", &volume.status)
        .field("Size", format!("{} GB", volume.size))
        .field("Region", &volume.region)
        .field("Attached To", attachment(volume))
        .finish()
}

async fn volumes_list(ctx: ToolContext, _args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let volumes = account
        .client()
        .list_volumes()
        .await
        .map_err(ctx.provider_err("list volumes"))?;

    ctx.metrics()
        .update_resource_count("volumes", account.name(), volumes.len());
    Ok(list_result("volumes", &volumes, summary))
}

async fn volume_get(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "volume_id")?;
    let volume = account
        .client()
        .get_volume(id)
        .await
        .map_err(ctx.provider_err("get volume"))?;

    Ok(Details::new("Volume Details")
        .field("ID", volume.id)
        .field("Label", &volume.label)
        .field("Status", &volume.status)
        .field("Size", format!("{} GB", volume.size))
        .field("Region", &volume.region)
        .field("Attached To", attachment(&volume))
        .field("Filesystem Path", &volume.filesystem_path)
        .list("Tags", &volume.tags)
        .field_opt("Created", volume.created.as_deref())
        .field_opt("Updated", volume.updated.as_deref())
        .into_result())
}

async fn volume_create(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &create_schema())?;

    let request = CreateVolumeRequest {
        label: fields.required_string("label"),
        size: fields.number("size"),
        region: fields.string("region").map(str::to_string),
        linode_id: fields.number("linode_id"),
        tags: fields.strings("tags"),
    };

    let volume = account
        .client()
        .create_volume(&request)
        .await
        .map_err(ctx.provider_err("create volume"))?;

    Ok(Details::new("Volume created successfully")
        .field("ID", volume.id)
        .field("Label", &volume.label)
        .field("Status", &volume.status)
        .field("Size", format!("{} GB", volume.size))
        .field("Region", &volume.region)
        .into_result())
}

async fn volume_delete(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "volume_id")?;
    account
        .client()
        .delete_volume(id)
        .await
        .map_err(ctx.provider_err("delete volume"))?;

    Ok(CallToolResult::text(format!("Volume {id} deleted successfully.")))
}

async fn volume_attach(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &attach_schema())?;
    let id = fields.required_number("volume_id");

    let request = AttachVolumeRequest {
        linode_id: fields.required_number("linode_id"),
        config_id: fields.number("config_id"),
        persist_across_boots: fields.boolean("persist_across_boots"),
    };

    let volume = account
        .client()
        .attach_volume(id, &request)
        .await
        .map_err(ctx.provider_err("attach volume"))?;

    Ok(Details::new("Volume attached successfully")
        .field("ID", volume.id)
        .field("Label", &volume.label)
        .field("Attached To", attachment(&volume))
        .into_result())
}

async fn volume_detach(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "volume_id")?;
    account
        .client()
        .detach_volume(id)
        .await
        .map_err(ctx.provider_err("detach volume"))?;

    Ok(Details::new("Volume detach initiated successfully")
        .field("ID", id)
        .into_result())
}
