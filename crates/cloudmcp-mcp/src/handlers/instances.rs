//! Compute instance tools.

use super::format::{Details, list_result, or_none};
use super::id_schema;
use crate::args::{Arguments, parse_struct, require_id};
use crate::error::{McpError, ToolError};
use crate::protocol::{CallToolResult, InputSchema, PropertySpec, ToolDefinition};
use crate::tools::{ToolContext, ToolRegistry, handler};
use cloudmcp_linode::{CreateInstanceRequest, Instance};

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), McpError> {
    registry.register(
        ToolDefinition::new(
            "linode_instances_list",
            "List all Linode instances on the current account",
            InputSchema::object(),
        )
        .read_only(),
        handler(instances_list),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_instance_get",
            "Get details of a Linode instance",
            id_schema("instance_id", "ID of the instance"),
        )
        .read_only(),
        handler(instance_get),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_instance_create",
            "Create a new Linode instance",
            create_schema(),
        ),
        handler(instance_create),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_instance_delete",
            "Delete a Linode instance",
            id_schema("instance_id", "ID of the instance to delete"),
        )
        .destructive(),
        handler(instance_delete),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_instance_boot",
            "Boot a Linode instance",
            id_schema("instance_id", "ID of the instance to boot"),
        ),
        handler(instance_boot),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_instance_shutdown",
            "Shut down a Linode instance",
            id_schema("instance_id", "ID of the instance to shut down"),
        ),
        handler(instance_shutdown),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_instance_reboot",
            "Reboot a Linode instance",
            id_schema("instance_id", "ID of the instance to reboot"),
        ),
        handler(instance_reboot),
    )?;
    Ok(())
}

fn create_schema() -> InputSchema {
    InputSchema::object()
        .required("region", PropertySpec::string("Region ID, e.g. us-east"))
        .required("type", PropertySpec::string("Plan type ID, e.g. g6-nanode-1"))
        .optional("label", PropertySpec::string("Label for the instance"))
        .optional("image", PropertySpec::string("Image ID, e.g. linode/debian12"))
        .optional("root_pass", PropertySpec::string("Root password"))
        .optional(
            "authorized_keys",
            PropertySpec::string_array("SSH public keys for root"),
        )
        .optional("tags", PropertySpec::string_array("Tags to apply"))
        .optional("booted", PropertySpec::boolean("Boot the instance after creation"))
        .optional("private_ip", PropertySpec::boolean("Add a private IPv4 address"))
}

fn summary(instance: &Instance) -> String {
    let mut block = Details::new(&format!("{} (ID: {})", instance.label, instance.id))
        .field("Status", &instance.status)
        .field("Region", &instance.region)
        .field("Type", &instance.instance_type);
    if let Some(ip) = instance.ipv4.first() {
        block = block.field("IPv4", ip);
    }
    block.finish()
}

async fn instances_list(ctx: ToolContext, _args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let instances = account
        .client()
        .list_instances()
        .await
        .map_err(ctx.provider_err("list instances"))?;

    ctx.metrics()
        .update_resource_count("instances", account.name(), instances.len());
    Ok(list_result("instances", &instances, summary))
}

async fn instance_get(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "instance_id")?;
    let instance = account
        .client()
        .get_instance(id)
        .await
        .map_err(ctx.provider_err("get instance"))?;

    let mut details = Details::new("Instance Details")
        .field("ID", instance.id)
        .field("Label", &instance.label)
        .field("Status", &instance.status)
        .field("Region", &instance.region)
        .field("Type", &instance.instance_type)
        .field("Image", or_none(instance.image.as_deref()))
        .list("IPv4", &instance.ipv4)
        .field_opt("IPv6", instance.ipv6.as_deref())
        .field_opt("Hypervisor", instance.hypervisor.as_deref())
        .field_opt("Created", instance.created.as_deref())
        .field_opt("Updated", instance.updated.as_deref())
        .list("Tags", &instance.tags);

    if let Some(specs) = &instance.specs {
        details = details
            .section("Specs")
            .field("CPUs", specs.vcpus)
            .field("Memory", format!("{} MB", specs.memory))
            .field("Disk", format!("{} MB", specs.disk))
            .field("Transfer", format!("{} GB", specs.transfer));
    }

    Ok(details.into_result())
}

async fn instance_create(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &create_schema())?;

    let request = CreateInstanceRequest {
        region: fields.required_string("region"),
        instance_type: fields.required_string("type"),
        label: fields.string("label").map(str::to_string),
        image: fields.string("image").map(str::to_string),
        root_pass: fields.string("root_pass").map(str::to_string),
        authorized_keys: fields.strings("authorized_keys"),
        tags: fields.strings("tags"),
        booted: fields.boolean("booted"),
        private_ip: fields.boolean("private_ip"),
    };

    let instance = account
        .client()
        .create_instance(&request)
        .await
        .map_err(ctx.provider_err("create instance"))?;

    Ok(Details::new("Instance created successfully")
        .field("ID", instance.id)
        .field("Label", &instance.label)
        .field("Status", &instance.status)
        .field("Region", &instance.region)
        .field("Type", &instance.instance_type)
        .list("IPv4", &instance.ipv4)
        .into_result())
}

async fn instance_delete(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "instance_id")?;
    account
        .client()
        .delete_instance(id)
        .await
        .map_err(ctx.provider_err("delete instance"))?;

    Ok(CallToolResult::text(format!(
        "Instance {id} deleted successfully."
    )))
}

async fn instance_boot(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "instance_id")?;
    account
        .client()
        .boot_instance(id)
        .await
        .map_err(ctx.provider_err("boot instance"))?;

    Ok(Details::new("Instance boot initiated successfully")
        .field("ID", id)
        .into_result())
}

async fn instance_shutdown(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "instance_id")?;
    account
        .client()
        .shutdown_instance(id)
        .await
        .map_err(ctx.provider_err("shut down instance"))?;

    Ok(Details::new("Instance shutdown initiated successfully")
        .field("ID", id)
        .into_result())
}

async fn instance_reboot(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_id(&args, "instance_id")?;
    account
        .client()
        .reboot_instance(id)
        .await
        .map_err(ctx.provider_err("reboot instance"))?;

    Ok(Details::new("Instance reboot initiated successfully")
        .field("ID", id)
        .into_result())
}
