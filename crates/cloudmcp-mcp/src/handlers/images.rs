//! Image tools, including replication and direct uploads.

use super::format::{Details, list_result, or_none, yes_no};
use crate::args::{
    Arguments, check_identifier, optional_bool, parse_struct, require_identifier,
};
use crate::error::{McpError, ToolError};
use crate::protocol::{CallToolResult, InputSchema, PropertySpec, ToolDefinition};
use crate::tools::{ToolContext, ToolRegistry, handler};
use cloudmcp_linode::{
    CreateImageRequest, Image, ReplicateImageRequest, UpdateImageRequest, UploadImageRequest,
};

pub(super) fn register(registry: &mut ToolRegistry) -> Result<(), McpError> {
    registry.register(
        ToolDefinition::new(
            "linode_images_list",
            "List images available to the current account",
            InputSchema::object().optional(
                "is_public",
                PropertySpec::boolean("Only public (true) or only private (false) images"),
            ),
        )
        .read_only(),
        handler(images_list),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_image_get",
            "Get details of an image",
            image_id_schema("ID of the image, e.g. private/12345"),
        )
        .read_only(),
        handler(image_get),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_image_create",
            "Create a private image from an instance disk",
            create_schema(),
        ),
        handler(image_create),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_image_update",
            "Update the label, description or tags of a private image",
            update_schema(),
        ),
        handler(image_update),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_image_delete",
            "Delete a private image",
            image_id_schema("ID of the image to delete"),
        )
        .destructive(),
        handler(image_delete),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_image_replicate",
            "Replicate a private image to additional regions",
            replicate_schema(),
        ),
        handler(image_replicate),
    )?;
    registry.register(
        ToolDefinition::new(
            "linode_image_upload_create",
            "Create an image record and return a URL to upload the image file to",
            upload_schema(),
        ),
        handler(image_upload_create),
    )?;
    Ok(())
}

fn image_id_schema(description: &str) -> InputSchema {
    InputSchema::object().required("image_id", PropertySpec::string(description))
}

fn create_schema() -> InputSchema {
    InputSchema::object()
        .required("disk_id", PropertySpec::number("ID of the disk to image"))
        .optional("label", PropertySpec::string("Label for the image"))
        .optional("description", PropertySpec::string("Description of the image"))
        .optional("tags", PropertySpec::string_array("Tags to apply"))
}

fn update_schema() -> InputSchema {
    InputSchema::object()
        .required("image_id", PropertySpec::string("ID of the image to update"))
        .optional("label", PropertySpec::string("New label"))
        .optional("description", PropertySpec::string("New description"))
        .optional("tags", PropertySpec::string_array("Replacement tags"))
}

fn replicate_schema() -> InputSchema {
    InputSchema::object()
        .required("image_id", PropertySpec::string("ID of the image to replicate"))
        .required(
            "regions",
            PropertySpec::string_array("Regions the image should be available in"),
        )
}

fn upload_schema() -> InputSchema {
    InputSchema::object()
        .required("label", PropertySpec::string("Label for the image"))
        .required("region", PropertySpec::string("Region to upload to"))
        .optional("description", PropertySpec::string("Description of the image"))
        .optional("tags", PropertySpec::string_array("Tags to apply"))
}

fn summary(image: &Image) -> String {
    Details::new(&format!("{} (ID: {})", image.label, image.id))
        .field("Type", &image.image_type)
        .field("Status", &image.status)
        .field("Public", yes_no(image.is_public))
        .field("Size", format!("{} MB", image.size))
        .field_opt("Vendor", image.vendor.as_deref())
        .finish()
}

fn details(title: &str, image: &Image) -> Details {
    let regions: Vec<String> = image
        .regions
        .iter()
        .map(|r| format!("{} ({})", r.region, r.status))
        .collect();

    Details::new(title)
        .field("ID", &image.id)
        .field("Label", &image.label)
        .field("Description", or_none(image.description.as_deref()))
        .field("Type", &image.image_type)
        .field("Status", &image.status)
        .field("Public", yes_no(image.is_public))
        .field("Deprecated", yes_no(image.deprecated))
        .field("Size", format!("{} MB", image.size))
        .field_opt("Total Size", image.total_size.map(|s| format!("{s} MB")))
        .field_opt("Vendor", image.vendor.as_deref())
        .field_opt("Created By", image.created_by.as_deref())
        .field_opt("Created", image.created.as_deref())
        .field_opt("Expiry", image.expiry.as_deref())
        .list("Regions", &regions)
        .list("Tags", &image.tags)
}

async fn images_list(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let is_public = optional_bool(&args, "is_public")?;
    let mut images = account
        .client()
        .list_images()
        .await
        .map_err(ctx.provider_err("list images"))?;

    if let Some(public) = is_public {
        images.retain(|image| image.is_public == public);
    }

    ctx.metrics()
        .update_resource_count("images", account.name(), images.len());
    Ok(list_result("images", &images, summary))
}

async fn image_get(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_identifier(&args, "image_id")?;
    let image = account
        .client()
        .get_image(&id)
        .await
        .map_err(ctx.provider_err("get image"))?;

    Ok(details("Image Details", &image).into_result())
}

async fn image_create(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &create_schema())?;

    let request = CreateImageRequest {
        disk_id: fields.required_number("disk_id"),
        label: fields.string("label").map(str::to_string),
        description: fields.string("description").map(str::to_string),
        tags: fields.strings("tags"),
    };

    let image = account
        .client()
        .create_image(&request)
        .await
        .map_err(ctx.provider_err("create image"))?;

    Ok(Details::new("Image created successfully")
        .field("ID", &image.id)
        .field("Label", &image.label)
        .field("Status", &image.status)
        .into_result())
}

async fn image_update(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &update_schema())?;
    let id = fields.required_string("image_id");
    check_identifier("image_id", &id)?;

    let request = UpdateImageRequest {
        label: fields.string("label").map(str::to_string),
        description: fields.string("description").map(str::to_string),
        tags: fields.strings_if_present("tags"),
    };

    let image = account
        .client()
        .update_image(&id, &request)
        .await
        .map_err(ctx.provider_err("update image"))?;

    Ok(details("Image updated successfully", &image).into_result())
}

async fn image_delete(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let id = require_identifier(&args, "image_id")?;
    account
        .client()
        .delete_image(&id)
        .await
        .map_err(ctx.provider_err("delete image"))?;

    Ok(CallToolResult::text(format!("Image {id} deleted successfully.")))
}

async fn image_replicate(ctx: ToolContext, args: Arguments) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &replicate_schema())?;
    let id = fields.required_string("image_id");
    check_identifier("image_id", &id)?;

    let request = ReplicateImageRequest {
        regions: fields.strings("regions"),
    };

    let image = account
        .client()
        .replicate_image(&id, &request)
        .await
        .map_err(ctx.provider_err("replicate image"))?;

    let regions: Vec<String> = image
        .regions
        .iter()
        .map(|r| format!("{} ({})", r.region, r.status))
        .collect();
    Ok(Details::new("Image replication started successfully")
        .field("ID", &image.id)
        .field("Label", &image.label)
        .list("Regions", &regions)
        .into_result())
}

async fn image_upload_create(
    ctx: ToolContext,
    args: Arguments,
) -> Result<CallToolResult, ToolError> {
    let account = ctx.account()?;
    let fields = parse_struct(&args, &upload_schema())?;

    let request = UploadImageRequest {
        label: fields.required_string("label"),
        region: fields.required_string("region"),
        description: fields.string("description").map(str::to_string),
        tags: fields.strings("tags"),
    };

    let upload = account
        .client()
        .create_image_upload(&request)
        .await
        .map_err(ctx.provider_err("create image upload"))?;

    Ok(Details::new("Image upload created successfully")
        .field("ID", &upload.image.id)
        .field("Label", &upload.image.label)
        .field("Status", &upload.image.status)
        .field("Upload URL", &upload.upload_to)
        .line("")
        .line("Upload the image file with an HTTP PUT to the URL above.")
        .into_result())
}
