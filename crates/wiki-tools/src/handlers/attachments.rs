//! Tools de adjuntos.
//!
//! El registro guarda metadatos + digest SHA-256 del contenido; los bytes no
//! se almacenan en la simulación.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use wiki_core::{CoreError, Table};
use wiki_domain::NewAttachment;

use super::{audit_mutation, parse_payload, record_or_null, to_record};
use crate::context::ToolContext;
use crate::definition::{ToolDefinition, ToolHandler};
use crate::error::ToolError;

pub fn all() -> Vec<Box<dyn ToolHandler>> {
    vec![Box::new(UploadAttachment), Box::new(GetAttachment), Box::new(ListAttachments), Box::new(DeleteAttachment)]
}

pub struct UploadAttachment;

#[derive(Deserialize)]
struct UploadAttachmentInput {
    actor_user_id: String,
    #[serde(flatten)]
    attachment: NewAttachment,
}

#[async_trait]
impl ToolHandler for UploadAttachment {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("upload_attachment",
                            "Attach content to a page. Stores metadata plus a SHA-256 digest, not the bytes.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "page_id": { "type": "string" },
                                    "filename": { "type": "string" },
                                    "media_type": { "type": "string" },
                                    "content": { "type": "string" }
                                },
                                "required": ["actor_user_id", "page_id", "filename", "content"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: UploadAttachmentInput = parse_payload(payload)?;
        input.attachment.validate()?;

        let mut store = ctx.store.write().await;
        if store.get(Table::Pages, &input.attachment.page_id).is_none() {
            return Err(CoreError::NotFound { table: Table::Pages.as_str().to_string(),
                                             id: input.attachment.page_id.clone() }.into());
        }

        let id = store.next_id(Table::Attachments);
        let record = to_record(json!({
            "id": id,
            "page_id": input.attachment.page_id,
            "filename": input.attachment.filename,
            "media_type": input.attachment.media_type,
            "size_bytes": input.attachment.size_bytes(),
            "content_sha256": input.attachment.content_sha256(),
            "uploaded_by_user_id": input.actor_user_id,
            "created_at": store.timestamp_string(),
        }));
        store.create(Table::Attachments, &id, record.clone())?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "upload_attachment", "page",
                       &input.attachment.page_id,
                       json!({ "filename": record.get("filename"), "size_bytes": record.get("size_bytes") }))?;
        Ok(Value::Object(record))
    }
}

pub struct GetAttachment;

#[derive(Deserialize)]
struct GetAttachmentInput {
    attachment_id: String,
}

#[async_trait]
impl ToolHandler for GetAttachment {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_attachment",
                            "Fetch attachment metadata by id. Returns null when missing.",
                            json!({
                                "type": "object",
                                "properties": { "attachment_id": { "type": "string" } },
                                "required": ["attachment_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: GetAttachmentInput = parse_payload(payload)?;
        let store = ctx.store.read().await;
        Ok(record_or_null(store.get(Table::Attachments, &input.attachment_id)))
    }
}

pub struct ListAttachments;

#[derive(Deserialize)]
struct ListAttachmentsInput {
    page_id: String,
}

#[async_trait]
impl ToolHandler for ListAttachments {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("list_attachments",
                            "Attachments of a page in upload order.",
                            json!({
                                "type": "object",
                                "properties": { "page_id": { "type": "string" } },
                                "required": ["page_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: ListAttachmentsInput = parse_payload(payload)?;
        let store = ctx.store.read().await;
        let attachments = store.find_all_by_field(Table::Attachments, "page_id", &json!(input.page_id));
        Ok(json!({ "count": attachments.len(), "attachments": attachments }))
    }
}

pub struct DeleteAttachment;

#[derive(Deserialize)]
struct DeleteAttachmentInput {
    actor_user_id: String,
    attachment_id: String,
}

#[async_trait]
impl ToolHandler for DeleteAttachment {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("delete_attachment",
                            "Permanently delete an attachment record.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "attachment_id": { "type": "string" }
                                },
                                "required": ["actor_user_id", "attachment_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: DeleteAttachmentInput = parse_payload(payload)?;
        let mut store = ctx.store.write().await;
        store.delete(Table::Attachments, &input.attachment_id)?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "delete_attachment", "attachment",
                       &input.attachment_id, json!({}))?;
        Ok(json!({ "deleted": true, "attachment_id": input.attachment_id }))
    }
}
