//! Tools de páginas.
//!
//! `content_hash` se calcula sobre `{title, body}` en forma canónica; cada
//! edición de contenido lo recalcula y sube `version`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use wiki_core::hashing::hash_value;
use wiki_core::{CoreError, Table};
use wiki_domain::{NewPage, PageStatus};

use super::{audit_mutation, parse_payload, record_or_null, to_record};
use crate::context::ToolContext;
use crate::definition::{ToolDefinition, ToolHandler};
use crate::error::ToolError;

pub fn all() -> Vec<Box<dyn ToolHandler>> {
    vec![Box::new(CreatePage), Box::new(GetPage), Box::new(UpdatePage), Box::new(DeletePage), Box::new(ListPages)]
}

fn content_hash(title: &str, body: &str) -> String {
    hash_value(&json!({ "title": title, "body": body }))
}

// ---------------------------------------------------------------- create

pub struct CreatePage;

#[derive(Deserialize)]
struct CreatePageInput {
    actor_user_id: String,
    #[serde(flatten)]
    page: NewPage,
}

#[async_trait]
impl ToolHandler for CreatePage {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("create_page",
                            "Create a page inside a space. Returns the stored page record.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "space_id": { "type": "string" },
                                    "title": { "type": "string" },
                                    "body": { "type": "string" },
                                    "status": { "enum": ["draft", "published", "archived"] }
                                },
                                "required": ["actor_user_id", "space_id", "title"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: CreatePageInput = parse_payload(payload)?;
        input.page.validate()?;

        let mut store = ctx.store.write().await;
        if store.get(Table::Spaces, &input.page.space_id).is_none() {
            return Err(CoreError::NotFound { table: Table::Spaces.as_str().to_string(),
                                             id: input.page.space_id.clone() }.into());
        }

        let id = store.next_id(Table::Pages);
        let now = store.timestamp_string();
        let record = to_record(json!({
            "id": id,
            "space_id": input.page.space_id,
            "title": input.page.title,
            "body": input.page.body,
            "status": input.page.status.as_str(),
            "version": 1,
            "content_hash": content_hash(&input.page.title, &input.page.body),
            "created_by_user_id": input.actor_user_id,
            "created_at": now,
            "updated_at": now,
        }));
        store.create(Table::Pages, &id, record.clone())?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "create_page", "page", &id,
                       json!({ "space_id": record.get("space_id"), "title": record.get("title") }))?;
        Ok(Value::Object(record))
    }
}

// ---------------------------------------------------------------- get

pub struct GetPage;

#[derive(Deserialize)]
struct GetPageInput {
    page_id: String,
}

#[async_trait]
impl ToolHandler for GetPage {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_page",
                            "Fetch a page by id. Returns null when the page does not exist.",
                            json!({
                                "type": "object",
                                "properties": { "page_id": { "type": "string" } },
                                "required": ["page_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: GetPageInput = parse_payload(payload)?;
        let store = ctx.store.read().await;
        Ok(record_or_null(store.get(Table::Pages, &input.page_id)))
    }
}

// ---------------------------------------------------------------- update

pub struct UpdatePage;

#[derive(Deserialize)]
struct UpdatePageInput {
    actor_user_id: String,
    page_id: String,
    title: Option<String>,
    body: Option<String>,
    status: Option<PageStatus>,
}

#[async_trait]
impl ToolHandler for UpdatePage {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("update_page",
                            "Patch title/body/status of a page. Content edits bump the version and rehash the content.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "page_id": { "type": "string" },
                                    "title": { "type": "string" },
                                    "body": { "type": "string" },
                                    "status": { "enum": ["draft", "published", "archived"] }
                                },
                                "required": ["actor_user_id", "page_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: UpdatePageInput = parse_payload(payload)?;
        let mut store = ctx.store.write().await;
        let current = store.get(Table::Pages, &input.page_id)
                           .ok_or_else(|| CoreError::NotFound { table: Table::Pages.as_str().to_string(),
                                                                id: input.page_id.clone() })?;

        let mut patch = serde_json::Map::new();
        if let Some(status) = input.status {
            let current_status = current.get("status")
                                        .and_then(Value::as_str)
                                        .map(PageStatus::parse)
                                        .transpose()?
                                        .unwrap_or_default();
            if !current_status.can_transition(status) {
                return Err(CoreError::InvalidState(format!("transición de página inválida: {} -> {}",
                                                           current_status.as_str(),
                                                           status.as_str())).into());
            }
            patch.insert("status".into(), json!(status.as_str()));
        }

        let content_changed = input.title.is_some() || input.body.is_some();
        let title = input.title
                         .unwrap_or_else(|| current.get("title").and_then(Value::as_str).unwrap_or_default().to_string());
        let body = input.body
                        .unwrap_or_else(|| current.get("body").and_then(Value::as_str).unwrap_or_default().to_string());
        if title.trim().is_empty() {
            return Err(ToolError::Payload("campo requerido vacío: title".into()));
        }
        if content_changed {
            let version = current.get("version").and_then(Value::as_u64).unwrap_or(1);
            patch.insert("title".into(), json!(title));
            patch.insert("body".into(), json!(body));
            patch.insert("version".into(), json!(version + 1));
            patch.insert("content_hash".into(), json!(content_hash(&title, &body)));
        }
        patch.insert("updated_at".into(), json!(store.timestamp_string()));

        let updated = store.update(Table::Pages, &input.page_id, patch)?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "update_page", "page", &input.page_id,
                       json!({ "version": updated.get("version"), "status": updated.get("status") }))?;
        Ok(Value::Object(updated))
    }
}

// ---------------------------------------------------------------- delete

pub struct DeletePage;

#[derive(Deserialize)]
struct DeletePageInput {
    actor_user_id: String,
    page_id: String,
}

#[async_trait]
impl ToolHandler for DeletePage {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("delete_page",
                            "Permanently delete a page. The id is never reused.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "page_id": { "type": "string" }
                                },
                                "required": ["actor_user_id", "page_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: DeletePageInput = parse_payload(payload)?;
        let mut store = ctx.store.write().await;
        store.delete(Table::Pages, &input.page_id)?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "delete_page", "page", &input.page_id, json!({}))?;
        Ok(json!({ "deleted": true, "page_id": input.page_id }))
    }
}

// ---------------------------------------------------------------- list

pub struct ListPages;

#[derive(Deserialize)]
struct ListPagesInput {
    space_id: Option<String>,
    status: Option<PageStatus>,
}

#[async_trait]
impl ToolHandler for ListPages {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("list_pages",
                            "List pages, optionally filtered by space and/or status, in insertion order.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "space_id": { "type": "string" },
                                    "status": { "enum": ["draft", "published", "archived"] }
                                }
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: ListPagesInput = parse_payload(payload)?;
        let mut filters = serde_json::Map::new();
        if let Some(space_id) = input.space_id {
            filters.insert("space_id".into(), json!(space_id));
        }
        if let Some(status) = input.status {
            filters.insert("status".into(), json!(status.as_str()));
        }
        let store = ctx.store.read().await;
        let pages = store.filter_records(Table::Pages, &filters);
        Ok(json!({ "count": pages.len(), "pages": pages }))
    }
}
