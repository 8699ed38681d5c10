//! Tools de espacios.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use wiki_core::{CoreError, Table};
use wiki_domain::NewSpace;

use super::{audit_mutation, parse_payload, record_or_null, to_record};
use crate::context::ToolContext;
use crate::definition::{ToolDefinition, ToolHandler};
use crate::error::ToolError;

pub fn all() -> Vec<Box<dyn ToolHandler>> {
    vec![Box::new(CreateSpace), Box::new(GetSpace), Box::new(UpdateSpace), Box::new(DeleteSpace), Box::new(ListSpaces)]
}

pub struct CreateSpace;

#[derive(Deserialize)]
struct CreateSpaceInput {
    actor_user_id: String,
    #[serde(flatten)]
    space: NewSpace,
}

#[async_trait]
impl ToolHandler for CreateSpace {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("create_space",
                            "Create a space. The key is normalized to uppercase and must be unique.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "key": { "type": "string" },
                                    "name": { "type": "string" },
                                    "description": { "type": "string" },
                                    "owner_user_id": { "type": "string" }
                                },
                                "required": ["actor_user_id", "key", "name"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: CreateSpaceInput = parse_payload(payload)?;
        input.space.validate()?;
        let key = input.space.normalized_key();

        let mut store = ctx.store.write().await;
        if store.find_by_field(Table::Spaces, "key", &json!(key)).is_some() {
            return Err(CoreError::DuplicateKey { table: Table::Spaces.as_str().to_string(),
                                                 id: key }.into());
        }
        let id = store.next_id(Table::Spaces);
        let now = store.timestamp_string();
        let record = to_record(json!({
            "id": id,
            "key": key,
            "name": input.space.name,
            "description": input.space.description,
            "owner_user_id": input.space.owner_user_id,
            "created_at": now,
            "updated_at": now,
        }));
        store.create(Table::Spaces, &id, record.clone())?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "create_space", "space", &id,
                       json!({ "key": record.get("key") }))?;
        Ok(Value::Object(record))
    }
}

pub struct GetSpace;

#[derive(Deserialize)]
struct GetSpaceInput {
    space_id: String,
}

#[async_trait]
impl ToolHandler for GetSpace {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_space",
                            "Fetch a space by id. Returns null when missing.",
                            json!({
                                "type": "object",
                                "properties": { "space_id": { "type": "string" } },
                                "required": ["space_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: GetSpaceInput = parse_payload(payload)?;
        let store = ctx.store.read().await;
        Ok(record_or_null(store.get(Table::Spaces, &input.space_id)))
    }
}

pub struct UpdateSpace;

#[derive(Deserialize)]
struct UpdateSpaceInput {
    actor_user_id: String,
    space_id: String,
    name: Option<String>,
    description: Option<String>,
    owner_user_id: Option<String>,
}

#[async_trait]
impl ToolHandler for UpdateSpace {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("update_space",
                            "Patch name/description/owner of a space. The key is immutable.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "space_id": { "type": "string" },
                                    "name": { "type": "string" },
                                    "description": { "type": "string" },
                                    "owner_user_id": { "type": "string" }
                                },
                                "required": ["actor_user_id", "space_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: UpdateSpaceInput = parse_payload(payload)?;
        let mut patch = serde_json::Map::new();
        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ToolError::Payload("campo requerido vacío: name".into()));
            }
            patch.insert("name".into(), json!(name));
        }
        if let Some(description) = input.description {
            patch.insert("description".into(), json!(description));
        }
        if let Some(owner) = input.owner_user_id {
            patch.insert("owner_user_id".into(), json!(owner));
        }

        let mut store = ctx.store.write().await;
        patch.insert("updated_at".into(), json!(store.timestamp_string()));
        let updated = store.update(Table::Spaces, &input.space_id, patch)?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "update_space", "space", &input.space_id, json!({}))?;
        Ok(Value::Object(updated))
    }
}

pub struct DeleteSpace;

#[derive(Deserialize)]
struct DeleteSpaceInput {
    actor_user_id: String,
    space_id: String,
}

#[async_trait]
impl ToolHandler for DeleteSpace {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("delete_space",
                            "Delete an empty space. Fails while pages still live in it.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "space_id": { "type": "string" }
                                },
                                "required": ["actor_user_id", "space_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: DeleteSpaceInput = parse_payload(payload)?;
        let mut store = ctx.store.write().await;
        if !store.find_all_by_field(Table::Pages, "space_id", &json!(input.space_id)).is_empty() {
            return Err(CoreError::InvalidState(format!("el espacio {} todavía contiene páginas", input.space_id)).into());
        }
        store.delete(Table::Spaces, &input.space_id)?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "delete_space", "space", &input.space_id, json!({}))?;
        Ok(json!({ "deleted": true, "space_id": input.space_id }))
    }
}

pub struct ListSpaces;

#[async_trait]
impl ToolHandler for ListSpaces {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("list_spaces",
                            "List every space in insertion order.",
                            json!({ "type": "object", "properties": {} }))
    }

    async fn execute(&self, ctx: &ToolContext, _payload: Value) -> Result<Value, ToolError> {
        let store = ctx.store.read().await;
        let spaces = store.all_records(Table::Spaces);
        Ok(json!({ "count": spaces.len(), "spaces": spaces }))
    }
}
