//! Tools de usuarios.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use wiki_core::{CoreError, Table};
use wiki_domain::user::validate_email;
use wiki_domain::NewUser;

use super::{audit_mutation, parse_payload, record_or_null, to_record};
use crate::context::ToolContext;
use crate::definition::{ToolDefinition, ToolHandler};
use crate::error::ToolError;

pub fn all() -> Vec<Box<dyn ToolHandler>> {
    vec![Box::new(CreateUser),
         Box::new(GetUser),
         Box::new(FindUserByEmail),
         Box::new(UpdateUser),
         Box::new(ListUsers)]
}

pub struct CreateUser;

#[derive(Deserialize)]
struct CreateUserInput {
    actor_user_id: String,
    #[serde(flatten)]
    user: NewUser,
}

#[async_trait]
impl ToolHandler for CreateUser {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("create_user",
                            "Create a user. Username and email must be unique.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "username": { "type": "string" },
                                    "email": { "type": "string" },
                                    "display_name": { "type": "string" },
                                    "active": { "type": "boolean" }
                                },
                                "required": ["actor_user_id", "username", "email"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: CreateUserInput = parse_payload(payload)?;
        input.user.validate()?;

        let mut store = ctx.store.write().await;
        for (field, value) in [("username", &input.user.username), ("email", &input.user.email)] {
            if store.find_by_field(Table::Users, field, &json!(value)).is_some() {
                return Err(CoreError::DuplicateKey { table: Table::Users.as_str().to_string(),
                                                     id: value.clone() }.into());
            }
        }
        let id = store.next_id(Table::Users);
        let now = store.timestamp_string();
        let record = to_record(json!({
            "id": id,
            "username": input.user.username,
            "email": input.user.email,
            "display_name": input.user.display_name,
            "active": input.user.active,
            "created_at": now,
            "updated_at": now,
        }));
        store.create(Table::Users, &id, record.clone())?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "create_user", "user", &id,
                       json!({ "username": record.get("username") }))?;
        Ok(Value::Object(record))
    }
}

pub struct GetUser;

#[derive(Deserialize)]
struct GetUserInput {
    user_id: String,
}

#[async_trait]
impl ToolHandler for GetUser {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_user",
                            "Fetch a user by id. Returns null when missing.",
                            json!({
                                "type": "object",
                                "properties": { "user_id": { "type": "string" } },
                                "required": ["user_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: GetUserInput = parse_payload(payload)?;
        let store = ctx.store.read().await;
        Ok(record_or_null(store.get(Table::Users, &input.user_id)))
    }
}

pub struct FindUserByEmail;

#[derive(Deserialize)]
struct FindUserByEmailInput {
    email: String,
}

#[async_trait]
impl ToolHandler for FindUserByEmail {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("find_user_by_email",
                            "First user whose email matches exactly, or null.",
                            json!({
                                "type": "object",
                                "properties": { "email": { "type": "string" } },
                                "required": ["email"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: FindUserByEmailInput = parse_payload(payload)?;
        let store = ctx.store.read().await;
        Ok(record_or_null(store.find_by_field(Table::Users, "email", &json!(input.email))))
    }
}

pub struct UpdateUser;

#[derive(Deserialize)]
struct UpdateUserInput {
    actor_user_id: String,
    user_id: String,
    email: Option<String>,
    display_name: Option<String>,
    active: Option<bool>,
}

#[async_trait]
impl ToolHandler for UpdateUser {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("update_user",
                            "Patch email/display_name/active of a user. The username is immutable.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "user_id": { "type": "string" },
                                    "email": { "type": "string" },
                                    "display_name": { "type": "string" },
                                    "active": { "type": "boolean" }
                                },
                                "required": ["actor_user_id", "user_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: UpdateUserInput = parse_payload(payload)?;
        let mut patch = serde_json::Map::new();
        if let Some(email) = input.email {
            validate_email(&email)?;
            patch.insert("email".into(), json!(email));
        }
        if let Some(display_name) = input.display_name {
            patch.insert("display_name".into(), json!(display_name));
        }
        if let Some(active) = input.active {
            patch.insert("active".into(), json!(active));
        }

        let mut store = ctx.store.write().await;
        patch.insert("updated_at".into(), json!(store.timestamp_string()));
        let updated = store.update(Table::Users, &input.user_id, patch)?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "update_user", "user", &input.user_id, json!({}))?;
        Ok(Value::Object(updated))
    }
}

pub struct ListUsers;

#[derive(Deserialize)]
struct ListUsersInput {
    active: Option<bool>,
}

#[async_trait]
impl ToolHandler for ListUsers {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("list_users",
                            "List users in insertion order, optionally filtered by active flag.",
                            json!({
                                "type": "object",
                                "properties": { "active": { "type": "boolean" } }
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: ListUsersInput = parse_payload(payload)?;
        let mut filters = serde_json::Map::new();
        if let Some(active) = input.active {
            filters.insert("active".into(), json!(active));
        }
        let store = ctx.store.read().await;
        let users = store.filter_records(Table::Users, &filters);
        Ok(json!({ "count": users.len(), "users": users }))
    }
}
