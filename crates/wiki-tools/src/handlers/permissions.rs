//! Tools de permisos.
//!
//! El chequeo es por coincidencia exacta de (sujeto, objetivo, operación);
//! la simulación no implementa jerarquías ni herencia de permisos.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use wiki_core::{CoreError, Table};
use wiki_domain::{NewPermission, PermissionOp, SubjectKind};

use super::{audit_mutation, parse_payload, to_record};
use crate::context::ToolContext;
use crate::definition::{ToolDefinition, ToolHandler};
use crate::error::ToolError;

pub fn all() -> Vec<Box<dyn ToolHandler>> {
    vec![Box::new(GrantPermission), Box::new(RevokePermission), Box::new(CheckPermission)]
}

fn permission_fingerprint(p: &NewPermission) -> Value {
    json!({
        "subject_kind": p.subject_kind.as_str(),
        "subject_id": p.subject_id,
        "target_entity_type": p.target_entity_type,
        "target_entity_id": p.target_entity_id,
        "operation": p.operation.as_str(),
    })
}

pub struct GrantPermission;

#[derive(Deserialize)]
struct GrantPermissionInput {
    actor_user_id: String,
    #[serde(flatten)]
    permission: NewPermission,
}

#[async_trait]
impl ToolHandler for GrantPermission {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("grant_permission",
                            "Grant view/edit/admin on a target entity to a user or group.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "subject_kind": { "enum": ["user", "group"] },
                                    "subject_id": { "type": "string" },
                                    "target_entity_type": { "type": "string" },
                                    "target_entity_id": { "type": "string" },
                                    "operation": { "enum": ["view", "edit", "admin"] }
                                },
                                "required": ["actor_user_id", "subject_kind", "subject_id",
                                             "target_entity_type", "target_entity_id", "operation"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: GrantPermissionInput = parse_payload(payload)?;
        input.permission.validate()?;

        let wanted = permission_fingerprint(&input.permission);
        let mut store = ctx.store.write().await;
        let duplicate = store.all_records(Table::Permissions).into_iter().any(|existing| {
                            wanted.as_object()
                                  .map(|fields| fields.iter().all(|(k, v)| existing.get(k) == Some(v)))
                                  .unwrap_or(false)
                        });
        if duplicate {
            return Err(CoreError::DuplicateKey { table: Table::Permissions.as_str().to_string(),
                                                 id: format!("{}:{}", input.permission.subject_id,
                                                             input.permission.operation.as_str()) }.into());
        }

        let id = store.next_id(Table::Permissions);
        let record = to_record(json!({
            "id": id,
            "subject_kind": input.permission.subject_kind.as_str(),
            "subject_id": input.permission.subject_id,
            "target_entity_type": input.permission.target_entity_type,
            "target_entity_id": input.permission.target_entity_id,
            "operation": input.permission.operation.as_str(),
            "granted_by_user_id": input.actor_user_id,
            "created_at": store.timestamp_string(),
        }));
        store.create(Table::Permissions, &id, record.clone())?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "grant_permission",
                       &input.permission.target_entity_type, &input.permission.target_entity_id,
                       json!({ "operation": record.get("operation"), "subject_id": record.get("subject_id") }))?;
        Ok(Value::Object(record))
    }
}

pub struct RevokePermission;

#[derive(Deserialize)]
struct RevokePermissionInput {
    actor_user_id: String,
    permission_id: String,
}

#[async_trait]
impl ToolHandler for RevokePermission {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("revoke_permission",
                            "Permanently remove a granted permission by id.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "permission_id": { "type": "string" }
                                },
                                "required": ["actor_user_id", "permission_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: RevokePermissionInput = parse_payload(payload)?;
        let mut store = ctx.store.write().await;
        store.delete(Table::Permissions, &input.permission_id)?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "revoke_permission", "permission",
                       &input.permission_id, json!({}))?;
        Ok(json!({ "revoked": true, "permission_id": input.permission_id }))
    }
}

pub struct CheckPermission;

#[derive(Deserialize)]
struct CheckPermissionInput {
    subject_kind: SubjectKind,
    subject_id: String,
    target_entity_type: String,
    target_entity_id: String,
    operation: PermissionOp,
}

#[async_trait]
impl ToolHandler for CheckPermission {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("check_permission",
                            "Whether an exact (subject, target, operation) grant exists.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "subject_kind": { "enum": ["user", "group"] },
                                    "subject_id": { "type": "string" },
                                    "target_entity_type": { "type": "string" },
                                    "target_entity_id": { "type": "string" },
                                    "operation": { "enum": ["view", "edit", "admin"] }
                                },
                                "required": ["subject_kind", "subject_id", "target_entity_type",
                                             "target_entity_id", "operation"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: CheckPermissionInput = parse_payload(payload)?;
        let store = ctx.store.read().await;
        let allowed = store.all_records(Table::Permissions).into_iter().any(|p| {
                          p.get("subject_kind") == Some(&json!(input.subject_kind.as_str()))
                          && p.get("subject_id") == Some(&json!(input.subject_id))
                          && p.get("target_entity_type") == Some(&json!(input.target_entity_type))
                          && p.get("target_entity_id") == Some(&json!(input.target_entity_id))
                          && p.get("operation") == Some(&json!(input.operation.as_str()))
                      });
        Ok(json!({ "allowed": allowed }))
    }
}
