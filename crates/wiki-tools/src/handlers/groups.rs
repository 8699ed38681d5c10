//! Tools de grupos y membresías.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use wiki_core::{CoreError, Table};
use wiki_domain::{NewGroup, NewGroupMember};

use super::{audit_mutation, parse_payload, to_record};
use crate::context::ToolContext;
use crate::definition::{ToolDefinition, ToolHandler};
use crate::error::ToolError;

pub fn all() -> Vec<Box<dyn ToolHandler>> {
    vec![Box::new(CreateGroup), Box::new(AddGroupMember), Box::new(RemoveGroupMember), Box::new(ListGroupMembers)]
}

pub struct CreateGroup;

#[derive(Deserialize)]
struct CreateGroupInput {
    actor_user_id: String,
    #[serde(flatten)]
    group: NewGroup,
}

#[async_trait]
impl ToolHandler for CreateGroup {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("create_group",
                            "Create a named group of users.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "name": { "type": "string" },
                                    "description": { "type": "string" }
                                },
                                "required": ["actor_user_id", "name"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: CreateGroupInput = parse_payload(payload)?;
        input.group.validate()?;

        let mut store = ctx.store.write().await;
        if store.find_by_field(Table::Groups, "name", &json!(input.group.name)).is_some() {
            return Err(CoreError::DuplicateKey { table: Table::Groups.as_str().to_string(),
                                                 id: input.group.name.clone() }.into());
        }
        let id = store.next_id(Table::Groups);
        let now = store.timestamp_string();
        let record = to_record(json!({
            "id": id,
            "name": input.group.name,
            "description": input.group.description,
            "created_at": now,
        }));
        store.create(Table::Groups, &id, record.clone())?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "create_group", "group", &id,
                       json!({ "name": record.get("name") }))?;
        Ok(Value::Object(record))
    }
}

pub struct AddGroupMember;

#[derive(Deserialize)]
struct AddGroupMemberInput {
    actor_user_id: String,
    #[serde(flatten)]
    member: NewGroupMember,
}

#[async_trait]
impl ToolHandler for AddGroupMember {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("add_group_member",
                            "Add a user to a group. Both must already exist.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "group_id": { "type": "string" },
                                    "user_id": { "type": "string" }
                                },
                                "required": ["actor_user_id", "group_id", "user_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: AddGroupMemberInput = parse_payload(payload)?;
        input.member.validate()?;

        let mut store = ctx.store.write().await;
        if store.get(Table::Groups, &input.member.group_id).is_none() {
            return Err(CoreError::NotFound { table: Table::Groups.as_str().to_string(),
                                             id: input.member.group_id.clone() }.into());
        }
        if store.get(Table::Users, &input.member.user_id).is_none() {
            return Err(CoreError::NotFound { table: Table::Users.as_str().to_string(),
                                             id: input.member.user_id.clone() }.into());
        }
        let already = store.find_all_by_field(Table::GroupMembers, "group_id", &json!(input.member.group_id))
                           .into_iter()
                           .any(|m| m.get("user_id") == Some(&json!(input.member.user_id)));
        if already {
            return Err(CoreError::DuplicateKey { table: Table::GroupMembers.as_str().to_string(),
                                                 id: format!("{}/{}", input.member.group_id, input.member.user_id) }.into());
        }

        let id = store.next_id(Table::GroupMembers);
        let record = to_record(json!({
            "id": id,
            "group_id": input.member.group_id,
            "user_id": input.member.user_id,
            "created_at": store.timestamp_string(),
        }));
        store.create(Table::GroupMembers, &id, record.clone())?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "add_group_member", "group", &input.member.group_id,
                       json!({ "user_id": record.get("user_id") }))?;
        Ok(Value::Object(record))
    }
}

pub struct RemoveGroupMember;

#[derive(Deserialize)]
struct RemoveGroupMemberInput {
    actor_user_id: String,
    group_id: String,
    user_id: String,
}

#[async_trait]
impl ToolHandler for RemoveGroupMember {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("remove_group_member",
                            "Remove a user from a group.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "group_id": { "type": "string" },
                                    "user_id": { "type": "string" }
                                },
                                "required": ["actor_user_id", "group_id", "user_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: RemoveGroupMemberInput = parse_payload(payload)?;
        let mut store = ctx.store.write().await;
        let membership = store.find_all_by_field(Table::GroupMembers, "group_id", &json!(input.group_id))
                              .into_iter()
                              .find(|m| m.get("user_id") == Some(&json!(input.user_id)))
                              .ok_or_else(|| CoreError::NotFound { table: Table::GroupMembers.as_str().to_string(),
                                                                   id: format!("{}/{}", input.group_id, input.user_id) })?;
        let membership_id = membership.get("id")
                                      .and_then(Value::as_str)
                                      .ok_or_else(|| CoreError::Internal("membresía sin id".into()))?
                                      .to_string();
        store.delete(Table::GroupMembers, &membership_id)?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "remove_group_member", "group", &input.group_id,
                       json!({ "user_id": input.user_id }))?;
        Ok(json!({ "removed": true, "group_id": input.group_id, "user_id": input.user_id }))
    }
}

pub struct ListGroupMembers;

#[derive(Deserialize)]
struct ListGroupMembersInput {
    group_id: String,
}

#[async_trait]
impl ToolHandler for ListGroupMembers {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("list_group_members",
                            "Membership records of a group, in insertion order.",
                            json!({
                                "type": "object",
                                "properties": { "group_id": { "type": "string" } },
                                "required": ["group_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: ListGroupMembersInput = parse_payload(payload)?;
        let store = ctx.store.read().await;
        let members = store.find_all_by_field(Table::GroupMembers, "group_id", &json!(input.group_id));
        Ok(json!({ "count": members.len(), "members": members }))
    }
}
