//! Tools de notificaciones.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use wiki_core::Table;
use wiki_domain::NewNotification;

use super::{audit_mutation, parse_payload};
use crate::context::ToolContext;
use crate::definition::{ToolDefinition, ToolHandler};
use crate::error::ToolError;
use crate::notify;

pub fn all() -> Vec<Box<dyn ToolHandler>> {
    vec![Box::new(SendNotification), Box::new(ListNotifications), Box::new(MarkNotificationRead)]
}

pub struct SendNotification;

#[derive(Deserialize)]
struct SendNotificationInput {
    actor_user_id: String,
    #[serde(flatten)]
    notification: NewNotification,
}

#[async_trait]
impl ToolHandler for SendNotification {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("send_notification",
                            "Deliver a notification record to a user inbox.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "recipient_user_id": { "type": "string" },
                                    "subject": { "type": "string" },
                                    "body": { "type": "string" },
                                    "kind": { "type": "string" }
                                },
                                "required": ["actor_user_id", "recipient_user_id", "subject"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: SendNotificationInput = parse_payload(payload)?;
        input.notification.validate()?;

        let mut store = ctx.store.write().await;
        let record = notify::push(&mut store,
                                  &input.notification.recipient_user_id,
                                  &input.notification.subject,
                                  &input.notification.body,
                                  &input.notification.kind)?;
        let id = record.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        audit_mutation(&mut store, ctx, &input.actor_user_id, "send_notification", "notification", &id,
                       json!({ "recipient_user_id": record.get("recipient_user_id") }))?;
        Ok(Value::Object(record))
    }
}

pub struct ListNotifications;

#[derive(Deserialize)]
struct ListNotificationsInput {
    recipient_user_id: String,
    #[serde(default)]
    unread_only: bool,
}

#[async_trait]
impl ToolHandler for ListNotifications {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("list_notifications",
                            "Inbox of a user in delivery order, optionally unread only.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "recipient_user_id": { "type": "string" },
                                    "unread_only": { "type": "boolean" }
                                },
                                "required": ["recipient_user_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: ListNotificationsInput = parse_payload(payload)?;
        let mut filters = serde_json::Map::new();
        filters.insert("recipient_user_id".into(), json!(input.recipient_user_id));
        if input.unread_only {
            filters.insert("read".into(), json!(false));
        }
        let store = ctx.store.read().await;
        let notifications = store.filter_records(Table::Notifications, &filters);
        Ok(json!({ "count": notifications.len(), "notifications": notifications }))
    }
}

pub struct MarkNotificationRead;

#[derive(Deserialize)]
struct MarkNotificationReadInput {
    actor_user_id: String,
    notification_id: String,
}

#[async_trait]
impl ToolHandler for MarkNotificationRead {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("mark_notification_read",
                            "Flag a notification as read.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "notification_id": { "type": "string" }
                                },
                                "required": ["actor_user_id", "notification_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: MarkNotificationReadInput = parse_payload(payload)?;
        let mut store = ctx.store.write().await;
        let mut patch = serde_json::Map::new();
        patch.insert("read".into(), json!(true));
        patch.insert("read_at".into(), json!(store.timestamp_string()));
        let updated = store.update(Table::Notifications, &input.notification_id, patch)?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "mark_notification_read", "notification",
                       &input.notification_id, json!({}))?;
        Ok(Value::Object(updated))
    }
}
