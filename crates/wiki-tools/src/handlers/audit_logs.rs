//! Tool de reporte sobre el audit trail.
//!
//! Sólo lectura: `audit_logs` es append-only por contrato y el catálogo no
//! registra tools de update/delete sobre esa tabla.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use wiki_core::audit;

use super::parse_payload;
use crate::context::ToolContext;
use crate::definition::{ToolDefinition, ToolHandler};
use crate::error::ToolError;

pub fn all() -> Vec<Box<dyn ToolHandler>> {
    vec![Box::new(ListAuditLogs)]
}

pub struct ListAuditLogs;

#[derive(Deserialize)]
struct ListAuditLogsInput {
    actor_user_id: Option<String>,
    action_type: Option<String>,
    target_entity_type: Option<String>,
    target_entity_id: Option<String>,
    limit: Option<usize>,
}

#[async_trait]
impl ToolHandler for ListAuditLogs {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("list_audit_logs",
                            "Audit entries in append order, filterable by actor/action/target, optionally the last N.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "action_type": { "type": "string" },
                                    "target_entity_type": { "type": "string" },
                                    "target_entity_id": { "type": "string" },
                                    "limit": { "type": "integer", "minimum": 1 }
                                }
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: ListAuditLogsInput = parse_payload(payload)?;
        let mut filters = serde_json::Map::new();
        for (field, value) in [("actor_user_id", input.actor_user_id),
                               ("action_type", input.action_type),
                               ("target_entity_type", input.target_entity_type),
                               ("target_entity_id", input.target_entity_id)]
        {
            if let Some(v) = value {
                filters.insert(field.into(), json!(v));
            }
        }

        let store = ctx.store.read().await;
        let entries = if filters.is_empty() {
            match input.limit {
                Some(limit) => audit::recent(&store, limit),
                None => audit::filtered(&store, &filters),
            }
        } else {
            let mut rows = audit::filtered(&store, &filters);
            if let Some(limit) = input.limit {
                let skip = rows.len().saturating_sub(limit);
                rows = rows.split_off(skip);
            }
            rows
        };
        Ok(json!({ "count": entries.len(), "entries": entries }))
    }
}
