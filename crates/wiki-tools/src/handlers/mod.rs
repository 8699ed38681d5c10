//! Handlers del catálogo, agrupados por entidad.

pub mod approvals;
pub mod attachments;
pub mod audit_logs;
pub mod groups;
pub mod notifications;
pub mod pages;
pub mod permissions;
pub mod records;
pub mod spaces;
pub mod users;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use wiki_core::{audit, Record, RecordStore};

use crate::context::ToolContext;
use crate::definition::ToolHandler;
use crate::error::ToolError;

/// Catálogo completo incorporado.
pub fn builtin() -> Vec<Box<dyn ToolHandler>> {
    let mut tools: Vec<Box<dyn ToolHandler>> = Vec::new();
    tools.extend(pages::all());
    tools.extend(spaces::all());
    tools.extend(users::all());
    tools.extend(groups::all());
    tools.extend(permissions::all());
    tools.extend(attachments::all());
    tools.extend(notifications::all());
    tools.extend(approvals::all());
    tools.extend(audit_logs::all());
    tools.extend(records::all());
    tools
}

/// Deserializa el payload crudo al input tipado del tool.
pub(crate) fn parse_payload<T: DeserializeOwned>(payload: Value) -> Result<T, ToolError> {
    serde_json::from_value(payload).map_err(|e| ToolError::Payload(format!("payload inválido: {e}")))
}

/// Convierte un objeto `json!` en `Record`. Sólo para valores construidos
/// aquí mismo como objetos.
pub(crate) fn to_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// Empareja una mutación con su entrada de audit, anotando el
/// `invocation_id` de la llamada en `details`.
pub(crate) fn audit_mutation(store: &mut RecordStore,
                             ctx: &ToolContext,
                             actor_user_id: &str,
                             action_type: &str,
                             target_entity_type: &str,
                             target_entity_id: &str,
                             mut details: Value)
                             -> Result<(), ToolError> {
    if let Value::Object(map) = &mut details {
        map.insert("invocation_id".to_string(), json!(ctx.invocation_id.to_string()));
    }
    audit::append(store,
                  audit::AuditEntry { actor_user_id: actor_user_id.to_string(),
                                      action_type: action_type.to_string(),
                                      target_entity_type: target_entity_type.to_string(),
                                      target_entity_id: target_entity_id.to_string(),
                                      details })?;
    Ok(())
}

/// Respuesta estándar de los tools de lectura puntual: el registro o `null`
/// (la ausencia no es un error; el llamador la interpreta).
pub(crate) fn record_or_null(record: Option<Record>) -> Value {
    match record {
        Some(r) => Value::Object(r),
        None => Value::Null,
    }
}
