//! Escritor del audit trail.
//!
//! `audit_logs` es una tabla append-only por contrato: ningún tool registra
//! operaciones de update/delete sobre ella. El core no audita por sí mismo;
//! la capa de tools empareja cada mutación con un `append` aquí. El lado de
//! lectura alimenta los tools de reporte.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::CoreError;
use crate::store::{Record, RecordStore};
use crate::table::Table;

/// Una acción mutante a registrar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor_user_id: String,
    pub action_type: String,
    pub target_entity_type: String,
    pub target_entity_id: String,
    #[serde(default)]
    pub details: Value,
}

/// Apendea la entrada con `created_at` estampado y devuelve el registro.
pub fn append(store: &mut RecordStore, entry: AuditEntry) -> Result<Record, CoreError> {
    let id = store.next_id(Table::AuditLogs);
    let created_at = store.timestamp_string();
    let record = match json!({
        "id": id,
        "actor_user_id": entry.actor_user_id,
        "action_type": entry.action_type,
        "target_entity_type": entry.target_entity_type,
        "target_entity_id": entry.target_entity_id,
        "details": entry.details,
        "created_at": created_at,
    }) {
        Value::Object(map) => map,
        _ => Record::new(),
    };
    store.create(Table::AuditLogs, &id, record.clone())?;
    debug!("audit: {} {} {}/{}",
           record.get("actor_user_id").and_then(Value::as_str).unwrap_or("?"),
           record.get("action_type").and_then(Value::as_str).unwrap_or("?"),
           record.get("target_entity_type").and_then(Value::as_str).unwrap_or("?"),
           record.get("target_entity_id").and_then(Value::as_str).unwrap_or("?"));
    Ok(record)
}

/// Últimas `limit` entradas, más recientes al final (orden de inserción).
pub fn recent(store: &RecordStore, limit: usize) -> Vec<Record> {
    let all = store.all_records(Table::AuditLogs);
    let skip = all.len().saturating_sub(limit);
    all.into_iter().skip(skip).collect()
}

/// Listado filtrado (misma semántica permisiva que `filter_records`).
pub fn filtered(store: &RecordStore, filters: &Record) -> Vec<Record> {
    store.filter_records(Table::AuditLogs, filters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(actor: &str, action: &str) -> AuditEntry {
        AuditEntry { actor_user_id: actor.into(),
                     action_type: action.into(),
                     target_entity_type: "page".into(),
                     target_entity_id: "1".into(),
                     details: json!({"source": "test"}) }
    }

    #[test]
    fn append_estampa_created_at() {
        let mut store = RecordStore::new();
        let rec = append(&mut store, entry("ana", "create_page")).unwrap();
        let ts = rec.get("created_at").and_then(Value::as_str).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn recent_devuelve_la_cola() {
        let mut store = RecordStore::new();
        for i in 0..5 {
            append(&mut store, entry("ana", &format!("accion_{i}"))).unwrap();
        }
        let tail = recent(&store, 2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].get("action_type"), Some(&json!("accion_3")));
        assert_eq!(tail[1].get("action_type"), Some(&json!("accion_4")));
    }

    #[test]
    fn filtrado_por_actor() {
        let mut store = RecordStore::new();
        append(&mut store, entry("ana", "create_page")).unwrap();
        append(&mut store, entry("bruno", "delete_page")).unwrap();
        let filters: Record = [("actor_user_id".to_string(), json!("bruno"))].into_iter().collect();
        let rows = filtered(&store, &filters);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("action_type"), Some(&json!("delete_page")));
    }
}
