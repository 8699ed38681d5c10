//! Despacho de notificaciones dentro de la simulación.
//!
//! "Entregar" una notificación es crear un registro en la tabla
//! `notifications`; no hay transporte real. El motor de aprobaciones nunca
//! llama aquí directamente: son los handlers quienes disparan el aviso al
//! siguiente aprobador o al solicitante tras cada transición.

use serde_json::{json, Value};
use wiki_core::{CoreError, Record, RecordStore, Table};

/// Crea el registro de notificación y lo devuelve.
pub fn push(store: &mut RecordStore,
            recipient_user_id: &str,
            subject: &str,
            body: &str,
            kind: &str)
            -> Result<Record, CoreError> {
    let id = store.next_id(Table::Notifications);
    let created_at = store.timestamp_string();
    let record = match json!({
        "id": id,
        "recipient_user_id": recipient_user_id,
        "subject": subject,
        "body": body,
        "kind": kind,
        "read": false,
        "created_at": created_at,
    }) {
        Value::Object(map) => map,
        _ => Record::new(),
    };
    store.create(Table::Notifications, &id, record.clone())?;
    Ok(record)
}
