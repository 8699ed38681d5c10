//! Semilla de datos para demos y pruebas manuales.
//!
//! Escribe directamente en el store (sin pasar por el catálogo) un workspace
//! mínimo y determinista: tres usuarios, un espacio con dos páginas, un grupo
//! de editores con un permiso de edición. Los ids quedan asignados por el
//! allocator en orden de inserción (users 1..3, space 1, pages 1..2...).

use serde_json::{json, Value};
use wiki_core::hashing::hash_value;
use wiki_core::{CoreError, Record, RecordStore, Table};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

pub fn seed_workspace(store: &mut RecordStore) -> Result<(), CoreError> {
    let now = store.timestamp_string();

    for (username, email, display_name) in [("ana", "ana@wiki.local", "Ana Ruiz"),
                                            ("bruno", "bruno@wiki.local", "Bruno Díaz"),
                                            ("carla", "carla@wiki.local", "Carla Vega")]
    {
        let id = store.next_id(Table::Users);
        store.create(Table::Users,
                     &id,
                     record(json!({
                         "id": id,
                         "username": username,
                         "email": email,
                         "display_name": display_name,
                         "active": true,
                         "created_at": now,
                         "updated_at": now,
                     })))?;
    }

    let space_id = store.next_id(Table::Spaces);
    store.create(Table::Spaces,
                 &space_id,
                 record(json!({
                     "id": space_id,
                     "key": "ENG",
                     "name": "Engineering",
                     "description": "Espacio de ingeniería",
                     "owner_user_id": "1",
                     "created_at": now,
                     "updated_at": now,
                 })))?;

    for (title, body, status) in [("Bienvenida", "Página de bienvenida del espacio.", "published"),
                                  ("Runbook", "Pasos de operación. Borrador.", "draft")]
    {
        let id = store.next_id(Table::Pages);
        store.create(Table::Pages,
                     &id,
                     record(json!({
                         "id": id,
                         "space_id": space_id,
                         "title": title,
                         "body": body,
                         "status": status,
                         "version": 1,
                         "content_hash": hash_value(&json!({ "title": title, "body": body })),
                         "created_by_user_id": "1",
                         "created_at": now,
                         "updated_at": now,
                     })))?;
    }

    let group_id = store.next_id(Table::Groups);
    store.create(Table::Groups,
                 &group_id,
                 record(json!({
                     "id": group_id,
                     "name": "editors",
                     "description": "Editores del espacio ENG",
                     "created_at": now,
                 })))?;
    let member_id = store.next_id(Table::GroupMembers);
    store.create(Table::GroupMembers,
                 &member_id,
                 record(json!({
                     "id": member_id,
                     "group_id": group_id,
                     "user_id": "2",
                     "created_at": now,
                 })))?;

    let permission_id = store.next_id(Table::Permissions);
    store.create(Table::Permissions,
                 &permission_id,
                 record(json!({
                     "id": permission_id,
                     "subject_kind": "group",
                     "subject_id": group_id,
                     "target_entity_type": "space",
                     "target_entity_id": space_id,
                     "operation": "edit",
                     "granted_by_user_id": "1",
                     "created_at": now,
                 })))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn la_semilla_es_consistente() {
        let mut store = RecordStore::new();
        seed_workspace(&mut store).unwrap();
        assert_eq!(store.len(Table::Users), 3);
        assert_eq!(store.len(Table::Spaces), 1);
        assert_eq!(store.len(Table::Pages), 2);
        // los ids siguen el orden de inserción
        let ana = store.get(Table::Users, "1").unwrap();
        assert_eq!(ana.get("username"), Some(&json!("ana")));
        // re-sembrar colisiona con los ids ya emitidos: el contador avanza
        seed_workspace(&mut store).unwrap();
        assert_eq!(store.len(Table::Users), 6);
    }
}
