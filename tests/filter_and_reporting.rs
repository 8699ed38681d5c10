use serde_json::{json, Value};
use wikiflow_rust::build_registry;
use wikiflow_rust::wiki_core::{Record, Table};

#[tokio::test]
async fn absent_field_passes_through_the_listing_tools() {
    let registry = build_registry(true).await;

    // Un registro heterogéneo sin `status`, insertado por debajo del catálogo
    // como haría un script de siembra externo.
    {
        let mut store = registry.store().write().await;
        let id = store.next_id(Table::Pages);
        let record: Record = json!({
            "id": id,
            "space_id": "1",
            "title": "Página legada sin estado"
        }).as_object().cloned().unwrap();
        store.create(Table::Pages, &id, record).unwrap();
    }

    // list_pages filtra por status=draft: la página sin campo también entra
    // (política permisiva del filtro multi-campo).
    let out = registry.dispatch("list_pages", json!({ "space_id": "1", "status": "draft" })).await;
    let titles: Vec<&str> = out["pages"].as_array()
                                        .unwrap()
                                        .iter()
                                        .map(|p| p["title"].as_str().unwrap())
                                        .collect();
    assert!(titles.contains(&"Runbook"));
    assert!(titles.contains(&"Página legada sin estado"));
    assert!(!titles.contains(&"Bienvenida"), "published no debería pasar el filtro draft");
}

#[tokio::test]
async fn audit_trail_accumulates_in_append_order() {
    let registry = build_registry(true).await;

    registry.dispatch("create_group", json!({ "actor_user_id": "1", "name": "qa" })).await;
    registry.dispatch("send_notification",
                      json!({ "actor_user_id": "1", "recipient_user_id": "2", "subject": "hola" }))
            .await;

    let all = registry.dispatch("list_audit_logs", json!({})).await;
    let actions: Vec<&str> = all["entries"].as_array()
                                           .unwrap()
                                           .iter()
                                           .map(|e| e["action_type"].as_str().unwrap())
                                           .collect();
    assert_eq!(actions, vec!["create_group", "send_notification"]);

    // limit recorta por la cola (lo más reciente)
    let tail = registry.dispatch("list_audit_logs", json!({ "limit": 1 })).await;
    assert_eq!(tail["entries"][0]["action_type"], json!("send_notification"));

    // cada entrada lleva actor, acción, objetivo y created_at estampado
    let entry = &all["entries"][0];
    for field in ["actor_user_id", "action_type", "target_entity_type", "target_entity_id", "created_at"] {
        assert!(entry.get(field).is_some(), "falta {field}");
    }
}

#[tokio::test]
async fn permissions_check_is_exact_match() {
    let registry = build_registry(true).await;

    // la semilla otorga edit sobre el espacio 1 al grupo de editores (id 1)
    let allowed = registry.dispatch("check_permission",
                                    json!({
                                        "subject_kind": "group",
                                        "subject_id": "1",
                                        "target_entity_type": "space",
                                        "target_entity_id": "1",
                                        "operation": "edit"
                                    }))
                          .await;
    assert_eq!(allowed["allowed"], json!(true));

    // misma tupla con otra operación: sin jerarquías implícitas
    let admin = registry.dispatch("check_permission",
                                  json!({
                                      "subject_kind": "group",
                                      "subject_id": "1",
                                      "target_entity_type": "space",
                                      "target_entity_id": "1",
                                      "operation": "admin"
                                  }))
                        .await;
    assert_eq!(admin["allowed"], json!(false));
}

#[tokio::test]
async fn find_user_by_email_returns_null_on_absence() {
    let registry = build_registry(true).await;
    let hit = registry.dispatch("find_user_by_email", json!({ "email": "ana@wiki.local" })).await;
    assert_eq!(hit["username"], json!("ana"));
    let miss = registry.dispatch("find_user_by_email", json!({ "email": "nadie@wiki.local" })).await;
    assert_eq!(miss, Value::Null);
}

#[tokio::test]
async fn duplicate_username_is_duplicate_key() {
    let registry = build_registry(true).await;
    let out = registry.dispatch("create_user",
                                json!({ "actor_user_id": "1", "username": "ana", "email": "otra@wiki.local" }))
                      .await;
    assert_eq!(out["error"]["kind"], json!("duplicate_key"));
}
