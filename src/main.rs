//! Demo end-to-end de la simulación.
//!
//! Siembra el workspace, recorre el catálogo como lo haría un agente (crear
//! página, pedir aprobación en cadena, decidir en orden) y termina volcando
//! el audit trail. Todo ocurre en memoria; no hay transporte ni persistencia.

use serde_json::{json, Value};
use wikiflow_rust::config::CONFIG;
use wikiflow_rust::build_registry;

fn print_result(label: &str, value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(pretty) => println!("== {label}\n{pretty}\n"),
        Err(_) => println!("== {label}\n{value}\n"),
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let registry = build_registry(CONFIG.seed).await;
    let actor = CONFIG.default_actor.clone();

    println!("wikiflow demo: catálogo de {} tools\n", registry.definitions().len());

    // 1. Una página nueva en el espacio sembrado
    let page = registry.dispatch("create_page",
                                 json!({
                                     "actor_user_id": actor,
                                     "space_id": "1",
                                     "title": "Política de despliegues",
                                     "body": "Todo despliegue a producción requiere dos aprobaciones."
                                 }))
                       .await;
    print_result("create_page", &page);
    let page_id = page["id"].as_str().unwrap_or("1").to_string();

    // 2. Cadena de aprobación: bruno (2) y luego carla (3)
    let request = registry.dispatch("create_approval_request",
                                    json!({
                                        "actor_user_id": actor,
                                        "target_entity_type": "page",
                                        "target_entity_id": page_id,
                                        "reason": "Publicación de la política",
                                        "steps": [
                                            { "approver_user_id": "2" },
                                            { "approver_user_id": "3" }
                                        ]
                                    }))
                          .await;
    print_result("create_approval_request", &request);

    let step_ids: Vec<String> = request["steps"].as_array()
                                                .map(|steps| {
                                                    steps.iter()
                                                         .filter_map(|s| s["id"].as_str().map(str::to_string))
                                                         .collect()
                                                })
                                                .unwrap_or_default();

    // 3. Decidir fuera de orden falla (secuencia estricta)...
    if let Some(second) = step_ids.get(1) {
        let out = registry.dispatch("decide_approval_step",
                                    json!({ "actor_user_id": "3", "step_id": second, "decision": "approve" }))
                          .await;
        print_result("decide_approval_step (fuera de orden)", &out);
    }

    // 4. ...y en orden la solicitud termina aprobada
    for (step_id, approver) in step_ids.iter().zip(["2", "3"]) {
        let out = registry.dispatch("decide_approval_step",
                                    json!({ "actor_user_id": approver, "step_id": step_id, "decision": "approve",
                                            "comment": "ok" }))
                          .await;
        print_result(&format!("decide_approval_step ({approver})"), &out);
    }

    // 5. El solicitante se entera por su bandeja
    let inbox = registry.dispatch("list_notifications", json!({ "recipient_user_id": actor })).await;
    print_result("list_notifications", &inbox);

    // 6. Rastro completo de lo que pasó
    let audit = registry.dispatch("list_audit_logs", json!({ "limit": 10 })).await;
    print_result("list_audit_logs", &audit);
}
