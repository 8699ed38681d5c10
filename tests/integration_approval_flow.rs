use serde_json::json;
use wikiflow_rust::build_registry;

#[tokio::test]
async fn reject_at_first_step_skips_the_rest() {
    let registry = build_registry(true).await;

    let view = registry.dispatch("create_approval_request",
                                 json!({
                                     "actor_user_id": "1",
                                     "target_entity_type": "page",
                                     "target_entity_id": "2",
                                     "steps": [
                                         { "approver_user_id": "1" },
                                         { "approver_user_id": "2" },
                                         { "approver_user_id": "3" }
                                     ]
                                 }))
                       .await;
    let request_id = view["request"]["id"].as_str().unwrap().to_string();
    let s0 = view["steps"][0]["id"].as_str().unwrap().to_string();
    let s1 = view["steps"][1]["id"].as_str().unwrap().to_string();

    let out = registry.dispatch("decide_approval_step",
                                json!({ "actor_user_id": "1", "step_id": s0, "decision": "reject" }))
                      .await;
    assert_eq!(out["request_status"], json!("rejected"));
    assert_eq!(out["step"]["status"], json!("rejected"));

    let after = registry.dispatch("get_approval_request", json!({ "request_id": request_id })).await;
    assert_eq!(after["request"]["status"], json!("rejected"));
    assert_eq!(after["steps"][1]["status"], json!("skipped"));
    assert_eq!(after["steps"][2]["status"], json!("skipped"));

    // un step saltado ya no se puede decidir
    let err = registry.dispatch("decide_approval_step",
                                json!({ "actor_user_id": "2", "step_id": s1, "decision": "approve" }))
                      .await;
    assert_eq!(err["error"]["kind"], json!("invalid_state"));
}

#[tokio::test]
async fn request_approves_only_after_every_step() {
    let registry = build_registry(true).await;
    let view = registry.dispatch("create_approval_request",
                                 json!({
                                     "actor_user_id": "1",
                                     "target_entity_type": "page",
                                     "target_entity_id": "2",
                                     "steps": [
                                         { "approver_user_id": "2" },
                                         { "approver_user_id": "3" }
                                     ]
                                 }))
                       .await;
    let s0 = view["steps"][0]["id"].as_str().unwrap().to_string();
    let s1 = view["steps"][1]["id"].as_str().unwrap().to_string();

    let first = registry.dispatch("decide_approval_step",
                                  json!({ "actor_user_id": "2", "step_id": s0, "decision": "approve" }))
                        .await;
    assert_eq!(first["request_status"], json!("pending"));

    let second = registry.dispatch("decide_approval_step",
                                   json!({ "actor_user_id": "3", "step_id": s1, "decision": "approve" }))
                         .await;
    assert_eq!(second["request_status"], json!("approved"));
}

#[tokio::test]
async fn wrong_approver_leaves_step_pending() {
    let registry = build_registry(true).await;
    let view = registry.dispatch("create_approval_request",
                                 json!({
                                     "actor_user_id": "1",
                                     "target_entity_type": "space",
                                     "target_entity_id": "1",
                                     "steps": [{ "approver_user_id": "2" }]
                                 }))
                       .await;
    let request_id = view["request"]["id"].as_str().unwrap().to_string();
    let s0 = view["steps"][0]["id"].as_str().unwrap().to_string();

    let err = registry.dispatch("decide_approval_step",
                                json!({ "actor_user_id": "3", "step_id": s0, "decision": "approve" }))
                      .await;
    assert_eq!(err["error"]["kind"], json!("forbidden"));

    let after = registry.dispatch("get_approval_request", json!({ "request_id": request_id })).await;
    assert_eq!(after["steps"][0]["status"], json!("pending"));
    assert_eq!(after["request"]["status"], json!("pending"));
}

#[tokio::test]
async fn cancel_is_requester_only_and_terminal() {
    let registry = build_registry(true).await;
    let view = registry.dispatch("create_approval_request",
                                 json!({
                                     "actor_user_id": "1",
                                     "target_entity_type": "page",
                                     "target_entity_id": "1",
                                     "steps": [{ "approver_user_id": "2" }]
                                 }))
                       .await;
    let request_id = view["request"]["id"].as_str().unwrap().to_string();

    let err = registry.dispatch("cancel_approval_request",
                                json!({ "actor_user_id": "2", "request_id": request_id }))
                      .await;
    assert_eq!(err["error"]["kind"], json!("forbidden"));

    let cancelled = registry.dispatch("cancel_approval_request",
                                      json!({ "actor_user_id": "1", "request_id": request_id }))
                            .await;
    assert_eq!(cancelled["request"]["status"], json!("cancelled"));
    assert_eq!(cancelled["steps"][0]["status"], json!("skipped"));

    let again = registry.dispatch("cancel_approval_request",
                                  json!({ "actor_user_id": "1", "request_id": request_id }))
                        .await;
    assert_eq!(again["error"]["kind"], json!("invalid_state"));
}

#[tokio::test]
async fn list_approval_requests_filters_by_status() {
    let registry = build_registry(true).await;
    for target in ["1", "2"] {
        registry.dispatch("create_approval_request",
                          json!({
                              "actor_user_id": "1",
                              "target_entity_type": "page",
                              "target_entity_id": target,
                              "steps": [{ "approver_user_id": "2" }]
                          }))
                .await;
    }
    let pending = registry.dispatch("list_approval_requests", json!({ "status": "pending" })).await;
    assert_eq!(pending["count"], json!(2));
    let approved = registry.dispatch("list_approval_requests", json!({ "status": "approved" })).await;
    assert_eq!(approved["count"], json!(0));
}
