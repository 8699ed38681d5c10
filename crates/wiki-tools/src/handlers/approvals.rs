//! Tools del flujo de aprobaciones.
//!
//! Los handlers son el pegamento alrededor del motor: validan el payload,
//! llaman a `wiki_core::approval` bajo el write lock y disparan los avisos
//! (siguiente aprobador, o solicitante cuando la solicitud cierra). El motor
//! en sí nunca escribe audit ni notificaciones.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use wiki_core::approval::{self, DecisionKind, NewApprovalRequest, NewApprovalStep, RequestStatus, RequestView,
                          StepStatus};
use wiki_core::Table;
use wiki_domain::validate::parse_due_at;

use super::{audit_mutation, parse_payload};
use crate::context::ToolContext;
use crate::definition::{ToolDefinition, ToolHandler};
use crate::error::ToolError;
use crate::notify;

pub fn all() -> Vec<Box<dyn ToolHandler>> {
    vec![Box::new(CreateApprovalRequest),
         Box::new(DecideApprovalStep),
         Box::new(CancelApprovalRequest),
         Box::new(GetApprovalRequest),
         Box::new(ListApprovalRequests)]
}

fn view_value(view: &RequestView) -> Value {
    json!({ "request": view.request, "steps": view.steps, "decisions": view.decisions })
}

fn str_of(record: &wiki_core::Record, field: &str) -> String {
    record.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Aprobador del step pendiente de menor índice, si queda alguno.
fn next_pending_approver(view: &RequestView) -> Option<(String, String)> {
    view.steps
        .iter()
        .find(|s| s.get("status").and_then(Value::as_str) == Some(StepStatus::Pending.as_str()))
        .map(|s| (str_of(s, "id"), str_of(s, "approver_user_id")))
}

// ---------------------------------------------------------------- create

pub struct CreateApprovalRequest;

#[derive(Deserialize)]
struct CreateApprovalRequestInput {
    actor_user_id: String,
    target_entity_type: String,
    target_entity_id: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    due_at: Option<String>,
    #[serde(default)]
    metadata: Option<Value>,
    steps: Vec<ApprovalStepInput>,
}

#[derive(Deserialize)]
struct ApprovalStepInput {
    approver_user_id: String,
}

#[async_trait]
impl ToolHandler for CreateApprovalRequest {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("create_approval_request",
                            "Open a multi-step approval request over a target entity. Steps are decided strictly in order.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "target_entity_type": { "type": "string" },
                                    "target_entity_id": { "type": "string" },
                                    "reason": { "type": "string" },
                                    "due_at": { "type": "string", "format": "date-time" },
                                    "metadata": { "type": "object" },
                                    "steps": {
                                        "type": "array",
                                        "minItems": 1,
                                        "items": {
                                            "type": "object",
                                            "properties": { "approver_user_id": { "type": "string" } },
                                            "required": ["approver_user_id"]
                                        }
                                    }
                                },
                                "required": ["actor_user_id", "target_entity_type", "target_entity_id", "steps"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: CreateApprovalRequestInput = parse_payload(payload)?;
        if let Some(raw) = &input.due_at {
            parse_due_at(raw)?;
        }

        let request = NewApprovalRequest { target_entity_type: input.target_entity_type,
                                           target_entity_id: input.target_entity_id,
                                           requested_by_user_id: input.actor_user_id.clone(),
                                           reason: input.reason,
                                           due_at: input.due_at,
                                           metadata: input.metadata,
                                           steps: input.steps
                                                       .into_iter()
                                                       .map(|s| NewApprovalStep { approver_user_id: s.approver_user_id })
                                                       .collect() };

        let mut store = ctx.store.write().await;
        let view = approval::create_request(&mut store, request)?;
        let request_id = str_of(&view.request, "id");
        audit_mutation(&mut store, ctx, &input.actor_user_id, "create_approval_request", "approval_request",
                       &request_id,
                       json!({ "target_entity_type": view.request.get("target_entity_type"),
                               "target_entity_id": view.request.get("target_entity_id"),
                               "steps": view.steps.len() }))?;

        // El primer aprobador de la cadena recibe el aviso inmediatamente.
        if let Some((step_id, approver)) = next_pending_approver(&view) {
            notify::push(&mut store,
                         &approver,
                         "Aprobación pendiente",
                         &format!("La solicitud {request_id} espera tu decisión en el step {step_id}."),
                         "approval")?;
        }
        Ok(view_value(&view))
    }
}

// ---------------------------------------------------------------- decide

pub struct DecideApprovalStep;

#[derive(Deserialize)]
struct DecideApprovalStepInput {
    actor_user_id: String,
    step_id: String,
    decision: String,
    #[serde(default)]
    comment: Option<String>,
}

#[async_trait]
impl ToolHandler for DecideApprovalStep {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("decide_approval_step",
                            "Record approve/reject on a pending step as its designated approver and return the recomputed request status.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "step_id": { "type": "string" },
                                    "decision": { "enum": ["approve", "reject"] },
                                    "comment": { "type": "string" }
                                },
                                "required": ["actor_user_id", "step_id", "decision"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: DecideApprovalStepInput = parse_payload(payload)?;
        let decision = DecisionKind::parse(&input.decision)?;

        let mut store = ctx.store.write().await;
        let outcome = approval::decide_step(&mut store, &input.step_id, &input.actor_user_id, decision, input.comment)?;
        let request_id = str_of(&outcome.request, "id");
        audit_mutation(&mut store, ctx, &input.actor_user_id, "decide_approval_step", "approval_step",
                       &input.step_id,
                       json!({ "decision": decision.as_str(),
                               "request_id": request_id,
                               "request_status": outcome.request_status.as_str() }))?;

        match outcome.request_status {
            RequestStatus::Pending => {
                // La cadena sigue: avisar al siguiente aprobador en orden.
                let view = approval::load_request(&store, &request_id)?;
                if let Some((step_id, approver)) = next_pending_approver(&view) {
                    notify::push(&mut store,
                                 &approver,
                                 "Aprobación pendiente",
                                 &format!("La solicitud {request_id} espera tu decisión en el step {step_id}."),
                                 "approval")?;
                }
            }
            status => {
                let requester = str_of(&outcome.request, "requested_by_user_id");
                notify::push(&mut store,
                             &requester,
                             &format!("Solicitud {}", status.as_str()),
                             &format!("Tu solicitud {request_id} quedó {}.", status.as_str()),
                             "approval")?;
            }
        }

        Ok(json!({
            "step": outcome.step,
            "decision": outcome.decision,
            "request": outcome.request,
            "request_status": outcome.request_status.as_str(),
        }))
    }
}

// ---------------------------------------------------------------- cancel

pub struct CancelApprovalRequest;

#[derive(Deserialize)]
struct CancelApprovalRequestInput {
    actor_user_id: String,
    request_id: String,
}

#[async_trait]
impl ToolHandler for CancelApprovalRequest {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("cancel_approval_request",
                            "Cancel a pending request. Only the requester may cancel; remaining steps become skipped.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "actor_user_id": { "type": "string" },
                                    "request_id": { "type": "string" }
                                },
                                "required": ["actor_user_id", "request_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: CancelApprovalRequestInput = parse_payload(payload)?;
        let mut store = ctx.store.write().await;
        let view = approval::cancel_request(&mut store, &input.request_id, &input.actor_user_id)?;
        audit_mutation(&mut store, ctx, &input.actor_user_id, "cancel_approval_request", "approval_request",
                       &input.request_id, json!({}))?;
        Ok(view_value(&view))
    }
}

// ---------------------------------------------------------------- read

pub struct GetApprovalRequest;

#[derive(Deserialize)]
struct GetApprovalRequestInput {
    request_id: String,
}

#[async_trait]
impl ToolHandler for GetApprovalRequest {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_approval_request",
                            "Request plus its ordered steps and recorded decisions.",
                            json!({
                                "type": "object",
                                "properties": { "request_id": { "type": "string" } },
                                "required": ["request_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: GetApprovalRequestInput = parse_payload(payload)?;
        let store = ctx.store.read().await;
        let view = approval::load_request(&store, &input.request_id)?;
        Ok(view_value(&view))
    }
}

pub struct ListApprovalRequests;

#[derive(Deserialize)]
struct ListApprovalRequestsInput {
    status: Option<String>,
    target_entity_type: Option<String>,
    target_entity_id: Option<String>,
}

#[async_trait]
impl ToolHandler for ListApprovalRequests {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("list_approval_requests",
                            "List approval requests in creation order, optionally filtered by status and/or target.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "status": { "enum": ["pending", "approved", "rejected", "cancelled"] },
                                    "target_entity_type": { "type": "string" },
                                    "target_entity_id": { "type": "string" }
                                }
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: ListApprovalRequestsInput = parse_payload(payload)?;
        let mut filters = serde_json::Map::new();
        if let Some(status) = input.status {
            // valida el vocabulario antes de filtrar
            RequestStatus::parse(&status).map_err(|_| ToolError::Payload(format!("status desconocido: {status}")))?;
            filters.insert("status".into(), json!(status));
        }
        if let Some(t) = input.target_entity_type {
            filters.insert("target_entity_type".into(), json!(t));
        }
        if let Some(t) = input.target_entity_id {
            filters.insert("target_entity_id".into(), json!(t));
        }
        let store = ctx.store.read().await;
        let requests = store.filter_records(Table::ApprovalRequests, &filters);
        Ok(json!({ "count": requests.len(), "requests": requests }))
    }
}
