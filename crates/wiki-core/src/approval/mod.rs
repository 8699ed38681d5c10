//! Motor de aprobaciones multi-step.
//!
//! Rol en el sistema:
//! - Crea solicitudes de aprobación compuestas por steps ordenados, cada uno
//!   asignado a un aprobador concreto.
//! - Procesa decisiones (approve/reject) manteniendo un estado agregado
//!   consistente: el status de la solicitud es una función pura de los
//!   status de sus steps, nunca lo fija el llamador directamente.
//! - Secuencia estricta: un step sólo es decidible cuando todos los de
//!   índice menor están aprobados.
//! - Short-circuit: un rechazo cierra la solicitud y marca `skipped` todo
//!   step que siguiera pendiente (a los aprobadores restantes ya no se les
//!   pregunta).
//!
//! Todas las validaciones preceden a toda escritura: una decisión aplica
//! completa (decisión + step + recálculo del agregado) o no deja rastro.
//! El motor no escribe auditoría ni notificaciones; eso lo empareja la capa
//! de tools alrededor de cada llamada.

pub mod status;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use status::{DecisionKind, RequestStatus, StepStatus};

use crate::errors::CoreError;
use crate::store::{Record, RecordStore};
use crate::table::Table;

/// Payload de creación de una solicitud.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApprovalRequest {
    pub target_entity_type: String,
    pub target_entity_id: String,
    pub requested_by_user_id: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    pub steps: Vec<NewApprovalStep>,
}

/// Una entrada de la cadena de aprobadores, en orden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApprovalStep {
    pub approver_user_id: String,
}

/// Solicitud + steps ordenados + decisiones registradas.
#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    pub request: Record,
    pub steps: Vec<Record>,
    pub decisions: Vec<Record>,
}

/// Resultado de procesar una decisión: step actualizado, decisión inmutable
/// recién creada y estado agregado recalculado.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    pub step: Record,
    pub decision: Record,
    pub request: Record,
    pub request_status: RequestStatus,
}

/// Crea la solicitud con sus steps (todos `pending`, `sequence_index`
/// contiguo desde cero).
///
/// # Errores
/// `CoreError::InvalidInput` si `steps` está vacío o algún step no nombra
/// aprobador.
pub fn create_request(store: &mut RecordStore, input: NewApprovalRequest) -> Result<RequestView, CoreError> {
    if input.steps.is_empty() {
        return Err(CoreError::InvalidInput("una solicitud requiere al menos un step".into()));
    }
    if input.requested_by_user_id.trim().is_empty() {
        return Err(CoreError::InvalidInput("requested_by_user_id es requerido".into()));
    }
    for (i, step) in input.steps.iter().enumerate() {
        if step.approver_user_id.trim().is_empty() {
            return Err(CoreError::InvalidInput(format!("el step {i} no nombra approver_user_id")));
        }
    }

    let request_id = store.next_id(Table::ApprovalRequests);
    let step_ids: Vec<String> = (0..input.steps.len()).map(|_| store.next_id(Table::ApprovalSteps)).collect();
    let created_at = store.timestamp_string();

    let request = to_record(json!({
        "id": request_id,
        "target_entity_type": input.target_entity_type,
        "target_entity_id": input.target_entity_id,
        "requested_by_user_id": input.requested_by_user_id,
        "reason": input.reason,
        "due_at": input.due_at,
        "metadata": input.metadata.unwrap_or(Value::Null),
        "status": RequestStatus::Pending.as_str(),
        "created_at": created_at,
        "step_ids": step_ids,
    }));
    store.create(Table::ApprovalRequests, &request_id, request.clone())?;

    let mut steps = Vec::with_capacity(step_ids.len());
    for (index, (step_id, entry)) in step_ids.iter().zip(&input.steps).enumerate() {
        let record = to_record(json!({
            "id": step_id,
            "request_id": request_id,
            "sequence_index": index,
            "approver_user_id": entry.approver_user_id,
            "status": StepStatus::Pending.as_str(),
        }));
        store.create(Table::ApprovalSteps, step_id, record.clone())?;
        steps.push(record);
    }

    debug!("approval: request {} creada con {} steps", request_id, steps.len());
    Ok(RequestView { request,
                     steps,
                     decisions: Vec::new() })
}

/// Procesa la decisión de un aprobador sobre su step.
///
/// # Errores
/// - `NotFound` si el step no existe.
/// - `InvalidState` si el step no está `pending`, la solicitud ya está
///   cerrada, o un step de índice menor sigue sin aprobar (secuencia
///   estricta).
/// - `Forbidden` si `approver_user_id` no es el aprobador designado.
pub fn decide_step(store: &mut RecordStore,
                   step_id: &str,
                   approver_user_id: &str,
                   decision: DecisionKind,
                   comment: Option<String>)
                   -> Result<DecisionOutcome, CoreError> {
    let step = store.get(Table::ApprovalSteps, step_id)
                    .ok_or_else(|| CoreError::NotFound { table: Table::ApprovalSteps.as_str().to_string(),
                                                         id: step_id.to_string() })?;
    let step_status = StepStatus::parse(str_field(&step, "status")?)?;
    if step_status != StepStatus::Pending {
        return Err(CoreError::InvalidState(format!("el step {step_id} ya está {}", step_status.as_str())));
    }

    let request_id = str_field(&step, "request_id")?.to_string();
    let request = store.get(Table::ApprovalRequests, &request_id)
                       .ok_or_else(|| CoreError::Internal(format!("step {step_id} referencia solicitud inexistente {request_id}")))?;
    let request_status = RequestStatus::parse(str_field(&request, "status")?)?;
    if request_status != RequestStatus::Pending {
        return Err(CoreError::InvalidState(format!("la solicitud {request_id} ya está {}", request_status.as_str())));
    }

    if str_field(&step, "approver_user_id")? != approver_user_id {
        return Err(CoreError::Forbidden(format!("{approver_user_id} no es el aprobador designado del step {step_id}")));
    }

    // Secuencia estricta: nadie decide por delante de un step sin aprobar.
    let my_index = index_field(&step)?;
    for sibling in ordered_steps(store, &request_id)? {
        if index_field(&sibling)? < my_index && StepStatus::parse(str_field(&sibling, "status")?)? != StepStatus::Approved {
            return Err(CoreError::InvalidState(format!("secuencia estricta: el step de índice {} aún no está aprobado",
                                                       index_field(&sibling)?)));
        }
    }

    // Validado todo: a partir de aquí las escrituras no pueden fallar.
    let decision_id = store.next_id(Table::ApprovalDecisions);
    let decided_at = store.timestamp_string();
    let decision_record = to_record(json!({
        "id": decision_id,
        "step_id": step_id,
        "approver_user_id": approver_user_id,
        "decision": decision.as_str(),
        "comment": comment,
        "decided_at": decided_at,
    }));
    store.create(Table::ApprovalDecisions, &decision_id, decision_record.clone())?;

    let updated_step = store.update(Table::ApprovalSteps,
                                    step_id,
                                    to_record(json!({ "status": decision.step_status().as_str() })))?;

    let request_status = recompute_request(store, &request_id)?;
    let updated_request = store.get(Table::ApprovalRequests, &request_id)
                               .ok_or_else(|| CoreError::Internal(format!("solicitud {request_id} desapareció durante la decisión")))?;

    debug!("approval: step {} -> {}, solicitud {} -> {}",
           step_id,
           decision.step_status().as_str(),
           request_id,
           request_status.as_str());

    Ok(DecisionOutcome { step: updated_step,
                         decision: decision_record,
                         request: updated_request,
                         request_status })
}

/// Cancelación explícita por parte del solicitante. No es alcanzable desde
/// una decisión: sólo esta operación produce `cancelled`.
///
/// # Errores
/// `NotFound` si la solicitud no existe, `Forbidden` si quien cancela no es
/// el solicitante, `InvalidState` si ya no está `pending`.
pub fn cancel_request(store: &mut RecordStore, request_id: &str, cancelled_by_user_id: &str) -> Result<RequestView, CoreError> {
    let request = store.get(Table::ApprovalRequests, request_id)
                       .ok_or_else(|| CoreError::NotFound { table: Table::ApprovalRequests.as_str().to_string(),
                                                            id: request_id.to_string() })?;
    let status = RequestStatus::parse(str_field(&request, "status")?)?;
    if status != RequestStatus::Pending {
        return Err(CoreError::InvalidState(format!("la solicitud {request_id} ya está {}", status.as_str())));
    }
    if str_field(&request, "requested_by_user_id")? != cancelled_by_user_id {
        return Err(CoreError::Forbidden(format!("sólo el solicitante puede cancelar la solicitud {request_id}")));
    }

    for step in ordered_steps(store, request_id)? {
        if StepStatus::parse(str_field(&step, "status")?)? == StepStatus::Pending {
            let id = str_field(&step, "id")?.to_string();
            store.update(Table::ApprovalSteps, &id, to_record(json!({ "status": StepStatus::Skipped.as_str() })))?;
        }
    }
    store.update(Table::ApprovalRequests,
                 request_id,
                 to_record(json!({ "status": RequestStatus::Cancelled.as_str() })))?;

    debug!("approval: solicitud {} cancelada", request_id);
    load_request(store, request_id)
}

/// Vista completa de una solicitud: registro + steps en orden de secuencia +
/// decisiones por step.
pub fn load_request(store: &RecordStore, request_id: &str) -> Result<RequestView, CoreError> {
    let request = store.get(Table::ApprovalRequests, request_id)
                       .ok_or_else(|| CoreError::NotFound { table: Table::ApprovalRequests.as_str().to_string(),
                                                            id: request_id.to_string() })?;
    let steps = ordered_steps(store, request_id)?;
    let mut decisions = Vec::new();
    for step in &steps {
        let step_id = str_field(step, "id")?;
        decisions.extend(store.find_all_by_field(Table::ApprovalDecisions, "step_id", &json!(step_id)));
    }
    Ok(RequestView { request,
                     steps,
                     decisions })
}

/// Recalcula el estado agregado a partir de los steps y lo persiste si
/// cambió. Regla, evaluada sobre los steps en orden de `sequence_index`:
/// - algún `rejected` -> solicitud `rejected`, pendientes restantes pasan a
///   `skipped`;
/// - todos `approved` -> `approved`;
/// - en otro caso -> sigue `pending`.
fn recompute_request(store: &mut RecordStore, request_id: &str) -> Result<RequestStatus, CoreError> {
    let steps = ordered_steps(store, request_id)?;
    let mut any_rejected = false;
    let mut all_approved = true;
    for step in &steps {
        match StepStatus::parse(str_field(step, "status")?)? {
            StepStatus::Rejected => {
                any_rejected = true;
                all_approved = false;
            }
            StepStatus::Approved => {}
            _ => all_approved = false,
        }
    }

    let status = if any_rejected {
        for step in &steps {
            if StepStatus::parse(str_field(step, "status")?)? == StepStatus::Pending {
                let id = str_field(step, "id")?.to_string();
                store.update(Table::ApprovalSteps, &id, to_record(json!({ "status": StepStatus::Skipped.as_str() })))?;
            }
        }
        RequestStatus::Rejected
    } else if all_approved {
        RequestStatus::Approved
    } else {
        RequestStatus::Pending
    };

    if status != RequestStatus::Pending {
        store.update(Table::ApprovalRequests,
                     request_id,
                     to_record(json!({ "status": status.as_str() })))?;
    }
    Ok(status)
}

/// Steps de la solicitud ordenados por `sequence_index`.
fn ordered_steps(store: &RecordStore, request_id: &str) -> Result<Vec<Record>, CoreError> {
    let mut steps = store.find_all_by_field(Table::ApprovalSteps, "request_id", &json!(request_id));
    steps.sort_by_key(|s| index_field(s).unwrap_or(u64::MAX));
    Ok(steps)
}

fn to_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

fn str_field<'a>(record: &'a Record, field: &str) -> Result<&'a str, CoreError> {
    record.get(field)
          .and_then(Value::as_str)
          .ok_or_else(|| CoreError::Internal(format!("campo {field} ausente o no textual")))
}

fn index_field(record: &Record) -> Result<u64, CoreError> {
    record.get("sequence_index")
          .and_then(Value::as_u64)
          .ok_or_else(|| CoreError::Internal("campo sequence_index ausente o no numérico".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_approvers(store: &mut RecordStore, approvers: &[&str]) -> RequestView {
        let input = NewApprovalRequest { target_entity_type: "page".into(),
                                         target_entity_id: "1".into(),
                                         requested_by_user_id: "ana".into(),
                                         reason: Some("publicación".into()),
                                         due_at: None,
                                         metadata: None,
                                         steps: approvers.iter()
                                                         .map(|a| NewApprovalStep { approver_user_id: (*a).into() })
                                                         .collect() };
        create_request(store, input).expect("solicitud válida")
    }

    fn step_id(view: &RequestView, index: usize) -> String {
        view.steps[index].get("id").and_then(Value::as_str).unwrap().to_string()
    }

    #[test]
    fn crear_solicitud_sin_steps_falla() {
        let mut store = RecordStore::new();
        let input = NewApprovalRequest { target_entity_type: "page".into(),
                                         target_entity_id: "1".into(),
                                         requested_by_user_id: "ana".into(),
                                         reason: None,
                                         due_at: None,
                                         metadata: None,
                                         steps: vec![] };
        let err = create_request(&mut store, input).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
        assert!(store.is_empty(Table::ApprovalRequests));
    }

    #[test]
    fn steps_quedan_ordenados_y_pendientes() {
        let mut store = RecordStore::new();
        let view = request_with_approvers(&mut store, &["bruno", "carla", "dani"]);
        assert_eq!(view.steps.len(), 3);
        for (i, step) in view.steps.iter().enumerate() {
            assert_eq!(step.get("sequence_index"), Some(&json!(i)));
            assert_eq!(step.get("status"), Some(&json!("pending")));
        }
        assert_eq!(view.request.get("status"), Some(&json!("pending")));
    }

    #[test]
    fn rechazo_hace_short_circuit() {
        let mut store = RecordStore::new();
        let view = request_with_approvers(&mut store, &["bruno", "carla", "dani"]);
        let s0 = step_id(&view, 0);

        let outcome = decide_step(&mut store, &s0, "bruno", DecisionKind::Reject, Some("falta revisión".into())).unwrap();
        assert_eq!(outcome.request_status, RequestStatus::Rejected);
        assert_eq!(outcome.step.get("status"), Some(&json!("rejected")));

        let after = load_request(&store, str_field(&view.request, "id").unwrap()).unwrap();
        assert_eq!(after.steps[1].get("status"), Some(&json!("skipped")));
        assert_eq!(after.steps[2].get("status"), Some(&json!("skipped")));

        // un step saltado ya no es decidible
        let s1 = step_id(&view, 1);
        let err = decide_step(&mut store, &s1, "carla", DecisionKind::Approve, None).unwrap_err();
        assert_eq!(err.kind(), "invalid_state");
    }

    #[test]
    fn aprobacion_total_requiere_todos_los_steps() {
        let mut store = RecordStore::new();
        let view = request_with_approvers(&mut store, &["bruno", "carla"]);
        let s0 = step_id(&view, 0);
        let s1 = step_id(&view, 1);

        let first = decide_step(&mut store, &s0, "bruno", DecisionKind::Approve, None).unwrap();
        assert_eq!(first.request_status, RequestStatus::Pending);

        let second = decide_step(&mut store, &s1, "carla", DecisionKind::Approve, None).unwrap();
        assert_eq!(second.request_status, RequestStatus::Approved);
        assert_eq!(second.request.get("status"), Some(&json!("approved")));
    }

    #[test]
    fn aprobador_equivocado_es_forbidden_y_no_escribe() {
        let mut store = RecordStore::new();
        let view = request_with_approvers(&mut store, &["bruno"]);
        let s0 = step_id(&view, 0);

        let err = decide_step(&mut store, &s0, "impostor", DecisionKind::Approve, None).unwrap_err();
        assert_eq!(err.kind(), "forbidden");

        let step = store.get(Table::ApprovalSteps, &s0).unwrap();
        assert_eq!(step.get("status"), Some(&json!("pending")));
        assert!(store.is_empty(Table::ApprovalDecisions));
    }

    #[test]
    fn secuencia_estricta_bloquea_decisiones_fuera_de_orden() {
        let mut store = RecordStore::new();
        let view = request_with_approvers(&mut store, &["bruno", "carla"]);
        let s1 = step_id(&view, 1);

        let err = decide_step(&mut store, &s1, "carla", DecisionKind::Approve, None).unwrap_err();
        assert_eq!(err.kind(), "invalid_state");

        // el step sigue pendiente y decidible cuando le llegue el turno
        let s0 = step_id(&view, 0);
        decide_step(&mut store, &s0, "bruno", DecisionKind::Approve, None).unwrap();
        let outcome = decide_step(&mut store, &s1, "carla", DecisionKind::Approve, None).unwrap();
        assert_eq!(outcome.request_status, RequestStatus::Approved);
    }

    #[test]
    fn redecidir_un_step_es_invalid_state() {
        let mut store = RecordStore::new();
        let view = request_with_approvers(&mut store, &["bruno"]);
        let s0 = step_id(&view, 0);

        decide_step(&mut store, &s0, "bruno", DecisionKind::Approve, None).unwrap();
        let err = decide_step(&mut store, &s0, "bruno", DecisionKind::Approve, None).unwrap_err();
        assert_eq!(err.kind(), "invalid_state");
        // la decisión original es inmutable: sigue habiendo exactamente una
        assert_eq!(store.len(Table::ApprovalDecisions), 1);
    }

    #[test]
    fn cancelar_solo_el_solicitante_y_solo_pendiente() {
        let mut store = RecordStore::new();
        let view = request_with_approvers(&mut store, &["bruno", "carla"]);
        let request_id = str_field(&view.request, "id").unwrap().to_string();

        let err = cancel_request(&mut store, &request_id, "bruno").unwrap_err();
        assert_eq!(err.kind(), "forbidden");

        let cancelled = cancel_request(&mut store, &request_id, "ana").unwrap();
        assert_eq!(cancelled.request.get("status"), Some(&json!("cancelled")));
        for step in &cancelled.steps {
            assert_eq!(step.get("status"), Some(&json!("skipped")));
        }

        let err = cancel_request(&mut store, &request_id, "ana").unwrap_err();
        assert_eq!(err.kind(), "invalid_state");
    }

    #[test]
    fn decision_guarda_comentario_y_fecha() {
        let mut store = RecordStore::new();
        let view = request_with_approvers(&mut store, &["bruno"]);
        let s0 = step_id(&view, 0);

        let outcome = decide_step(&mut store, &s0, "bruno", DecisionKind::Approve, Some("ok".into())).unwrap();
        assert_eq!(outcome.decision.get("comment"), Some(&json!("ok")));
        let decided_at = outcome.decision.get("decided_at").and_then(Value::as_str).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(decided_at).is_ok());
    }
}
