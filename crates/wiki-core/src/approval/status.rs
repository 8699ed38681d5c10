//! Estados del flujo de aprobación.

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Estado de un step dentro de una solicitud.
///
/// Las transiciones válidas son:
/// - `Pending` -> `Approved`
/// - `Pending` -> `Rejected`
/// - `Pending` -> `Skipped`
///
/// Todo estado distinto de `Pending` es terminal; no hay reversiones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Approved,
    Rejected,
    Skipped,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Approved => "approved",
            StepStatus::Rejected => "rejected",
            StepStatus::Skipped => "skipped",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw {
            "pending" => Ok(StepStatus::Pending),
            "approved" => Ok(StepStatus::Approved),
            "rejected" => Ok(StepStatus::Rejected),
            "skipped" => Ok(StepStatus::Skipped),
            other => Err(CoreError::Internal(format!("step status corrupto: {other}"))),
        }
    }
}

/// Estado agregado de la solicitud, derivado mecánicamente de sus steps.
///
/// `Pending` -> `Approved` | `Rejected` por decisiones; `Cancelled` sólo via
/// la cancelación explícita del solicitante, nunca por una decisión.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            "cancelled" => Ok(RequestStatus::Cancelled),
            other => Err(CoreError::Internal(format!("request status corrupto: {other}"))),
        }
    }
}

/// Veredicto que un aprobador emite sobre su step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Approve,
    Reject,
}

impl DecisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::Approve => "approve",
            DecisionKind::Reject => "reject",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw {
            "approve" => Ok(DecisionKind::Approve),
            "reject" => Ok(DecisionKind::Reject),
            other => Err(CoreError::InvalidInput(format!("decisión desconocida: {other}"))),
        }
    }

    /// Estado terminal que esta decisión impone al step.
    pub fn step_status(&self) -> StepStatus {
        match self {
            DecisionKind::Approve => StepStatus::Approved,
            DecisionKind::Reject => StepStatus::Rejected,
        }
    }
}
