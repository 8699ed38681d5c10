// permission.rs
use serde::{Deserialize, Serialize};

use crate::validate::non_empty;
use crate::DomainError;

/// Quién recibe el permiso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    User,
    Group,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::User => "user",
            SubjectKind::Group => "group",
        }
    }
}

/// Operación concedida sobre la entidad objetivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionOp {
    View,
    Edit,
    Admin,
}

impl PermissionOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionOp::View => "view",
            PermissionOp::Edit => "edit",
            PermissionOp::Admin => "admin",
        }
    }
}

/// Payload de `grant_permission`.
///
/// El store no verifica que el sujeto o el objetivo existan (la correctitud
/// referencial es del llamador); la validación aquí sólo cubre forma.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPermission {
    pub subject_kind: SubjectKind,
    pub subject_id: String,
    pub target_entity_type: String,
    pub target_entity_id: String,
    pub operation: PermissionOp,
}

impl NewPermission {
    pub fn validate(&self) -> Result<(), DomainError> {
        non_empty("subject_id", &self.subject_id)?;
        non_empty("target_entity_type", &self.target_entity_type)?;
        non_empty("target_entity_id", &self.target_entity_id)
    }
}
