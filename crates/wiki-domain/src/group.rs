// group.rs
use serde::{Deserialize, Serialize};

use crate::validate::non_empty;
use crate::DomainError;

/// Payload de creación de grupo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
}

impl NewGroup {
    pub fn validate(&self) -> Result<(), DomainError> {
        non_empty("name", &self.name)
    }
}

/// Relación usuario <-> grupo (tabla `group_members`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGroupMember {
    pub group_id: String,
    pub user_id: String,
}

impl NewGroupMember {
    pub fn validate(&self) -> Result<(), DomainError> {
        non_empty("group_id", &self.group_id)?;
        non_empty("user_id", &self.user_id)
    }
}
