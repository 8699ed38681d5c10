//! Tablas del workspace simulado.
//!
//! El conjunto de tablas es fijo y conocido de antemano; referenciar
//! cualquier otro nombre es `InvalidTable`. El store no conoce el esquema de
//! cada tabla (los registros son JSON plano); el enum existe para que los
//! nombres inválidos mueran en la frontera y no dentro de la lógica.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Users,
    Groups,
    GroupMembers,
    Spaces,
    Pages,
    Attachments,
    Permissions,
    Notifications,
    ApprovalRequests,
    ApprovalSteps,
    ApprovalDecisions,
    AuditLogs,
}

impl Table {
    pub const ALL: [Table; 12] = [Table::Users,
                                  Table::Groups,
                                  Table::GroupMembers,
                                  Table::Spaces,
                                  Table::Pages,
                                  Table::Attachments,
                                  Table::Permissions,
                                  Table::Notifications,
                                  Table::ApprovalRequests,
                                  Table::ApprovalSteps,
                                  Table::ApprovalDecisions,
                                  Table::AuditLogs];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Groups => "groups",
            Table::GroupMembers => "group_members",
            Table::Spaces => "spaces",
            Table::Pages => "pages",
            Table::Attachments => "attachments",
            Table::Permissions => "permissions",
            Table::Notifications => "notifications",
            Table::ApprovalRequests => "approval_requests",
            Table::ApprovalSteps => "approval_steps",
            Table::ApprovalDecisions => "approval_decisions",
            Table::AuditLogs => "audit_logs",
        }
    }

    /// Resuelve un nombre textual de tabla.
    ///
    /// # Errores
    /// `CoreError::InvalidTable` si el nombre no pertenece al conjunto fijo.
    pub fn parse(raw: &str) -> Result<Table, CoreError> {
        BY_NAME.get(raw).copied().ok_or_else(|| CoreError::InvalidTable(raw.to_string()))
    }
}

static BY_NAME: Lazy<HashMap<&'static str, Table>> = Lazy::new(|| Table::ALL.iter().map(|t| (t.as_str(), *t)).collect());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_conoce_todas_las_tablas() {
        for t in Table::ALL {
            assert_eq!(Table::parse(t.as_str()).unwrap(), t);
        }
    }

    #[test]
    fn parse_rechaza_desconocidas() {
        let err = Table::parse("invoices").unwrap_err();
        assert_eq!(err, CoreError::InvalidTable("invoices".into()));
        assert_eq!(err.kind(), "invalid_table");
    }
}
