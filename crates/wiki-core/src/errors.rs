//! Errores tipados del núcleo (store + aprobaciones).
//!
//! Toda operación del core falla con una variante de `CoreError`; no hay
//! valores centinela. Los lookups documentados como "ausencia no es error"
//! devuelven `Option`/listas vacías en su lugar.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    #[error("unknown table: {0}")] InvalidTable(String),
    #[error("record not found: {table}/{id}")] NotFound { table: String, id: String },
    #[error("duplicate key: {table}/{id}")] DuplicateKey { table: String, id: String },
    #[error("invalid input: {0}")] InvalidInput(String),
    #[error("invalid state: {0}")] InvalidState(String),
    #[error("forbidden: {0}")] Forbidden(String),
    #[error("internal: {0}")] Internal(String),
}

impl CoreError {
    /// Etiqueta estable de la variante, usada por la capa de tools para
    /// serializar objetos de error (`{"error": {"kind": ...}}`).
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::InvalidTable(_) => "invalid_table",
            CoreError::NotFound { .. } => "not_found",
            CoreError::DuplicateKey { .. } => "duplicate_key",
            CoreError::InvalidInput(_) => "invalid_input",
            CoreError::InvalidState(_) => "invalid_state",
            CoreError::Forbidden(_) => "forbidden",
            CoreError::Internal(_) => "internal",
        }
    }
}
