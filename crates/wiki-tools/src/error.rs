use serde_json::{json, Value};
use thiserror::Error;
use wiki_core::CoreError;
use wiki_domain::DomainError;

/// Error observable de un tool. Los handlers traducen todo a una de estas
/// variantes; `dispatch` las serializa como objeto de error.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// Payload malformado o que no pasa la validación de dominio.
    #[error("{0}")]
    Payload(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<DomainError> for ToolError {
    fn from(e: DomainError) -> Self {
        ToolError::Payload(e.to_string())
    }
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "unknown_tool",
            ToolError::Payload(_) => "invalid_input",
            ToolError::Core(e) => e.kind(),
        }
    }

    /// Objeto de error serializado que recibe el agente.
    pub fn to_payload(&self) -> Value {
        json!({ "error": { "kind": self.kind(), "message": self.to_string() } })
    }
}
