use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::context::ToolContext;
use crate::error::ToolError;

/// Entrada del catálogo: lo que el agente ve al listar tools.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// Esquema JSON del payload de entrada, publicado tal cual.
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self { name: name.to_string(),
               description: description.to_string(),
               input_schema }
    }
}

/// Contrato de un tool invocable.
///
/// `execute` recibe el payload JSON crudo; el handler es responsable de
/// validarlo (tipos de `wiki-domain`) antes de tocar el store.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError>;
}
