//! Registro y dispatch del catálogo.

use std::collections::HashMap;

use log::{debug, warn};
use serde_json::Value;

use crate::context::ToolContext;
use crate::definition::{ToolDefinition, ToolHandler};
use crate::error::ToolError;
use crate::handlers;
use crate::store::SharedStore;

pub struct ToolRegistry {
    store: SharedStore,
    tools: HashMap<String, Box<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Registro con el catálogo completo de tools incorporados.
    pub fn new(store: SharedStore) -> Self {
        let mut registry = Self::empty(store);
        for handler in handlers::builtin() {
            registry.register(handler);
        }
        registry
    }

    /// Registro vacío (tests y catálogos a medida).
    pub fn empty(store: SharedStore) -> Self {
        Self { store,
               tools: HashMap::new() }
    }

    /// Registra un handler; el último con un nombre dado gana.
    pub fn register(&mut self, handler: Box<dyn ToolHandler>) {
        let name = handler.definition().name;
        if self.tools.insert(name.clone(), handler).is_some() {
            warn!("registry: tool {name} re-registrado");
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Catálogo ordenado por nombre, listo para publicar al agente.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|h| h.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Invocación tipada: el llamador decide qué hacer con el error.
    pub async fn call(&self, name: &str, payload: Value) -> Result<Value, ToolError> {
        let handler = self.tools.get(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let ctx = ToolContext::new(self.store.clone());
        debug!("registry: dispatch {} invocation={}", name, ctx.invocation_id);
        handler.execute(&ctx, payload).await
    }

    /// Invocación serializada: siempre devuelve un `Value`, sea el resultado
    /// del tool o un objeto `{"error": ...}` que el agente puede interpretar.
    pub async fn dispatch(&self, name: &str, payload: Value) -> Value {
        match self.call(name, payload).await {
            Ok(result) => result,
            Err(e) => {
                warn!("registry: {} falló: {}", name, e);
                e.to_payload()
            }
        }
    }
}
