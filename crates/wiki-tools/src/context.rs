use uuid::Uuid;

use crate::store::SharedStore;

/// Contexto de una invocación concreta.
///
/// El `invocation_id` correlaciona logs y entradas de audit de una misma
/// llamada; lo genera el registro en cada dispatch.
#[derive(Clone)]
pub struct ToolContext {
    pub store: SharedStore,
    pub invocation_id: Uuid,
}

impl ToolContext {
    pub fn new(store: SharedStore) -> Self {
        Self { store,
               invocation_id: Uuid::new_v4() }
    }
}
