//! Handle compartido del store.
//!
//! El `RecordStore` es síncrono y de estado mutable compartido: varias
//! invocaciones de tools (actores simulados distintos) operan sobre las
//! mismas tablas. Cada operación mutante es una sección crítica completa
//! (asignación de id + escrituras + audit bajo el mismo write lock) para que
//! dos llamadores no puedan emitir el mismo id ni pisarse la decisión de un
//! step.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use wiki_core::RecordStore;

#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<RwLock<RecordStore>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(RecordStore::new())) }
    }

    /// Lock de lectura (tools de consulta).
    pub async fn read(&self) -> RwLockReadGuard<'_, RecordStore> {
        self.inner.read().await
    }

    /// Lock de escritura (toda la sección crítica de un tool mutante).
    pub async fn write(&self) -> RwLockWriteGuard<'_, RecordStore> {
        self.inner.write().await
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new()
    }
}
