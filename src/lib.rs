//! WikiFlow Rust Library
//!
//! Este crate actúa como fachada del workspace:
//! - Reexporta el núcleo (`wiki_core`), el dominio (`wiki_domain`) y el
//!   catálogo de tools (`wiki_tools`).
//! - Expone `config` y el armado estándar del registro para binarios y tests.

pub mod config;

pub use wiki_core;
pub use wiki_domain;
pub use wiki_tools;

use wiki_tools::{seed, SharedStore, ToolRegistry};

/// Construye el registro estándar sobre un store compartido nuevo,
/// sembrando el workspace de ejemplo si `seed_data` lo pide.
pub async fn build_registry(seed_data: bool) -> ToolRegistry {
    let store = SharedStore::new();
    if seed_data {
        let mut guard = store.write().await;
        // la semilla sólo puede fallar por colisión de ids, imposible sobre
        // un store recién creado
        let _ = seed::seed_workspace(&mut guard);
    }
    ToolRegistry::new(store)
}
