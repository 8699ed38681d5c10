//! wiki-tools: catálogo de tools invocables sobre el backend simulado.
//!
//! Rol en el sistema:
//! - Declara cada tool (nombre, descripción, esquema de entrada) y su
//!   handler asíncrono.
//! - El registro despacha por nombre y serializa tanto resultados como
//!   errores tipados (`{"error": {"kind", "message"}}`).
//! - Cada handler es un pass-through delgado: valida el payload contra los
//!   tipos de `wiki-domain`, toma el lock del store compartido, llama una o
//!   dos operaciones de `wiki-core` y empareja cada mutación con su entrada
//!   de audit.

pub mod context;
pub mod definition;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod registry;
pub mod seed;
pub mod store;

pub use context::ToolContext;
pub use definition::{ToolDefinition, ToolHandler};
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use store::SharedStore;
