use thiserror::Error;

/// Error de dominio: toda validación de payloads en la frontera de tools
/// termina aquí antes de tocar el store.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
}
