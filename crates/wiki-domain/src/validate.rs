//! Helpers de validación compartidos entre entidades.
//!
//! Los payloads llegan como JSON arbitrario desde el catálogo de tools; estas
//! funciones concentran las reglas repetidas (campos no vacíos, fechas
//! RFC 3339) para que cada entidad sólo declare las suyas propias.

use chrono::{DateTime, Utc};

use crate::DomainError;

/// Valida que un campo de texto requerido no esté vacío (ignorando espacios).
pub fn non_empty(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("campo requerido vacío: {field}")));
    }
    Ok(())
}

/// Parsea una fecha límite opcional en formato RFC 3339.
///
/// # Errores
/// `DomainError::Validation` si la cadena no es una fecha válida.
pub fn parse_due_at(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
                                     .map_err(|e| DomainError::Validation(format!("due_at inválido: {e}")))
}
