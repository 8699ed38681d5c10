// space.rs
use serde::{Deserialize, Serialize};

use crate::validate::non_empty;
use crate::DomainError;

/// Payload de creación de un espacio (contenedor de páginas).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSpace {
    /// Clave corta del espacio (`ENG`, `DOCS`...). Se normaliza a mayúsculas.
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_user_id: Option<String>,
}

impl NewSpace {
    pub fn validate(&self) -> Result<(), DomainError> {
        non_empty("key", &self.key)?;
        non_empty("name", &self.name)?;
        if !self.key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DomainError::Validation(format!("key de espacio inválida: {}", self.key)));
        }
        Ok(())
    }

    /// Clave normalizada para almacenar y buscar.
    pub fn normalized_key(&self) -> String {
        self.key.to_ascii_uppercase()
    }
}
