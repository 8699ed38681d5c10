// user.rs
use serde::{Deserialize, Serialize};

use crate::validate::non_empty;
use crate::DomainError;

/// Payload de alta de usuario tal como lo recibe el tool `create_user`.
///
/// El store no impone esquema; la forma declarada aquí es el contrato que la
/// capa de tools valida antes de insertar el registro.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl NewUser {
    /// Valida el payload completo.
    ///
    /// # Errores
    /// `DomainError::Validation` si falta username/email o el email no tiene
    /// forma `local@dominio`.
    pub fn validate(&self) -> Result<(), DomainError> {
        non_empty("username", &self.username)?;
        validate_email(&self.email)
    }
}

/// Chequeo superficial de email: un separador y algo a ambos lados. La
/// verificación real de buzones queda fuera de la simulación.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    non_empty("email", email)?;
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() {
        return Err(DomainError::Validation(format!("email inválido: {email}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_valido_pasa() {
        let u = NewUser { username: "ana".into(),
                          email: "ana@wiki.local".into(),
                          display_name: Some("Ana".into()),
                          active: true };
        assert!(u.validate().is_ok());
    }

    #[test]
    fn email_sin_dominio_falla() {
        let u = NewUser { username: "ana".into(),
                          email: "ana@".into(),
                          display_name: None,
                          active: true };
        assert!(u.validate().is_err());
    }

    #[test]
    fn username_vacio_falla() {
        let u = NewUser { username: "  ".into(),
                          email: "a@b".into(),
                          display_name: None,
                          active: true };
        assert!(u.validate().is_err());
    }
}
