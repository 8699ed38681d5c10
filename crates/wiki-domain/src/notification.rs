// notification.rs
use serde::{Deserialize, Serialize};

use crate::validate::non_empty;
use crate::DomainError;

/// Payload de `send_notification`.
///
/// `kind` es una etiqueta libre (`info`, `approval`, `mention`...); la
/// simulación no restringe el vocabulario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub recipient_user_id: String,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "info".to_string()
}

impl NewNotification {
    pub fn validate(&self) -> Result<(), DomainError> {
        non_empty("recipient_user_id", &self.recipient_user_id)?;
        non_empty("subject", &self.subject)
    }
}
