// page.rs
use serde::{Deserialize, Serialize};

use crate::validate::non_empty;
use crate::DomainError;

/// Estado editorial de una página.
///
/// Transiciones válidas:
/// - `Draft` -> `Published`
/// - `Published` -> `Archived`
/// - `Draft` -> `Archived`
///
/// El tool de actualización rechaza cualquier otro salto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Draft,
    Published,
    Archived,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
            PageStatus::Archived => "archived",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "draft" => Ok(PageStatus::Draft),
            "published" => Ok(PageStatus::Published),
            "archived" => Ok(PageStatus::Archived),
            other => Err(DomainError::Validation(format!("estado de página desconocido: {other}"))),
        }
    }

    /// Indica si el salto `self` -> `next` está permitido.
    pub fn can_transition(&self, next: PageStatus) -> bool {
        matches!((self, next),
                 (PageStatus::Draft, PageStatus::Published)
                 | (PageStatus::Draft, PageStatus::Archived)
                 | (PageStatus::Published, PageStatus::Archived))
            || *self == next
    }
}

impl Default for PageStatus {
    fn default() -> Self {
        PageStatus::Draft
    }
}

/// Payload de creación de página.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPage {
    pub space_id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub status: PageStatus,
}

impl NewPage {
    pub fn validate(&self) -> Result<(), DomainError> {
        non_empty("space_id", &self.space_id)?;
        non_empty("title", &self.title)?;
        Ok(())
    }
}
