// attachment.rs
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::validate::non_empty;
use crate::DomainError;

/// Payload de subida de adjunto.
///
/// El contenido viaja en el propio payload (`content`); el registro guarda
/// solamente metadatos + digest, nunca los bytes. El digest permite verificar
/// integridad y deduplicar subidas repetidas del mismo archivo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttachment {
    pub page_id: String,
    pub filename: String,
    #[serde(default = "default_media_type")]
    pub media_type: String,
    pub content: String,
}

fn default_media_type() -> String {
    "application/octet-stream".to_string()
}

impl NewAttachment {
    pub fn validate(&self) -> Result<(), DomainError> {
        non_empty("page_id", &self.page_id)?;
        non_empty("filename", &self.filename)?;
        if self.filename.contains('/') || self.filename.contains('\\') {
            return Err(DomainError::Validation(format!("filename con separadores de ruta: {}", self.filename)));
        }
        Ok(())
    }

    /// Digest SHA-256 (hex) del contenido subido.
    pub fn content_sha256(&self) -> String {
        digest_bytes(self.content.as_bytes())
    }

    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }
}

/// Digest SHA-256 en hex de un buffer arbitrario.
pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_estable() {
        let a = NewAttachment { page_id: "1".into(),
                                filename: "notes.txt".into(),
                                media_type: "text/plain".into(),
                                content: "hola".into() };
        let b = NewAttachment { content: "hola".into(), ..a.clone() };
        assert_eq!(a.content_sha256(), b.content_sha256());
        assert_eq!(a.size_bytes(), 4);
    }

    #[test]
    fn filename_con_ruta_falla() {
        let a = NewAttachment { page_id: "1".into(),
                                filename: "../etc/passwd".into(),
                                media_type: default_media_type(),
                                content: String::new() };
        assert!(a.validate().is_err());
    }
}
