//! Imagen subida por el usuario.
//!
//! Al motor nunca se le entregan bytes crudos: la imagen viaja como un blob
//! autodescriptivo (`data:<mime>;base64,<datos>`), igual que en el contrato
//! del motor multimodal.
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::DomainError;

#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    bytes: Vec<u8>,
}

impl ImagePayload {
    /// Construye un payload validado: MIME `image/<subtipo>` y bytes no vacíos.
    pub fn new(bytes: Vec<u8>, mime_type: &str) -> Result<Self, DomainError> {
        let mime = mime_type.trim();
        if !is_image_mime(mime) {
            return Err(DomainError::ValidationError(format!("invalid image MIME type '{mime}'")));
        }
        if bytes.is_empty() {
            return Err(DomainError::ValidationError("image content is empty".to_string()));
        }
        Ok(ImagePayload { mime_type: mime.to_string(),
                          bytes })
    }

    /// Reconstruye un payload desde un data URI base64.
    pub fn from_data_uri(uri: &str) -> Result<Self, DomainError> {
        let rest = uri.strip_prefix("data:")
                      .ok_or_else(|| DomainError::DataUri("missing 'data:' scheme".into()))?;
        let (metadata, data) = rest.split_once(',')
                                   .ok_or_else(|| DomainError::DataUri("missing comma in data uri".into()))?;
        let mime = metadata.strip_suffix(";base64")
                           .ok_or_else(|| DomainError::DataUri("only base64 encoded data uris are supported".into()))?;
        let bytes = BASE64_STANDARD.decode(data.trim())?;
        ImagePayload::new(bytes, mime)
    }

    pub fn mime_type(&self) -> &str { &self.mime_type }
    pub fn bytes(&self) -> &[u8] { &self.bytes }
    pub fn len(&self) -> usize { self.bytes.len() }
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Representación autodescriptiva que consume el motor.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64_STANDARD.encode(&self.bytes))
    }

    /// SHA-256 hex del contenido. Se usa en logs y fingerprints en lugar de los bytes.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        format!("{:x}", hasher.finalize())
    }
}

pub(crate) fn is_image_mime(mime: &str) -> bool {
    match mime.split_once('/') {
        Some((top, sub)) => top == "image" && !sub.is_empty() && !sub.contains(char::is_whitespace),
        None => false,
    }
}

// Debug sin volcar los bytes de la imagen.
impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
         .field("mime_type", &self.mime_type)
         .field("len", &self.bytes.len())
         .finish()
    }
}
