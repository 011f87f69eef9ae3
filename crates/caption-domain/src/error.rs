use thiserror::Error;

/// Error personalizado del dominio de captions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Error de validación: {0}")]
    ValidationError(String),

    #[error("Data URI inválido: {0}")]
    DataUri(String),

    #[error("Error de serialización: {0}")]
    SerializationError(String),
}

// Implementación de conversión desde serde_json::Error a DomainError
impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::SerializationError(e.to_string())
    }
}

impl From<base64::DecodeError> for DomainError {
    fn from(e: base64::DecodeError) -> Self {
        DomainError::DataUri(e.to_string())
    }
}
