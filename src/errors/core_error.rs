use caption_core::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error del pipeline: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("Error de serialización: {0}")]
    Serialization(#[from] serde_json::Error),
}
