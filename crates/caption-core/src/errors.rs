//! Taxonomía de errores del pipeline.
//!
//! - `EngineError` / `ToolError`: fallos reportados por las capacidades
//!   inyectadas (motor y fuente de tendencias).
//! - `PipelineError`: fallo tipado que ve el llamador. Cada variante mapea a
//!   un `ErrorKind` estable y su `Display` es el mensaje legible.

use caption_domain::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::stage::StageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ValidationError,
    EngineUnavailable,
    SchemaViolation,
    EmptyResult,
    ToolFailure,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::EngineUnavailable => "EngineUnavailable",
            ErrorKind::SchemaViolation => "SchemaViolation",
            ErrorKind::EmptyResult => "EmptyResult",
            ErrorKind::ToolFailure => "ToolFailure",
            ErrorKind::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fallos del motor de generación.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum EngineError {
    /// Red, timeout, cuota: la llamada no llegó a completarse.
    #[error("engine unavailable: {0}")] Unavailable(String),
    #[error("engine output violates schema: {0}")] SchemaViolation(String),
    #[error("engine returned no content")] Empty,
    #[error("trending topics tool failed: {0}")] ToolFailure(String),
}

/// Fallos de la fuente de tendencias.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum ToolError {
    #[error("trending topics unavailable: {0}")] Unavailable(String),
    #[error("invalid tool arguments: {0}")] InvalidArguments(String),
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),
    #[error("{stage} stage failed: {message}")]
    EngineUnavailable { stage: StageId, message: String },
    #[error("{stage} stage returned malformed output: {message}")]
    SchemaViolation { stage: StageId, message: String },
    #[error("{stage} stage returned an empty result")]
    EmptyResult { stage: StageId },
    #[error("trending topics tool failed: {message}")]
    ToolFailure { message: String },
    #[error("invocation cancelled")]
    Cancelled,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Validation(_) => ErrorKind::ValidationError,
            PipelineError::EngineUnavailable { .. } => ErrorKind::EngineUnavailable,
            PipelineError::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            PipelineError::EmptyResult { .. } => ErrorKind::EmptyResult,
            PipelineError::ToolFailure { .. } => ErrorKind::ToolFailure,
            PipelineError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Traduce un fallo del motor a la variante tipada de la etapa que lo sufrió.
    pub fn from_engine(stage: StageId, err: EngineError) -> Self {
        match err {
            EngineError::Unavailable(message) => PipelineError::EngineUnavailable { stage, message },
            EngineError::SchemaViolation(message) => PipelineError::SchemaViolation { stage, message },
            EngineError::Empty => PipelineError::EmptyResult { stage },
            EngineError::ToolFailure(message) => PipelineError::ToolFailure { message },
        }
    }

    pub fn schema(stage: StageId, errors: &ValidationErrors) -> Self {
        PipelineError::SchemaViolation { stage,
                                         message: errors.to_string() }
    }
}
