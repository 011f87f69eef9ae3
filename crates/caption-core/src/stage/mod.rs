//! Etapas del pipeline.
//!
//! Cada etapa es una unidad que invoca una capacidad externa y valida su
//! salida antes de entregarla. Ninguna reintenta: los fallos se propagan al
//! coordinador tal cual.

pub mod augment;
pub mod caption;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use augment::{run_augmentation_stage, AugmentationOutcome, ToolActivity};
pub use caption::run_caption_stage;

/// Identificador estable de cada etapa (aparece en errores y eventos).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Caption,
    Augmentation,
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageId::Caption => f.write_str("caption"),
            StageId::Augmentation => f.write_str("augmentation"),
        }
    }
}
