//! Tipos de evento de la traza y estructura `PipelineEvent`.
//!
//! Rol en el pipeline:
//! - Cada invocación del coordinador emite eventos a su propio `RunLog`
//!   (no compartido entre invocaciones).
//! - La traza permite auditar qué etapas corrieron, cómo terminaron y qué
//!   hizo el tool, sin exponer bytes de la imagen.
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use caption_domain::{MergeReport, Violation};

use crate::errors::ErrorKind;
use crate::stage::{StageId, ToolActivity};

#[derive(Debug, Clone, Serialize)]
pub enum PipelineEventKind {
    /// Primer evento de toda invocación. Sólo metadatos de la entrada cruda.
    RunStarted { platform: String, mime_type: String, image_len: usize },
    /// La validación de entrada falló; ninguna capacidad fue invocada.
    InputRejected { violations: Vec<Violation> },
    StageStarted { stage: StageId },
    /// Resumen de llamadas al tool de tendencias durante el aumento.
    ToolUsage { stage: StageId, activity: ToolActivity },
    /// La política de merge tuvo que corregir la salida del motor.
    HashtagsNormalized { report: MergeReport },
    StageFinished { stage: StageId, output_hash: String, fingerprint: String },
    /// La etapa terminó con error terminal. El pipeline no continúa (fail-fast).
    StageFailed { stage: StageId, kind: ErrorKind, message: String },
    RunCancelled { stage: Option<StageId> },
    /// Cierre exitoso con fingerprint agregado (hash de los fingerprints de etapa en orden).
    RunCompleted { run_fingerprint: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineEvent {
    pub seq: u64, // asignado por el RunLog (orden append)
    pub run_id: Uuid,
    pub kind: PipelineEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprint)
}
