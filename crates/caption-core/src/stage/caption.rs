//! Etapa de generación de caption.
use caption_domain::schema::CAPTION_OUTPUT;
use caption_domain::CaptionResult;
use log::debug;

use super::StageId;
use crate::capability::{CaptionEngine, CaptionRequest};
use crate::errors::PipelineError;

const STAGE: StageId = StageId::Caption;

/// Invoca el motor y valida su salida contra `CAPTION_OUTPUT`.
///
/// - fallo del motor -> variante del motor (`EngineUnavailable`, ...);
/// - `null` o caption en blanco -> `EmptyResult`;
/// - forma incorrecta -> `SchemaViolation` con todas las violaciones.
pub async fn run_caption_stage(engine: &dyn CaptionEngine,
                               request: &CaptionRequest)
                               -> Result<CaptionResult, PipelineError> {
    debug!("caption stage: engine={} platform={} mime={} bytes={}",
           engine.get_name(),
           request.platform,
           request.image.mime_type(),
           request.image.len());

    let raw = engine.generate_caption(request)
                    .await
                    .map_err(|e| PipelineError::from_engine(STAGE, e))?;
    if raw.is_null() {
        return Err(PipelineError::EmptyResult { stage: STAGE });
    }
    CAPTION_OUTPUT.validate(&raw)
                  .map_err(|errs| PipelineError::schema(STAGE, &errs))?;
    let result: CaptionResult =
        serde_json::from_value(raw).map_err(|e| PipelineError::SchemaViolation { stage: STAGE,
                                                                                  message: e.to_string() })?;
    if !result.has_caption() {
        return Err(PipelineError::EmptyResult { stage: STAGE });
    }
    Ok(result)
}
