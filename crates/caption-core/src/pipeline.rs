//! Coordinador del pipeline de dos etapas.
//!
//! Responsabilidades (y nada más):
//! - validar la entrada cruda antes de cualquier llamada externa;
//! - secuenciar caption -> aumento, deteniéndose en el primer fallo;
//! - traducir fallos a la taxonomía tipada;
//! - registrar la traza de la invocación.
//!
//! El resultado es todo o nada: si el aumento falla, el caption ya generado
//! se descarta.
use caption_domain::{validate_generate_input, AugmentedHashtags};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::capability::{AugmentationRequest, CaptionEngine, CaptionRequest, TrendingTopicsSource};
use crate::constants::PIPELINE_VERSION;
use crate::errors::PipelineError;
use crate::event::{PipelineEvent, PipelineEventKind, RunLog};
use crate::hashing::hash_value;
use crate::stage::{run_augmentation_stage, run_caption_stage, StageId};

/// Imagen tal como la entrega la capa de borde: bytes ya decodificados + MIME declarado.
#[derive(Clone)]
pub struct RawImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl RawImage {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self { bytes: bytes.into(),
               mime_type: mime_type.into() }
    }
}

impl std::fmt::Debug for RawImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawImage")
         .field("mime_type", &self.mime_type)
         .field("len", &self.bytes.len())
         .finish()
    }
}

/// Resultado exitoso: caption + hashtags aumentados.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedPost {
    pub caption: String,
    pub hashtags: AugmentedHashtags,
}

pub type PipelineResult = Result<GeneratedPost, PipelineError>;

/// Resultado de una invocación junto con su traza.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub result: PipelineResult,
    pub events: Vec<PipelineEvent>,
}

/// Recolector de la traza de una sola invocación.
struct RunRecorder {
    log: RunLog,
    stage_fingerprints: Vec<String>,
}

impl RunRecorder {
    fn new() -> Self {
        Self { log: RunLog::new(Uuid::new_v4()),
               stage_fingerprints: Vec::new() }
    }

    fn record(&mut self, kind: PipelineEventKind) {
        self.log.append(kind);
    }

    fn stage_finished(&mut self, stage: StageId, input: serde_json::Value, output: serde_json::Value) {
        let output_hash = hash_value(&output);
        let fingerprint = hash_value(&json!({
            "pipeline_version": PIPELINE_VERSION,
            "stage": stage,
            "input_hash": hash_value(&input),
            "output_hash": output_hash,
        }));
        self.stage_fingerprints.push(fingerprint.clone());
        self.record(PipelineEventKind::StageFinished { stage,
                                                       output_hash,
                                                       fingerprint });
    }

    fn fail(mut self, stage: Option<StageId>, error: PipelineError) -> PipelineRun {
        match (&error, stage) {
            (PipelineError::Cancelled, stage) => self.record(PipelineEventKind::RunCancelled { stage }),
            (_, Some(stage)) => {
                warn!("run {} failed at {} stage: {}", self.log.run_id(), stage, error);
                self.record(PipelineEventKind::StageFailed { stage,
                                                             kind: error.kind(),
                                                             message: error.to_string() })
            }
            (_, None) => warn!("run {} rejected: {}", self.log.run_id(), error),
        }
        self.finish(Err(error))
    }

    fn finish(self, result: PipelineResult) -> PipelineRun {
        PipelineRun { run_id: self.log.run_id(),
                      events: self.log.into_events(),
                      result }
    }
}

/// Ejecuta `fut` salvo que el token se cancele antes; en ese caso el future
/// en vuelo se descarta.
async fn unless_cancelled<T>(cancel: &CancellationToken, fut: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

/// Pipeline de generación. Sólo contiene capacidades inyectadas inmutables,
/// por lo que puede compartirse (`Arc`) entre invocaciones concurrentes.
#[derive(Clone)]
pub struct Pipeline {
    engine: Arc<dyn CaptionEngine>,
    trending: Arc<dyn TrendingTopicsSource>,
}

impl Pipeline {
    pub fn new(engine: Arc<dyn CaptionEngine>, trending: Arc<dyn TrendingTopicsSource>) -> Self {
        Self { engine, trending }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.get_name()
    }

    /// Punto de entrada único para la capa de borde.
    pub async fn generate(&self, image: RawImage, platform: &str) -> PipelineResult {
        self.generate_with_cancel(image, platform, CancellationToken::new()).await
    }

    /// Igual que `generate`, pero abortable: si el token se cancela la
    /// invocación falla con `Cancelled` y nunca produce un resultado exitoso.
    pub async fn generate_with_cancel(&self, image: RawImage, platform: &str, cancel: CancellationToken) -> PipelineResult {
        self.generate_traced(image, platform, cancel).await.result
    }

    /// Ejecuta el pipeline completo y devuelve el resultado con su traza.
    pub async fn generate_traced(&self, image: RawImage, platform: &str, cancel: CancellationToken) -> PipelineRun {
        let mut run = RunRecorder::new();
        info!("run {} started: platform={} mime={} bytes={}",
              run.log.run_id(),
              platform,
              image.mime_type,
              image.bytes.len());
        run.record(PipelineEventKind::RunStarted { platform: platform.to_string(),
                                                   mime_type: image.mime_type.clone(),
                                                   image_len: image.bytes.len() });
        if cancel.is_cancelled() {
            return run.fail(None, PipelineError::Cancelled);
        }

        // 1. Validación de entrada: ninguna capacidad se invoca con datos sin validar.
        let (payload, platform) = match validate_generate_input(&image.bytes, &image.mime_type, platform) {
            Ok(v) => v,
            Err(errors) => {
                run.record(PipelineEventKind::InputRejected { violations: errors.violations.clone() });
                return run.fail(None, PipelineError::Validation(errors));
            }
        };
        drop(image);

        // 2. Caption.
        let caption_input = json!({
            "platform": platform,
            "mime_type": payload.mime_type(),
            "image_digest": payload.digest(),
        });
        let request = CaptionRequest { image: payload, platform };
        run.record(PipelineEventKind::StageStarted { stage: StageId::Caption });
        let caption = match unless_cancelled(&cancel, run_caption_stage(self.engine.as_ref(), &request)).await {
            None => return run.fail(Some(StageId::Caption), PipelineError::Cancelled),
            Some(Err(e)) => return run.fail(Some(StageId::Caption), e),
            Some(Ok(c)) => c,
        };
        drop(request);
        run.stage_finished(StageId::Caption,
                           caption_input,
                           json!({"caption": caption.caption, "hashtags": caption.hashtags}));
        debug!("run {}: caption stage produced {} hashtags", run.log.run_id(), caption.hashtags.len());

        // 3. Aumento con tendencias (fail-fast: sólo si caption tuvo éxito).
        let request = AugmentationRequest { platform,
                                            hashtags: caption.hashtags };
        let augment_input = json!({"platform": request.platform, "hashtags": request.hashtags});
        run.record(PipelineEventKind::StageStarted { stage: StageId::Augmentation });
        let stage = run_augmentation_stage(self.engine.as_ref(), self.trending.as_ref(), &request);
        let (activity, outcome) = match unless_cancelled(&cancel, stage).await {
            None => return run.fail(Some(StageId::Augmentation), PipelineError::Cancelled),
            Some(r) => r,
        };
        run.record(PipelineEventKind::ToolUsage { stage: StageId::Augmentation,
                                                  activity });
        let outcome = match outcome {
            Ok(o) => o,
            Err(e) => return run.fail(Some(StageId::Augmentation), e),
        };
        if !outcome.report.unchanged() {
            run.record(PipelineEventKind::HashtagsNormalized { report: outcome.report });
        }
        run.stage_finished(StageId::Augmentation, augment_input, json!(outcome.hashtags.as_slice()));

        // 4. Éxito de ambas etapas.
        let run_fingerprint = hash_value(&json!(run.stage_fingerprints));
        run.record(PipelineEventKind::RunCompleted { run_fingerprint });
        info!("run {} completed with {} hashtags", run.log.run_id(), outcome.hashtags.len());
        run.finish(Ok(GeneratedPost { caption: caption.caption,
                                      hashtags: outcome.hashtags }))
    }
}
