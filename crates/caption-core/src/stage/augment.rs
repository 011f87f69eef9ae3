//! Etapa de aumento de hashtags con temas en tendencia.
//!
//! El motor recibe la fuente de tendencias como un tool que puede invocar
//! cero o más veces. La etapa la envuelve en un `ToolProbe` por invocación
//! para saber cuántas llamadas hubo y cuáles fallaron, sin compartir estado
//! entre invocaciones.
//!
//! Política aplicada sobre la salida final, sin importar cómo la combinó el
//! motor: dedupe exacto (gana la primera aparición) y tope de
//! `HASHTAG_CAP` entradas.
use async_trait::async_trait;
use caption_domain::schema::AUGMENT_OUTPUT;
use caption_domain::{AugmentedHashtags, MergeReport, Platform};
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use super::StageId;
use crate::capability::{AugmentationRequest, CaptionEngine, TrendingTopicsSource};
use crate::errors::{EngineError, PipelineError, ToolError};

const STAGE: StageId = StageId::Augmentation;

/// Actividad del tool durante una invocación.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolActivity {
    pub calls: usize,
    pub failures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentationOutcome {
    pub hashtags: AugmentedHashtags,
    pub report: MergeReport,
}

struct ToolProbe<'a> {
    inner: &'a dyn TrendingTopicsSource,
    calls: AtomicUsize,
    failures: Mutex<Vec<String>>,
}

impl<'a> ToolProbe<'a> {
    fn new(inner: &'a dyn TrendingTopicsSource) -> Self {
        Self { inner,
               calls: AtomicUsize::new(0),
               failures: Mutex::new(Vec::new()) }
    }

    fn into_activity(self) -> ToolActivity {
        ToolActivity { calls: self.calls.into_inner(),
                       failures: self.failures.into_inner() }
    }
}

#[async_trait]
impl<'a> TrendingTopicsSource for ToolProbe<'a> {
    fn get_name(&self) -> &str {
        self.inner.get_name()
    }

    async fn get_trending_topics(&self, platform: Platform) -> Result<Vec<String>, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.inner.get_trending_topics(platform).await {
            Ok(topics) => {
                debug!("trending source {} returned {} topics for {}", self.inner.get_name(), topics.len(), platform);
                Ok(topics)
            }
            Err(e) => {
                warn!("trending source {} failed for {}: {}", self.inner.get_name(), platform, e);
                self.failures.lock().await.push(e.to_string());
                Err(e)
            }
        }
    }
}

/// Invoca el motor con el tool de tendencias y aplica la política de merge.
///
/// Devuelve siempre la actividad del tool (también en error) para que el
/// coordinador la registre en la traza.
pub async fn run_augmentation_stage(engine: &dyn CaptionEngine,
                                    trending: &dyn TrendingTopicsSource,
                                    request: &AugmentationRequest)
                                    -> (ToolActivity, Result<AugmentationOutcome, PipelineError>) {
    debug!("augmentation stage: engine={} platform={} initial={}",
           engine.get_name(),
           request.platform,
           request.hashtags.len());

    let probe = ToolProbe::new(trending);
    let outcome = engine.augment_hashtags(request, &probe).await;
    let activity = probe.into_activity();

    let raw = match outcome {
        Ok(raw) => raw,
        Err(EngineError::ToolFailure(message)) => {
            return (activity, Err(PipelineError::ToolFailure { message }));
        }
        // El motor no se recuperó de un fallo del tool: se reporta como fallo del tool.
        Err(e) if !activity.failures.is_empty() => {
            let message = format!("{} (engine: {})", activity.failures.join("; "), e);
            return (activity, Err(PipelineError::ToolFailure { message }));
        }
        Err(e) => return (activity, Err(PipelineError::from_engine(STAGE, e))),
    };

    if !activity.failures.is_empty() {
        info!("engine recovered from {} trending tool failure(s)", activity.failures.len());
    }
    let result = normalize(raw, request);
    (activity, result)
}

fn normalize(raw: serde_json::Value, request: &AugmentationRequest) -> Result<AugmentationOutcome, PipelineError> {
    if raw.is_null() {
        return Err(PipelineError::EmptyResult { stage: STAGE });
    }
    AUGMENT_OUTPUT.validate(&raw)
                  .map_err(|errs| PipelineError::schema(STAGE, &errs))?;
    let tags: Vec<String> =
        serde_json::from_value(raw).map_err(|e| PipelineError::SchemaViolation { stage: STAGE,
                                                                                  message: e.to_string() })?;
    // Si había hashtags iniciales, una lista final vacía no es contenido utilizable.
    if tags.is_empty() && !request.hashtags.is_empty() {
        return Err(PipelineError::EmptyResult { stage: STAGE });
    }

    let (hashtags, report) = AugmentedHashtags::enforce(tags);
    if !report.unchanged() {
        info!("hashtags normalized: received={} duplicates_dropped={} truncated={}",
              report.received,
              report.duplicates_dropped,
              report.truncated);
    }
    Ok(AugmentationOutcome { hashtags, report })
}
