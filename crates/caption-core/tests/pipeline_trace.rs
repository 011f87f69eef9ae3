use async_trait::async_trait;
use caption_core::{AugmentationRequest, CaptionEngine, CaptionRequest, EngineError, ErrorKind, Pipeline,
                   PipelineEventKind, PipelineRun, RawImage, StageId, ToolError, TrendingTopicsSource};
use caption_domain::Platform;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Motor determinista. Si `cancel_during` está presente, cancela el token
/// desde dentro de la etapa indicada y se queda esperando.
struct ScriptEngine {
    caption: Value,
    cancel_during: Option<(StageId, CancellationToken)>,
    recover_from_tool_failure: bool,
    augment_calls: AtomicUsize,
}

impl ScriptEngine {
    fn new(caption: Value) -> Self {
        Self { caption,
               cancel_during: None,
               recover_from_tool_failure: true,
               augment_calls: AtomicUsize::new(0) }
    }

    async fn maybe_hang(&self, stage: StageId) {
        if let Some((at, token)) = &self.cancel_during {
            if *at == stage {
                token.cancel();
                std::future::pending::<()>().await;
            }
        }
    }
}

#[async_trait]
impl CaptionEngine for ScriptEngine {
    fn get_name(&self) -> &str {
        "script"
    }

    async fn generate_caption(&self, _request: &CaptionRequest) -> Result<Value, EngineError> {
        self.maybe_hang(StageId::Caption).await;
        Ok(self.caption.clone())
    }

    async fn augment_hashtags(&self,
                              request: &AugmentationRequest,
                              trending: &dyn TrendingTopicsSource)
                              -> Result<Value, EngineError> {
        self.augment_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_hang(StageId::Augmentation).await;
        let mut all = request.hashtags.clone();
        match trending.get_trending_topics(request.platform).await {
            Ok(topics) => all.extend(topics),
            Err(e) if !self.recover_from_tool_failure => {
                return Err(EngineError::Unavailable(format!("gave up after tool error: {e}")))
            }
            Err(_) => {}
        }
        Ok(json!(all))
    }
}

struct Topics(Result<Vec<String>, ToolError>);

#[async_trait]
impl TrendingTopicsSource for Topics {
    fn get_name(&self) -> &str {
        "topics"
    }

    async fn get_trending_topics(&self, _platform: Platform) -> Result<Vec<String>, ToolError> {
        self.0.clone()
    }
}

fn sunset() -> Value {
    json!({"caption": "Sunset vibes", "hashtags": ["#sunset", "#sunset", "#vibes"]})
}

fn topics(list: &[&str]) -> Arc<Topics> {
    Arc::new(Topics(Ok(list.iter().map(|s| s.to_string()).collect())))
}

async fn traced(engine: ScriptEngine, trending: Arc<Topics>, cancel: CancellationToken) -> PipelineRun {
    let pipeline = Pipeline::new(Arc::new(engine), trending);
    pipeline.generate_traced(RawImage::new(b"img".to_vec(), "image/jpeg"), "Instagram", cancel)
            .await
}

fn labels(run: &PipelineRun) -> Vec<&'static str> {
    run.events
       .iter()
       .map(|e| match &e.kind {
           PipelineEventKind::RunStarted { .. } => "RunStarted",
           PipelineEventKind::InputRejected { .. } => "InputRejected",
           PipelineEventKind::StageStarted { .. } => "StageStarted",
           PipelineEventKind::ToolUsage { .. } => "ToolUsage",
           PipelineEventKind::HashtagsNormalized { .. } => "HashtagsNormalized",
           PipelineEventKind::StageFinished { .. } => "StageFinished",
           PipelineEventKind::StageFailed { .. } => "StageFailed",
           PipelineEventKind::RunCancelled { .. } => "RunCancelled",
           PipelineEventKind::RunCompleted { .. } => "RunCompleted",
       })
       .collect()
}

fn run_fingerprint(run: &PipelineRun) -> String {
    run.events
       .iter()
       .find_map(|e| match &e.kind {
           PipelineEventKind::RunCompleted { run_fingerprint } => Some(run_fingerprint.clone()),
           _ => None,
       })
       .expect("run should be completed")
}

#[tokio::test]
async fn successful_run_trace_is_ordered() {
    let run = traced(ScriptEngine::new(sunset()), topics(&["#instagood", "#sunset"]), CancellationToken::new()).await;
    assert!(run.result.is_ok());
    assert_eq!(labels(&run),
               ["RunStarted",
                "StageStarted",
                "StageFinished",
                "StageStarted",
                "ToolUsage",
                "HashtagsNormalized",
                "StageFinished",
                "RunCompleted"]);
    let seqs: Vec<u64> = run.events.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, (0..run.events.len() as u64).collect::<Vec<_>>());
    assert!(run.events.iter().all(|e| e.run_id == run.run_id));
}

#[tokio::test]
async fn fingerprints_are_deterministic() {
    let a = traced(ScriptEngine::new(sunset()), topics(&["#instagood"]), CancellationToken::new()).await;
    let b = traced(ScriptEngine::new(sunset()), topics(&["#instagood"]), CancellationToken::new()).await;
    assert_ne!(a.run_id, b.run_id, "each invocation gets its own run id");
    assert_eq!(run_fingerprint(&a), run_fingerprint(&b));

    let c = traced(ScriptEngine::new(sunset()), topics(&["#photooftheday"]), CancellationToken::new()).await;
    assert_ne!(run_fingerprint(&a), run_fingerprint(&c), "different trending output must change the fingerprint");
}

#[tokio::test]
async fn invalid_input_is_traced_without_stages() {
    let pipeline = Pipeline::new(Arc::new(ScriptEngine::new(sunset())), topics(&[]));
    let run = pipeline.generate_traced(RawImage::new(b"img".to_vec(), "image/png"), "Myspace", CancellationToken::new())
                      .await;
    assert_eq!(run.result.as_ref().unwrap_err().kind(), ErrorKind::ValidationError);
    assert_eq!(labels(&run), ["RunStarted", "InputRejected"]);
}

#[tokio::test]
async fn recovered_tool_failure_succeeds_and_is_traced() {
    let run = traced(ScriptEngine::new(sunset()),
                     Arc::new(Topics(Err(ToolError::Unavailable("feed offline".into())))),
                     CancellationToken::new()).await;
    let post = run.result.as_ref().expect("engine recovered, run should succeed");
    assert_eq!(post.hashtags.as_slice(), ["#sunset", "#vibes"]);
    let activity = run.events
                      .iter()
                      .find_map(|e| match &e.kind {
                          PipelineEventKind::ToolUsage { activity, .. } => Some(activity.clone()),
                          _ => None,
                      })
                      .expect("tool usage should be traced");
    assert_eq!(activity.calls, 1);
    assert_eq!(activity.failures.len(), 1);
}

#[tokio::test]
async fn unrecovered_tool_failure_is_tool_failure() {
    let mut engine = ScriptEngine::new(sunset());
    engine.recover_from_tool_failure = false;
    let run = traced(engine,
                     Arc::new(Topics(Err(ToolError::Unavailable("feed offline".into())))),
                     CancellationToken::new()).await;
    let err = run.result.as_ref().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ToolFailure);
    assert!(err.to_string().contains("feed offline"));
    assert!(run.events.iter().any(|e| matches!(
        &e.kind,
        PipelineEventKind::StageFailed { stage: StageId::Augmentation, kind: ErrorKind::ToolFailure, .. }
    )));
    assert!(!labels(&run).contains(&"RunCompleted"));
}

#[tokio::test]
async fn already_cancelled_token_calls_nothing() {
    let engine = Arc::new(ScriptEngine::new(sunset()));
    let pipeline = Pipeline::new(engine.clone(), topics(&[]));
    let token = CancellationToken::new();
    token.cancel();
    let run = pipeline.generate_traced(RawImage::new(b"img".to_vec(), "image/png"), "X", token).await;
    assert_eq!(run.result.as_ref().unwrap_err().kind(), ErrorKind::Cancelled);
    assert_eq!(labels(&run), ["RunStarted", "RunCancelled"]);
    assert_eq!(engine.augment_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancellation_during_caption_stage() {
    let token = CancellationToken::new();
    let mut engine = ScriptEngine::new(sunset());
    engine.cancel_during = Some((StageId::Caption, token.clone()));
    let run = traced(engine, topics(&["#t"]), token).await;
    assert_eq!(run.result.as_ref().unwrap_err().kind(), ErrorKind::Cancelled);
    assert!(run.events.iter().any(|e| matches!(
        e.kind,
        PipelineEventKind::RunCancelled { stage: Some(StageId::Caption) }
    )));
}

#[tokio::test]
async fn cancellation_during_augmentation_discards_caption() {
    let token = CancellationToken::new();
    let mut engine = ScriptEngine::new(sunset());
    engine.cancel_during = Some((StageId::Augmentation, token.clone()));
    let pipeline = Pipeline::new(Arc::new(engine), topics(&["#t"]));
    let result = pipeline.generate_with_cancel(RawImage::new(b"img".to_vec(), "image/png"), "Instagram", token)
                         .await;
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Cancelled);
}
