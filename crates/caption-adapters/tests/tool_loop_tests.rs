use async_trait::async_trait;
use caption_adapters::{Message, ModelError, ModelTurn, ScriptedModelClient, StaticTrendingTopics, ToolCall,
                       ToolLoopConfig, ToolLoopEngine};
use caption_core::{AugmentationRequest, CaptionEngine, CaptionRequest, EngineError, ToolError, TrendingTopicsSource};
use caption_domain::{ImagePayload, Platform};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct FailingTopics {
    calls: AtomicUsize,
}

#[async_trait]
impl TrendingTopicsSource for FailingTopics {
    fn get_name(&self) -> &str {
        "failing"
    }

    async fn get_trending_topics(&self, _platform: Platform) -> Result<Vec<String>, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ToolError::Unavailable("503 from trends api".into()))
    }
}

fn trending_call(id: &str, platform: &str) -> ToolCall {
    ToolCall { id: id.to_string(),
               name: "getTrendingTopics".to_string(),
               arguments: json!({ "platform": platform }) }
}

fn augment_req(platform: Platform, tags: &[&str]) -> AugmentationRequest {
    AugmentationRequest { platform,
                          hashtags: tags.iter().map(|s| s.to_string()).collect() }
}

fn caption_req() -> CaptionRequest {
    CaptionRequest { image: ImagePayload::new(b"img".to_vec(), "image/jpeg").unwrap(),
                     platform: Platform::Instagram }
}

fn engine(turns: Vec<Result<ModelTurn, ModelError>>) -> ToolLoopEngine<ScriptedModelClient> {
    ToolLoopEngine::new(ScriptedModelClient::new(turns), ToolLoopConfig::default())
}

#[tokio::test]
async fn tool_results_are_fed_back_into_the_transcript() {
    let engine = engine(vec![Ok(ModelTurn::ToolCalls(vec![trending_call("c1", "X")])),
                             Ok(ModelTurn::Final(json!(["#photo", "#news"])))]);
    let out = engine.augment_hashtags(&augment_req(Platform::X, &["#photo"]), &StaticTrendingTopics)
                    .await
                    .unwrap();
    assert_eq!(out, json!(["#photo", "#news"]));

    assert_eq!(engine.client().remaining().await, 0);
    let requests = engine.client().requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tools.len(), 1);
    let last = requests[1].transcript.last().unwrap();
    assert_eq!(last,
               &Message::ToolResult { call_id: "c1".into(),
                                      name: "getTrendingTopics".into(),
                                      content: json!(["#news", "#tech", "#sports"]) });
}

#[tokio::test]
async fn tool_error_is_reported_to_model_and_recovery_succeeds() {
    let topics = FailingTopics { calls: AtomicUsize::new(0) };
    let engine = engine(vec![Ok(ModelTurn::ToolCalls(vec![trending_call("c1", "Instagram")])),
                             Ok(ModelTurn::Final(json!(["#a"])))]);
    let out = engine.augment_hashtags(&augment_req(Platform::Instagram, &["#a"]), &topics)
                    .await
                    .unwrap();
    assert_eq!(out, json!(["#a"]));
    assert_eq!(topics.calls.load(Ordering::SeqCst), 1);

    let requests = engine.client().requests().await;
    match requests[1].transcript.last().unwrap() {
        Message::ToolResult { content, .. } => {
            assert!(content["error"].as_str().unwrap().contains("503 from trends api"))
        }
        other => panic!("expected tool result, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_tool_and_bad_arguments_go_back_as_errors() {
    let bad = vec![ToolCall { id: "c1".into(),
                              name: "getWeather".into(),
                              arguments: json!({}) },
                   ToolCall { id: "c2".into(),
                              name: "getTrendingTopics".into(),
                              arguments: json!({ "platform": 7 }) },
                   trending_call("c3", "TikTok")];
    let engine = engine(vec![Ok(ModelTurn::ToolCalls(bad)), Ok(ModelTurn::Final(json!(["#a"])))]);
    engine.augment_hashtags(&augment_req(Platform::X, &["#a"]), &StaticTrendingTopics)
          .await
          .unwrap();

    let requests = engine.client().requests().await;
    let errors: Vec<String> = requests[1].transcript
                                         .iter()
                                         .filter_map(|m| match m {
                                             Message::ToolResult { content, .. } => {
                                                 content["error"].as_str().map(str::to_string)
                                             }
                                             _ => None,
                                         })
                                         .collect();
    assert_eq!(errors.len(), 3);
    assert!(errors[0].contains("unknown tool 'getWeather'"));
    assert!(errors[1].contains("invalid tool arguments"));
    assert!(errors[2].contains("TikTok"));
}

#[tokio::test]
async fn round_limit_without_failures_is_unavailable() {
    let turns: Vec<Result<ModelTurn, ModelError>> =
        (0..3).map(|i| Ok(ModelTurn::ToolCalls(vec![trending_call(&format!("c{i}"), "X")])))
              .collect();
    let engine = ToolLoopEngine::new(ScriptedModelClient::new(turns),
                                     ToolLoopConfig { max_tool_rounds: 2,
                                                      ..ToolLoopConfig::default() });
    let err = engine.augment_hashtags(&augment_req(Platform::X, &[]), &StaticTrendingTopics)
                    .await
                    .unwrap_err();
    assert!(matches!(err, EngineError::Unavailable(ref m) if m.contains("2 tool round")), "{err:?}");
}

#[tokio::test]
async fn round_limit_after_tool_failure_is_tool_failure() {
    let topics = FailingTopics { calls: AtomicUsize::new(0) };
    let engine = ToolLoopEngine::new(ScriptedModelClient::new(vec![Ok(ModelTurn::ToolCalls(vec![trending_call("c1", "X")])),
                                                                   Ok(ModelTurn::ToolCalls(vec![trending_call("c2", "X")]))]),
                                     ToolLoopConfig { max_tool_rounds: 1,
                                                      ..ToolLoopConfig::default() });
    let err = engine.augment_hashtags(&augment_req(Platform::X, &["#a"]), &topics)
                    .await
                    .unwrap_err();
    assert!(matches!(err, EngineError::ToolFailure(ref m) if m.contains("503")), "{err:?}");
}

#[tokio::test]
async fn round_limit_after_unknown_tools_is_schema_violation() {
    let topics = FailingTopics { calls: AtomicUsize::new(0) };
    let weather = |id: &str| ToolCall { id: id.to_string(),
                                        name: "getWeather".to_string(),
                                        arguments: json!({}) };
    let engine = ToolLoopEngine::new(ScriptedModelClient::new(vec![Ok(ModelTurn::ToolCalls(vec![weather("c1")])),
                                                                   Ok(ModelTurn::ToolCalls(vec![weather("c2")]))]),
                                     ToolLoopConfig { max_tool_rounds: 1,
                                                      ..ToolLoopConfig::default() });
    let err = engine.augment_hashtags(&augment_req(Platform::X, &["#a"]), &topics)
                    .await
                    .unwrap_err();
    assert_eq!(topics.calls.load(Ordering::SeqCst), 0, "trending source must not be consulted");
    assert!(matches!(err, EngineError::SchemaViolation(ref m) if m.contains("unknown tool 'getWeather'")),
            "{err:?}");
}

#[tokio::test]
async fn source_failure_outranks_invalid_calls_at_round_limit() {
    let topics = FailingTopics { calls: AtomicUsize::new(0) };
    let mixed = vec![trending_call("c1", "TikTok"), trending_call("c2", "X")];
    let engine = ToolLoopEngine::new(ScriptedModelClient::new(vec![Ok(ModelTurn::ToolCalls(mixed)),
                                                                   Ok(ModelTurn::ToolCalls(vec![trending_call("c3", "X")]))]),
                                     ToolLoopConfig { max_tool_rounds: 1,
                                                      ..ToolLoopConfig::default() });
    let err = engine.augment_hashtags(&augment_req(Platform::X, &[]), &topics)
                    .await
                    .unwrap_err();
    assert_eq!(topics.calls.load(Ordering::SeqCst), 1);
    match err {
        EngineError::ToolFailure(m) => {
            assert!(m.contains("503"));
            assert!(!m.contains("TikTok"), "invalid calls are not source failures: {m}");
        }
        other => panic!("expected tool failure, got {other:?}"),
    }
}

#[tokio::test]
async fn caption_round_rejects_tool_requests() {
    let engine = engine(vec![Ok(ModelTurn::ToolCalls(vec![trending_call("c1", "Instagram")]))]);
    let err = engine.generate_caption(&caption_req()).await.unwrap_err();
    assert!(matches!(err, EngineError::SchemaViolation(_)), "{err:?}");
}

#[tokio::test]
async fn caption_round_sends_image_as_data_uri() {
    let engine = engine(vec![Ok(ModelTurn::Final(json!({"caption": "c", "hashtags": []})))]);
    engine.generate_caption(&caption_req()).await.unwrap();
    let requests = engine.client().requests().await;
    assert_eq!(requests[0].media.as_deref(), Some("data:image/jpeg;base64,aW1n"));
    assert!(requests[0].tools.is_empty());
}

#[tokio::test]
async fn model_errors_surface_as_engine_errors() {
    let engine = engine(vec![Err(ModelError::Quota("daily limit".into()))]);
    let err = engine.generate_caption(&caption_req()).await.unwrap_err();
    assert_eq!(err, EngineError::Unavailable("quota exceeded: daily limit".into()));
}

#[tokio::test(start_paused = true)]
async fn slow_model_times_out_as_unavailable() {
    let client = ScriptedModelClient::new(vec![Ok(ModelTurn::Final(json!({"caption": "late", "hashtags": []})))])
        .with_delay(Duration::from_secs(60));
    let engine = ToolLoopEngine::new(client,
                                     ToolLoopConfig { request_timeout: Duration::from_millis(500),
                                                      ..ToolLoopConfig::default() });
    let err = engine.generate_caption(&caption_req()).await.unwrap_err();
    assert_eq!(err, EngineError::Unavailable("request timed out after 500 ms".into()));
}
