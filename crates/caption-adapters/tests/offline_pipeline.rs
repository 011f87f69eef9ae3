use caption_adapters::{OfflineModelClient, StaticTrendingTopics, ToolLoopConfig, ToolLoopEngine};
use caption_core::{Pipeline, PipelineEventKind, RawImage};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn pipeline() -> Pipeline {
    Pipeline::new(Arc::new(ToolLoopEngine::new(OfflineModelClient::new(), ToolLoopConfig::default())),
                  Arc::new(StaticTrendingTopics::new()))
}

fn jpeg() -> RawImage {
    RawImage::new(vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg")
}

#[tokio::test]
async fn instagram_gets_trending_topics_appended() {
    let post = pipeline().generate(jpeg(), "Instagram").await.expect("offline run should succeed");
    assert!(!post.caption.is_empty());
    assert_eq!(post.hashtags.as_slice(),
               ["#goldenhour", "#photography", "#instadaily", "#instagood", "#photooftheday", "#fashion"]);
}

#[tokio::test]
async fn linkedin_has_no_trending_feed() {
    let post = pipeline().generate(jpeg(), "LinkedIn").await.expect("offline run should succeed");
    assert_eq!(post.hashtags.as_slice(), ["#leadership", "#inspiration"]);
}

#[tokio::test]
async fn tool_usage_is_traced() {
    let run = pipeline().generate_traced(jpeg(), "X", CancellationToken::new()).await;
    assert!(run.result.is_ok());
    let calls = run.events
                   .iter()
                   .find_map(|e| match &e.kind {
                       PipelineEventKind::ToolUsage { activity, .. } => Some(activity.calls),
                       _ => None,
                   })
                   .expect("tool usage should be traced");
    assert_eq!(calls, 1);
}
