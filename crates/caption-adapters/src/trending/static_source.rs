//! Tabla fija de temas por plataforma. Plataformas sin feed devuelven `[]`.
use async_trait::async_trait;
use caption_core::{ToolError, TrendingTopicsSource};
use caption_domain::Platform;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static TOPICS: Lazy<HashMap<Platform, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: HashMap<Platform, &'static [&'static str]> = HashMap::new();
    m.insert(Platform::Instagram, &["#instagood", "#photooftheday", "#fashion"]);
    m.insert(Platform::X, &["#news", "#tech", "#sports"]);
    m
});

#[derive(Debug, Default, Clone, Copy)]
pub struct StaticTrendingTopics;

impl StaticTrendingTopics {
    pub fn new() -> Self {
        Self
    }

    pub fn topics_for(platform: Platform) -> Vec<String> {
        TOPICS.get(&platform)
              .map(|t| t.iter().map(|s| s.to_string()).collect())
              .unwrap_or_default()
    }
}

#[async_trait]
impl TrendingTopicsSource for StaticTrendingTopics {
    fn get_name(&self) -> &str {
        "static"
    }

    async fn get_trending_topics(&self, platform: Platform) -> Result<Vec<String>, ToolError> {
        Ok(Self::topics_for(platform))
    }
}
