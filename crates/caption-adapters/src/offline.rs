//! Cliente de modelo determinista, sin red.
//!
//! Sirve para la demo del binario y para tests de extremo a extremo: produce
//! un caption por plataforma y, en la ronda de aumento, primero pide el tool
//! de tendencias y luego responde iniciales + temas recibidos.
use async_trait::async_trait;
use caption_core::constants::TRENDING_TOOL_NAME;
use caption_domain::Platform;
use serde_json::{json, Value};

use crate::model::{ModelClient, ModelError, ModelRequest, ModelTurn, ToolCall};
use crate::prompts::{AUGMENT_PROMPT_NAME, CAPTION_PROMPT_NAME};

#[derive(Debug, Default, Clone)]
pub struct OfflineModelClient;

impl OfflineModelClient {
    pub fn new() -> Self {
        Self
    }

    fn platform(request: &ModelRequest) -> Result<Platform, ModelError> {
        request.input["platform"].as_str()
                                 .ok_or_else(|| ModelError::Malformed("request input has no platform".into()))?
                                 .parse::<Platform>()
                                 .map_err(|e| ModelError::Malformed(e.to_string()))
    }

    fn caption_for(platform: Platform) -> (&'static str, Vec<&'static str>) {
        match platform {
            Platform::Instagram => ("Golden hour glow, soaking in every moment.",
                                    vec!["#goldenhour", "#photography", "#instadaily"]),
            Platform::X => ("Caught this one today. Thoughts?", vec!["#photo", "#today"]),
            Platform::Facebook => ("Sharing a favourite shot from this week with friends and family.",
                                   vec!["#memories", "#photography"]),
            Platform::LinkedIn => ("A fresh perspective can change how we see our work.",
                                   vec!["#leadership", "#inspiration"]),
        }
    }

    fn augment(request: &ModelRequest, platform: Platform) -> ModelTurn {
        let mut results = request.tool_results().peekable();
        if results.peek().is_none() {
            return ModelTurn::ToolCalls(vec![ToolCall { id: "call-1".to_string(),
                                                        name: TRENDING_TOOL_NAME.to_string(),
                                                        arguments: json!({ "platform": platform }) }]);
        }

        let mut tags: Vec<Value> = request.input["hashtags"].as_array().cloned().unwrap_or_default();
        // un resultado con error se ignora: se responde con lo que haya
        for (_, content) in results {
            if let Some(topics) = content.as_array() {
                tags.extend(topics.iter().cloned());
            }
        }
        ModelTurn::Final(Value::Array(tags))
    }
}

#[async_trait]
impl ModelClient for OfflineModelClient {
    fn get_name(&self) -> &str {
        "offline"
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelTurn, ModelError> {
        let platform = Self::platform(request)?;
        match request.prompt_name {
            CAPTION_PROMPT_NAME => {
                let (caption, hashtags) = Self::caption_for(platform);
                Ok(ModelTurn::Final(json!({ "caption": caption, "hashtags": hashtags })))
            }
            AUGMENT_PROMPT_NAME => Ok(Self::augment(request, platform)),
            other => Err(ModelError::Malformed(format!("unknown prompt '{other}'"))),
        }
    }
}
