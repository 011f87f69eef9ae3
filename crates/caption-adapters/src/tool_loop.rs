//! `CaptionEngine` sobre un `ModelClient` con bucle de tool calls.
//!
//! Ronda de caption: una sola llamada, sin tools. Ronda de aumento: se
//! ofrece `getTrendingTopics`; cada llamada pedida se ejecuta contra la
//! fuente inyectada y su resultado (o `{"error": ...}`) se agrega a la
//! transcripción antes de volver a llamar al modelo, hasta obtener la
//! respuesta final o agotar `max_tool_rounds`.
use async_trait::async_trait;
use caption_core::constants::TRENDING_TOOL_NAME;
use caption_core::{AugmentationRequest, CaptionEngine, CaptionRequest, EngineError, ToolError, TrendingTopicsSource};
use caption_domain::schema::TRENDING_TOOL_INPUT;
use caption_domain::Platform;
use log::{debug, info, warn};
use serde_json::{json, Value};
use std::time::Duration;

use crate::model::{Message, ModelClient, ModelError, ModelRequest, ModelTurn, ToolCall};
use crate::prompts;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolLoopConfig {
    /// Límite por llamada al modelo (no por invocación completa).
    pub request_timeout: Duration,
    /// Rondas de tool calls permitidas antes de exigir la respuesta final.
    pub max_tool_rounds: usize,
}

impl Default for ToolLoopConfig {
    fn default() -> Self {
        Self { request_timeout: DEFAULT_REQUEST_TIMEOUT,
               max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS }
    }
}

pub struct ToolLoopEngine<C: ModelClient> {
    client: C,
    config: ToolLoopConfig,
}

/// Motivo por el que una llamada pedida por el modelo no produjo resultado.
#[derive(Debug)]
enum CallError {
    /// Tool desconocido o argumentos inválidos: la fuente nunca se consultó.
    Rejected(String),
    /// La fuente de tendencias falló durante la llamada.
    Source(ToolError),
}

impl CallError {
    fn message(&self) -> String {
        match self {
            CallError::Rejected(msg) => msg.clone(),
            CallError::Source(e) => e.to_string(),
        }
    }
}

impl<C: ModelClient> ToolLoopEngine<C> {
    pub fn new(client: C, config: ToolLoopConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn call(&self, request: &ModelRequest) -> Result<ModelTurn, ModelError> {
        match tokio::time::timeout(self.config.request_timeout, self.client.complete(request)).await {
            Ok(turn) => turn,
            Err(_) => Err(ModelError::Timeout(self.config.request_timeout.as_millis())),
        }
    }

    /// Ejecuta una llamada pedida por el modelo. Sólo `CallError::Source`
    /// implica que la fuente de tendencias fue invocada.
    async fn execute(&self, call: &ToolCall, trending: &dyn TrendingTopicsSource) -> Result<Value, CallError> {
        if call.name != TRENDING_TOOL_NAME {
            return Err(CallError::Rejected(format!("unknown tool '{}'", call.name)));
        }
        TRENDING_TOOL_INPUT.validate(&call.arguments)
                           .map_err(|e| CallError::Rejected(ToolError::InvalidArguments(e.to_string()).to_string()))?;
        let platform = call.arguments["platform"].as_str()
                                                 .unwrap_or_default()
                                                 .parse::<Platform>()
                                                 .map_err(|e| CallError::Rejected(ToolError::InvalidArguments(e.to_string()).to_string()))?;
        let topics = trending.get_trending_topics(platform)
                             .await
                             .map_err(CallError::Source)?;
        Ok(json!(topics))
    }
}

#[async_trait]
impl<C: ModelClient> CaptionEngine for ToolLoopEngine<C> {
    fn get_name(&self) -> &str {
        self.client.get_name()
    }

    async fn generate_caption(&self, request: &CaptionRequest) -> Result<Value, EngineError> {
        let model_request = prompts::caption_request(request);
        match self.call(&model_request).await? {
            ModelTurn::Final(value) => Ok(value),
            ModelTurn::ToolCalls(calls) => {
                let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
                Err(EngineError::SchemaViolation(format!("caption prompt offers no tools, model requested [{}]",
                                                         names.join(", "))))
            }
        }
    }

    async fn augment_hashtags(&self,
                              request: &AugmentationRequest,
                              trending: &dyn TrendingTopicsSource)
                              -> Result<Value, EngineError> {
        let mut model_request = prompts::augmentation_request(request);
        let mut failures: Vec<String> = Vec::new();
        let mut rejected: Vec<String> = Vec::new();
        let mut rounds = 0usize;

        loop {
            let calls = match self.call(&model_request).await? {
                ModelTurn::Final(value) => {
                    debug!("tool loop finished after {} round(s)", rounds);
                    return Ok(value);
                }
                ModelTurn::ToolCalls(calls) if calls.is_empty() => {
                    return Err(EngineError::SchemaViolation("model returned an empty tool call list".into()));
                }
                ModelTurn::ToolCalls(calls) => calls,
            };

            if rounds >= self.config.max_tool_rounds {
                warn!("tool loop exceeded {} round(s) without a final answer", self.config.max_tool_rounds);
                if !failures.is_empty() {
                    return Err(EngineError::ToolFailure(failures.join("; ")));
                }
                if !rejected.is_empty() {
                    return Err(EngineError::SchemaViolation(format!("model kept issuing invalid tool calls: {}",
                                                                    rejected.join("; "))));
                }
                return Err(EngineError::Unavailable(format!("model exceeded {} tool round(s) without a final answer",
                                                            self.config.max_tool_rounds)));
            }
            rounds += 1;
            info!("tool loop round {}: {} call(s)", rounds, calls.len());

            model_request.transcript.push(Message::Model { tool_calls: calls.clone() });
            for call in calls {
                let content = match self.execute(&call, trending).await {
                    Ok(v) => v,
                    Err(err) => {
                        let msg = err.message();
                        warn!("tool call {} ({}) failed: {}", call.id, call.name, msg);
                        match err {
                            CallError::Source(_) => failures.push(msg.clone()),
                            CallError::Rejected(_) => rejected.push(msg.clone()),
                        }
                        json!({ "error": msg })
                    }
                };
                model_request.transcript.push(Message::ToolResult { call_id: call.id,
                                                                    name: call.name,
                                                                    content });
            }
        }
    }
}
