//! Contrato con un modelo de salida estructurada.
//!
//! Una llamada a `ModelClient::complete` es una sola ronda: el modelo recibe
//! el prompt, las variables de entrada, la imagen opcional, los tools
//! ofrecidos y la transcripción acumulada, y contesta o bien con llamadas a
//! tools o bien con la respuesta final.
use async_trait::async_trait;
use caption_core::EngineError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Declaración de un tool ofrecido al modelo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema de los argumentos.
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User { text: String },
    Model { tool_calls: Vec<ToolCall> },
    ToolResult { call_id: String, name: String, content: Value },
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelRequest {
    /// Nombre estable del prompt (permite a clientes deterministas elegir la respuesta).
    pub prompt_name: &'static str,
    pub prompt: String,
    pub input: Value,
    /// Imagen como data URI, sólo en la ronda de caption.
    #[serde(skip)]
    pub media: Option<String>,
    pub tools: Vec<ToolSpec>,
    pub output_schema: Value,
    pub transcript: Vec<Message>,
}

impl ModelRequest {
    /// Resultados de tools ya presentes en la transcripción, en orden.
    pub fn tool_results(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.transcript.iter().filter_map(|m| match m {
                                   Message::ToolResult { name, content, .. } => Some((name.as_str(), content)),
                                   _ => None,
                               })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    ToolCalls(Vec<ToolCall>),
    Final(Value),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("transport error: {0}")] Transport(String),
    #[error("quota exceeded: {0}")] Quota(String),
    #[error("request timed out after {0} ms")] Timeout(u128),
    #[error("malformed model response: {0}")] Malformed(String),
}

impl From<ModelError> for EngineError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Malformed(msg) => EngineError::SchemaViolation(msg),
            other => EngineError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    fn get_name(&self) -> &str;

    async fn complete(&self, request: &ModelRequest) -> Result<ModelTurn, ModelError>;
}
