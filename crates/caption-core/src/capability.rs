//! Capacidades externas de las que depende el pipeline.
//!
//! Ambas se inyectan en el coordinador; el core nunca construye clientes ni
//! lee configuración global. Las implementaciones concretas viven en
//! `caption-adapters` (o en dobles de test).
use async_trait::async_trait;
use caption_domain::{ImagePayload, Platform};
use serde::Serialize;
use serde_json::Value;

use crate::errors::{EngineError, ToolError};

/// Petición de la etapa de caption. Inmutable, vive sólo durante la llamada.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    pub image: ImagePayload,
    pub platform: Platform,
}

/// Petición de la etapa de aumento, construida desde la salida de caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AugmentationRequest {
    pub platform: Platform,
    pub hashtags: Vec<String>,
}

/// Motor multimodal de generación estructurada.
///
/// Ambos métodos devuelven el JSON estructurado tal cual lo produjo el motor
/// (`Value::Null` si no produjo nada); las etapas lo validan contra los
/// esquemas declarados antes de confiar en él.
#[async_trait]
pub trait CaptionEngine: Send + Sync {
    fn get_name(&self) -> &str;

    /// Caption + hashtags iniciales para la imagen y plataforma dadas.
    async fn generate_caption(&self, request: &CaptionRequest) -> Result<Value, EngineError>;

    /// Lista final de hashtags. El motor puede invocar `trending` cero o más
    /// veces antes de producir su respuesta.
    async fn augment_hashtags(&self,
                              request: &AugmentationRequest,
                              trending: &dyn TrendingTopicsSource)
                              -> Result<Value, EngineError>;
}

/// Fuente de temas en tendencia por plataforma. Sin estado e idempotente;
/// una plataforma sin feed devuelve una lista vacía, no un error.
#[async_trait]
pub trait TrendingTopicsSource: Send + Sync {
    fn get_name(&self) -> &str;

    async fn get_trending_topics(&self, platform: Platform) -> Result<Vec<String>, ToolError>;
}
