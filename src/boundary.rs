//! Capa de borde: convierte un archivo subido en `RawImage`, construye el
//! pipeline configurado y mapea su resultado a una respuesta serializable.
use caption_adapters::{OfflineModelClient, StaticTrendingTopics, ToolLoopEngine};
use caption_core::{ErrorKind, Pipeline, PipelineResult, RawImage};
use caption_domain::ImagePayload;
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::CoreError;

/// MIME asignado cuando la extensión no se reconoce; la validación lo rechaza.
pub const FALLBACK_MIME: &str = "application/octet-stream";

static MIME_BY_EXTENSION: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([("png", "image/png"),
                   ("jpg", "image/jpeg"),
                   ("jpeg", "image/jpeg"),
                   ("gif", "image/gif"),
                   ("webp", "image/webp"),
                   ("bmp", "image/bmp"),
                   ("tif", "image/tiff"),
                   ("tiff", "image/tiff"),
                   ("avif", "image/avif"),
                   ("heic", "image/heic"),
                   ("heif", "image/heif"),
                   ("jfif", "image/jpeg"),
                   ("svg", "image/svg+xml"),
                   ("ico", "image/x-icon")])
});

/// MIME declarado a partir de la extensión (sin distinguir mayúsculas).
pub fn mime_from_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .and_then(|e| MIME_BY_EXTENSION.get(e.as_str()).copied())
        .unwrap_or(FALLBACK_MIME)
}

/// Lee el archivo subido. El contenido no se inspecciona: la validación del
/// pipeline decide si es aceptable.
pub async fn load_upload(path: &Path) -> Result<RawImage, CoreError> {
    let bytes = tokio::fs::read(path).await?;
    let mime = mime_from_path(path);
    info!("loaded upload {} ({} bytes, {})", path.display(), bytes.len(), mime);
    Ok(RawImage::new(bytes, mime))
}

/// Construye el pipeline según la configuración.
pub fn build_pipeline(config: &AppConfig) -> Result<Pipeline, CoreError> {
    let engine = match config.engine.model.as_str() {
        "offline" => ToolLoopEngine::new(OfflineModelClient::new(), config.engine.tool_loop_config()),
        other => return Err(CoreError::Config(format!("unsupported model '{other}'"))),
    };
    Ok(Pipeline::new(Arc::new(engine), Arc::new(StaticTrendingTopics::new())))
}

/// Respuesta hacia el cliente: o bien los campos de éxito o bien los de error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl PostResponse {
    pub fn from_result(result: PipelineResult, image: &RawImage) -> Self {
        match result {
            Ok(post) => {
                let image_url = ImagePayload::new(image.bytes.clone(), &image.mime_type).ok()
                                                                                        .map(|p| p.to_data_uri());
                PostResponse { caption: Some(post.caption),
                               hashtags: Some(post.hashtags.into_vec()),
                               image_url,
                               ..Default::default() }
            }
            Err(e) => PostResponse { error: Some(e.to_string()),
                                     error_kind: Some(e.kind()),
                                     ..Default::default() },
        }
    }

    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Flujo completo de una subida: leer archivo, ejecutar el pipeline y mapear.
/// Sólo los fallos de IO al leer el archivo se devuelven como `Err`.
pub async fn handle_upload(pipeline: &Pipeline,
                           path: &Path,
                           platform: &str,
                           cancel: CancellationToken)
                           -> Result<PostResponse, CoreError> {
    let image = load_upload(path).await?;
    let run = pipeline.generate_traced(image.clone(), platform, cancel).await;
    if let Err(e) = &run.result {
        warn!("run {} for {} failed with {}", run.run_id, path.display(), e.kind());
    }
    Ok(PostResponse::from_result(run.result, &image).with_run_id(run.run_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use caption_core::{GeneratedPost, PipelineError};
    use caption_domain::AugmentedHashtags;

    #[test]
    fn extension_decides_mime() {
        assert_eq!(mime_from_path(Path::new("a/photo.PNG")), "image/png");
        assert_eq!(mime_from_path(Path::new("photo.jpg")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("photo.heic")), "image/heic");
        assert_eq!(mime_from_path(Path::new("scan.TIFF")), "image/tiff");
        assert_eq!(mime_from_path(Path::new("scan.tif")), "image/tiff");
        assert_eq!(mime_from_path(Path::new("photo.avif")), "image/avif");
        assert_eq!(mime_from_path(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(mime_from_path(Path::new("notes.txt")), FALLBACK_MIME);
        assert_eq!(mime_from_path(Path::new("noext")), FALLBACK_MIME);
    }

    #[test]
    fn success_response_has_no_error_fields() {
        let (hashtags, _) = AugmentedHashtags::enforce(["#sunset"]);
        let image = RawImage::new(b"X".to_vec(), "image/png");
        let resp = PostResponse::from_result(Ok(GeneratedPost { caption: "Sunset vibes".into(),
                                                                hashtags }),
                                             &image);
        assert!(resp.is_success());
        assert_eq!(resp.image_url.as_deref(), Some("data:image/png;base64,WA=="));
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v, serde_json::json!({"caption": "Sunset vibes", "hashtags": ["#sunset"], "imageUrl": "data:image/png;base64,WA=="}));
    }

    #[test]
    fn error_response_has_no_success_fields() {
        let image = RawImage::new(b"X".to_vec(), "image/png");
        let resp = PostResponse::from_result(Err(PipelineError::Cancelled), &image);
        assert!(!resp.is_success());
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v, serde_json::json!({"error": "invocation cancelled", "errorKind": "Cancelled"}));
    }

    #[test]
    fn unknown_model_is_a_config_error() {
        let mut cfg = AppConfig::default();
        cfg.engine.model = "gpt-imaginary".into();
        assert!(matches!(build_pipeline(&cfg), Err(CoreError::Config(_))));
        assert!(build_pipeline(&AppConfig::default()).is_ok());
    }
}
