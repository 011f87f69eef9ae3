use serde::{Deserialize, Serialize};

/// Salida estructurada de la etapa de caption: texto listo para publicar y
/// hashtags iniciales en el orden en que los produjo el motor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionResult {
    pub caption: String,
    pub hashtags: Vec<String>,
}

impl CaptionResult {
    /// Un caption compuesto sólo de espacios no es contenido utilizable.
    pub fn has_caption(&self) -> bool {
        !self.caption.trim().is_empty()
    }
}
