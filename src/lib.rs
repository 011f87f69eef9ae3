//! CaptionFlow Rust Library
//!
//! Este crate actúa como la capa de borde de CaptionFlow:
//! - `config`: configuración inmutable leída del entorno (.env).
//! - `errors`: errores de la aplicación (IO, configuración, pipeline).
//! - `boundary`: carga de la imagen subida, construcción del pipeline y
//!   mapeo del resultado a una respuesta serializable.
//!
//! El pipeline en sí vive en `caption-core`; las implementaciones concretas
//! de motor y tendencias en `caption-adapters`.

pub mod boundary;
pub mod config;
pub mod errors;

pub use boundary::{build_pipeline, handle_upload, load_upload, PostResponse};
pub use config::AppConfig;
pub use errors::CoreError;
