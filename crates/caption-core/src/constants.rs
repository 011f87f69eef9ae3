//! Constantes del pipeline.
//!
//! `PIPELINE_VERSION` entra en el cálculo de fingerprints: cambiarla invalida
//! deterministamente los fingerprints previos aunque entradas y salidas no
//! cambien. Mantener estable mientras no haya cambios incompatibles en las
//! etapas o en la política de merge.

/// Versión lógica del pipeline de dos etapas.
pub const PIPELINE_VERSION: &str = "CF1.0";

/// Nombre del tool que el motor puede invocar durante el aumento de hashtags.
pub const TRENDING_TOOL_NAME: &str = "getTrendingTopics";
