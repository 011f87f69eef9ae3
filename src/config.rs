//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`AppConfig`) que se pasa a los constructores; el pipeline nunca lee el
//! entorno por su cuenta.
use caption_adapters::ToolLoopConfig;
use std::env;
use std::time::Duration;

use crate::errors::CoreError;

pub const MODEL_VAR: &str = "CAPTIONFLOW_MODEL";
pub const REQUEST_TIMEOUT_VAR: &str = "CAPTIONFLOW_REQUEST_TIMEOUT_MS";
pub const MAX_TOOL_ROUNDS_VAR: &str = "CAPTIONFLOW_MAX_TOOL_ROUNDS";
pub const LOG_VAR: &str = "CAPTIONFLOW_LOG";

/// Configuración de la aplicación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub engine: EngineSettings,
    /// Filtro por defecto de `env_logger` cuando `RUST_LOG` no está definido.
    pub log_filter: String,
}

/// Parámetros del motor de generación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Cliente de modelo a usar (`offline` es el único incluido).
    pub model: String,
    pub request_timeout: Duration,
    pub max_tool_rounds: usize,
}

impl EngineSettings {
    pub fn tool_loop_config(&self) -> ToolLoopConfig {
        ToolLoopConfig { request_timeout: self.request_timeout,
                         max_tool_rounds: self.max_tool_rounds }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let loop_defaults = ToolLoopConfig::default();
        AppConfig { engine: EngineSettings { model: "offline".to_string(),
                                             request_timeout: loop_defaults.request_timeout,
                                             max_tool_rounds: loop_defaults.max_tool_rounds },
                    log_filter: "info".to_string() }
    }
}

impl AppConfig {
    /// Carga `.env` (si existe) y lee la configuración del entorno.
    pub fn from_env() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda. Las
    /// claves ausentes o en blanco toman el valor por defecto.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
        where F: Fn(&str) -> Option<String>
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = AppConfig::default();

        let model = get(MODEL_VAR).unwrap_or(defaults.engine.model);
        let request_timeout = match get(REQUEST_TIMEOUT_VAR) {
            Some(raw) => Duration::from_millis(parse_positive(REQUEST_TIMEOUT_VAR, &raw)?),
            None => defaults.engine.request_timeout,
        };
        let max_tool_rounds = match get(MAX_TOOL_ROUNDS_VAR) {
            Some(raw) => raw.parse::<usize>()
                            .map_err(|_| CoreError::Config(format!("{MAX_TOOL_ROUNDS_VAR} must be a non-negative integer, got '{raw}'")))?,
            None => defaults.engine.max_tool_rounds,
        };
        let log_filter = get(LOG_VAR).unwrap_or(defaults.log_filter);

        Ok(AppConfig { engine: EngineSettings { model,
                                                request_timeout,
                                                max_tool_rounds },
                       log_filter })
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64, CoreError> {
    match raw.parse::<u64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(CoreError::Config(format!("{key} must be a positive integer, got '{raw}'"))),
    }
}
