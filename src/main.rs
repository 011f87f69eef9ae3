use captionflow::boundary::{build_pipeline, handle_upload};
use captionflow::config::AppConfig;
use captionflow::errors::CoreError;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

const USAGE: &str = "usage: captionflow <image-path> <Instagram|X|Facebook|LinkedIn>";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::from(2)
        }
    }
}

/// Devuelve `Ok(false)` cuando el pipeline respondió con error (la respuesta
/// ya se imprimió); `Err` para fallos de configuración, uso o IO.
async fn run() -> Result<bool, CoreError> {
    // Cargar variables de entorno desde .env si existe (antes de inicializar el logger)
    let config = AppConfig::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter.as_str())).init();

    let mut args = std::env::args().skip(1);
    let (path, platform) = match (args.next(), args.next()) {
        (Some(path), Some(platform)) => (PathBuf::from(path), platform),
        _ => return Err(CoreError::Config(USAGE.to_string())),
    };

    let pipeline = build_pipeline(&config)?;
    info!("engine={} timeout={:?} max_tool_rounds={}",
          pipeline.engine_name(),
          config.engine.request_timeout,
          config.engine.max_tool_rounds);

    // Ctrl-C cancela la invocación en curso
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let response = handle_upload(&pipeline, &path, &platform, cancel).await?;
    let rendered = serde_json::to_string_pretty(&response)?;
    println!("{rendered}");
    Ok(response.is_success())
}
