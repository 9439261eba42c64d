use anyhow::{Context, Result};
use clap::Parser;
use loqa_pronounce::{
    create_router, AppState, AudioBackendFactory, AudioCapture, Config, PronunciationScorer,
    SpeechTranscriptionClient,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "loqa-pronounce", version, about = "Pronunciation assessment service")]
struct Args {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/loqa-pronounce")]
    config: String,

    /// Override service.http.bind
    #[arg(long)]
    bind: Option<String>,

    /// Override service.http.port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let backend = AudioBackendFactory::create(cfg.audio.source.clone(), cfg.audio.backend_config())
        .context("Failed to create audio backend (set audio.source or enable the `microphone` feature)")?;
    let capture = AudioCapture::new(backend, cfg.audio.capture_config());

    let transcriber = match SpeechTranscriptionClient::from_config(&cfg.speech) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Speech recognition disabled: {:#}", e);
            None
        }
    };

    if cfg.scoring.seed.is_some() {
        info!("Scoring with a fixed seed");
    }
    let scorer = PronunciationScorer::from_config(cfg.scoring.clone());

    let state = AppState::new(capture, transcriber, scorer, cfg.audio.min_duration_ms);
    let app = create_router(state);

    let bind = args.bind.unwrap_or(cfg.service.http.bind);
    let port = args.port.unwrap_or(cfg.service.http.port);
    let addr = format!("{}:{}", bind, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
