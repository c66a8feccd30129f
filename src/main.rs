//! Quiz Service
//!
//! Creates quizzes, serves their questions and scores submissions. Question
//! selection, content and scoring are delegated to the remote question
//! service; quiz records are kept locally.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────┐
//!                      │                  QUIZ SERVICE                  │
//!                      │                                                │
//!   Client Request     │  ┌─────────┐    ┌──────────────┐               │
//!   ───────────────────┼─▶│  http   │───▶│     quiz     │               │
//!                      │  │ server  │    │ orchestrator │               │
//!                      │  └─────────┘    └──┬────────┬──┘               │
//!                      │                    │        │                  │
//!                      │                    ▼        ▼                  │
//!                      │          ┌────────────┐  ┌────────────┐        │
//!                      │          │   store    │  │ resilience │        │
//!                      │          │ (in-memory)│  │retry/cb/to │        │
//!                      │          └────────────┘  └─────┬──────┘        │
//!                      │                                │               │
//!                      │                                ▼               │
//!                      │                         ┌────────────┐         │   Question
//!                      │                         │  provider  │─────────┼─▶ Service
//!                      │                         │   client   │         │
//!                      │                         └────────────┘         │
//!                      └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use quiz_service::config::{load_config, validation::validate_config, ConfigError, ServiceConfig};
use quiz_service::lifecycle::{signals, startup, Shutdown};
use quiz_service::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "quiz-service")]
#[command(about = "Quiz service backed by a remote question service", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    startup::init_observability(&config)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = ?args.config,
        "quiz-service starting"
    );

    tracing::info!(
        bind_address = %config.listener.bind_address,
        question_service = %config.question_service.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let server = HttpServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
