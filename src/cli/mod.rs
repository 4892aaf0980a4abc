//! Command-line interface parsing and startup
//!
//! Parses arguments, loads configuration, checks that the local model runtime
//! is reachable, and only then hands control to the interactive chat loop.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::api::ollama::OllamaRuntime;
use crate::core::config::Config;
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "causette")]
#[command(about = "A terminal chat interface backed by a local model runtime")]
#[command(
    long_about = "Causette is a full-screen terminal chat interface that talks to a model served \
by a local Ollama-compatible runtime. The model is pulled on first connect, with \
download progress shown in the status bar, and replies are revealed with a typing \
effect.\n\n\
Requirements:\n\
  A local model runtime (e.g. Ollama) listening on the configured base URL.\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Up/Down/Mouse     Scroll through chat history\n\
  F2                Toggle the calendar panel\n\
  F3 / F4           Previous / next calendar month\n\
  Ctrl+R            Reconnect after a failed model load\n\
  Ctrl+C            Quit the application\n\n\
Environment Variables:\n\
  CAUSETTE_DEBUG_LOG  Write tracing output (filtered by RUST_LOG) to this file"
)]
pub struct Args {
    /// Model to pull and chat with
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Base URL of the local model runtime
    #[arg(short = 'u', long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, value_name = "FILE")]
    pub log: Option<String>,

    /// Use an alternate configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Start with the calendar panel hidden
    #[arg(long)]
    pub no_calendar: bool,
}

/// Tracing goes to a file, never to the terminal the UI owns.
fn init_tracing() {
    let Ok(path) = std::env::var("CAUSETTE_DEBUG_LOG") else {
        return;
    };
    let Ok(file) = std::fs::File::create(&path) else {
        eprintln!("warning: could not open debug log file: {path}");
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

/// Merge CLI flags over the loaded configuration.
fn resolve_config(args: &Args) -> Result<Config, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if args.no_calendar {
        config.show_calendar = false;
    }
    Ok(config)
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing();

    let config = resolve_config(&args)?;

    // The original replaced the whole page with a static notice when the
    // browser lacked the compute capability; the probe plays that role here.
    // No session is ever constructed past a failed probe.
    let runtime = OllamaRuntime::new(config.base_url.clone());
    match runtime.probe_version().await {
        Ok(version) => {
            tracing::debug!(%version, "model runtime reachable");
        }
        Err(err) => {
            eprintln!("⚠️  Environnement non compatible");
            eprintln!();
            eprintln!(
                "Aucun serveur de modèles ne répond sur {}.",
                config.base_url
            );
            eprintln!(
                "Démarrez un serveur compatible Ollama (`ollama serve`), puis relancez causette."
            );
            tracing::debug!(%err, "runtime probe failed");
            std::process::exit(1);
        }
    }

    run_chat(config, args.log).await
}
