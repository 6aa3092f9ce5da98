//! Palette binary - composition root.
//!
//! Ties the palette crates into a single executable:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Either serve the classification API (`serve`) or run the
//!    interactive console over the command pipeline (`repl`, default)

mod cli;
mod console;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use palette_action::{Classifier, CommandPipeline, HttpClassifier, KeywordClassifier};
use palette_api::{start_server, AppState};
use palette_core::PaletteConfig;

use cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts so its log level can apply.
    let config_file = args.resolve_config_path();
    let loaded = PaletteConfig::load(&config_file);
    let config_level = match &loaded {
        Ok(config) => config.general.log_level.clone(),
        Err(_) => PaletteConfig::default().general.log_level,
    };
    let level = args.resolve_log_level(&config_level);

    // Tracing. RUST_LOG wins over every other source.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .init();

    tracing::info!("Starting Palette v{}", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %config_file.display(),
                error = %e,
                "Config not loaded, using defaults"
            );
            PaletteConfig::default()
        }
    };

    match args.command() {
        Command::Serve { host, port } => {
            let mut server = config.server.clone();
            if let Some(host) = host {
                server.host = host;
            }
            server.port = cli::resolve_port(port, server.port);

            let state = AppState::new(server.clone());
            start_server(&server, state).await?;
        }
        Command::Repl { api_url, offline } => {
            let classifier: Arc<dyn Classifier> = if offline || config.classifier.offline {
                tracing::info!("Classifying offline with keyword rules");
                Arc::new(KeywordClassifier::new())
            } else {
                let mut settings = config.classifier.clone();
                settings.base_url = cli::resolve_api_url(api_url.as_deref(), &settings.base_url);
                let http = HttpClassifier::new(&settings)?;
                tracing::info!(endpoint = %http.endpoint(), "Classifying via service");
                Arc::new(http)
            };

            let pipeline = CommandPipeline::start(&config, classifier);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let result = console::run(&pipeline, stdin).await;
            pipeline.shutdown().await;
            result?;
        }
    }

    tracing::info!("Palette stopped");
    Ok(())
}
