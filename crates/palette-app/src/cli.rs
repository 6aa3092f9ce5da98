//! CLI argument definitions for the palette binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Palette: turn plain-language commands into dashboard actions.
#[derive(Parser, Debug)]
#[command(name = "palette", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the classification service.
    Serve {
        /// Address to bind.
        #[arg(long)]
        host: Option<String>,
        /// Port to bind.
        #[arg(short = 'p', long)]
        port: Option<u16>,
    },
    /// Interactive console over the command pipeline (default).
    Repl {
        /// Base URL of the classification service.
        #[arg(long = "api-url")]
        api_url: Option<String>,
        /// Classify in-process instead of calling the service.
        #[arg(long)]
        offline: bool,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Repl {
            api_url: None,
            offline: false,
        }
    }
}

impl CliArgs {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > PALETTE_CONFIG env var > ~/.palette/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("PALETTE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Resolve the server port.
///
/// Priority: --port flag > PALETTE_PORT env var > config file value.
pub fn resolve_port(flag: Option<u16>, config_port: u16) -> u16 {
    if let Some(p) = flag {
        return p;
    }
    std::env::var("PALETTE_PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(config_port)
}

/// Resolve the classification service URL.
///
/// Priority: --api-url flag > PALETTE_API_URL env var > config file value.
pub fn resolve_api_url(flag: Option<&str>, config_url: &str) -> String {
    if let Some(url) = flag {
        return url.to_string();
    }
    std::env::var("PALETTE_API_URL").unwrap_or_else(|_| config_url.to_string())
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".palette").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".palette").join("config.toml");
    }
    PathBuf::from("config.toml")
}
