use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Top-level configuration for the command palette.
///
/// Loaded from `~/.palette/config.toml` by default. Each section corresponds
/// to one component of the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub effects: EffectsConfig,
}

impl PaletteConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PaletteConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Client-side settings for reaching the classification service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Base URL; requests go to `<base_url>/command`.
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// Classify in-process with the keyword classifier instead of calling out.
    pub offline: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_ms: 30_000,
            connect_timeout_ms: 2_000,
            offline: false,
        }
    }
}

impl ClassifierConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Settings for the classification service (`palette serve`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Commands each client may issue per calendar day.
    pub daily_command_limit: u32,
    /// Prompts longer than this are rejected with 400.
    pub max_prompt_chars: usize,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            daily_command_limit: 10,
            max_prompt_chars: 2000,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:5174".to_string(),
                "http://localhost:5175".to_string(),
            ],
        }
    }
}

/// Dispatcher behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Surface missing or malformed parameters as error toasts instead of
    /// silently skipping the action.
    pub strict_parameters: bool,
    /// How long a consumed action stays visible in the store before it is cleared.
    pub action_clear_delay_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            strict_parameters: false,
            action_clear_delay_ms: 100,
        }
    }
}

impl DispatchConfig {
    pub fn action_clear_delay(&self) -> Duration {
        Duration::from_millis(self.action_clear_delay_ms)
    }
}

/// Timings and sample sizes used by the effect handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub toast_ttl_ms: u64,
    pub tag_tick_ms: u64,
    pub merge_tick_ms: u64,
    pub merge_settle_ms: u64,
    pub revoke_delay_ms: u64,
    pub projection_delay_ms: u64,
    pub scan_delay_ms: u64,
    pub webhook_delay_ms: u64,
    pub transform_delay_ms: u64,
    /// Users reported as affected by a confirmed revocation.
    pub revoked_user_count: u32,
    /// Records reported as synced by a webhook trigger.
    pub synced_record_count: u32,
    /// Duplicates reported as found by a merge.
    pub duplicate_count: u32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            toast_ttl_ms: 5_000,
            tag_tick_ms: 100,
            merge_tick_ms: 200,
            merge_settle_ms: 500,
            revoke_delay_ms: 1_000,
            projection_delay_ms: 2_000,
            scan_delay_ms: 3_000,
            webhook_delay_ms: 2_500,
            transform_delay_ms: 1_500,
            revoked_user_count: 3,
            synced_record_count: 50,
            duplicate_count: 12,
        }
    }
}

impl EffectsConfig {
    pub fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }

    pub fn tag_tick(&self) -> Duration {
        Duration::from_millis(self.tag_tick_ms)
    }

    pub fn merge_tick(&self) -> Duration {
        Duration::from_millis(self.merge_tick_ms)
    }

    pub fn merge_settle(&self) -> Duration {
        Duration::from_millis(self.merge_settle_ms)
    }

    pub fn revoke_delay(&self) -> Duration {
        Duration::from_millis(self.revoke_delay_ms)
    }

    pub fn projection_delay(&self) -> Duration {
        Duration::from_millis(self.projection_delay_ms)
    }

    pub fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.scan_delay_ms)
    }

    pub fn webhook_delay(&self) -> Duration {
        Duration::from_millis(self.webhook_delay_ms)
    }

    pub fn transform_delay(&self) -> Duration {
        Duration::from_millis(self.transform_delay_ms)
    }
}
