//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use palette_action::{Classifier, KeywordClassifier};
use palette_core::config::ServerConfig;

use crate::rate_limit::DailyRateLimiter;

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub classifier: Arc<dyn Classifier>,
    pub limiter: DailyRateLimiter,
    /// Server start time for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    /// State backed by the keyword classifier.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_classifier(config, Arc::new(KeywordClassifier::new()))
    }

    pub fn with_classifier(config: ServerConfig, classifier: Arc<dyn Classifier>) -> Self {
        let limiter = DailyRateLimiter::new(config.daily_command_limit);
        Self {
            config: Arc::new(config),
            classifier,
            limiter,
            start_time: Instant::now(),
        }
    }
}
