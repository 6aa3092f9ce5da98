//! HTTP client for the classification service.

use async_trait::async_trait;
use palette_core::config::ClassifierConfig;
use palette_core::{PaletteError, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::Classifier;
use crate::error::ClassifyError;
use crate::types::{CommandRequest, CommandResponse, RateLimitUsage};

/// Body of a 429 response. Newer servers send `rate_limit`; older ones only
/// carry the cap under `detail.limit`.
#[derive(Debug, Default, Deserialize)]
struct LimitExceededBody {
    #[serde(default)]
    rate_limit: Option<RateLimitUsage>,
    #[serde(default)]
    detail: Option<LimitDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct LimitDetail {
    #[serde(default)]
    limit: Option<u32>,
}

impl LimitExceededBody {
    fn usage(self) -> Option<RateLimitUsage> {
        self.rate_limit.or_else(|| {
            let limit = self.detail?.limit?;
            Some(RateLimitUsage {
                remaining: 0,
                used: limit,
                limit,
            })
        })
    }
}

/// Posts prompts to `<base_url>/command`.
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| PaletteError::Classification(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: format!("{}/command", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, prompt: &str) -> std::result::Result<CommandResponse, ClassifyError> {
        let request = CommandRequest {
            prompt: prompt.to_string(),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "Classification request failed");
                ClassifyError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        debug!(%status, "Classification response");

        if status == StatusCode::TOO_MANY_REQUESTS {
            let body: LimitExceededBody = response.json().await.unwrap_or_default();
            return Err(ClassifyError::RateLimited(body.usage()));
        }
        if !status.is_success() {
            warn!(%status, "Classification service returned an error");
            return Err(ClassifyError::Unavailable(format!("unexpected status {}", status)));
        }

        response
            .json::<CommandResponse>()
            .await
            .map_err(|e| ClassifyError::Unavailable(format!("undecodable response: {}", e)))
    }
}
