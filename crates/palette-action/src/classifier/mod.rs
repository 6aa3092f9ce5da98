//! Prompt classification.
//!
//! A [`Classifier`] turns free text into a [`CommandResponse`]. Two
//! implementations: [`HttpClassifier`] calls the classification service,
//! [`KeywordClassifier`] matches keywords in-process and backs the
//! service itself as well as the offline console.

pub mod http;
pub mod keyword;

use async_trait::async_trait;

use crate::error::ClassifyError;
use crate::types::CommandResponse;

pub use http::HttpClassifier;
pub use keyword::KeywordClassifier;

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify one prompt. Called once per accepted submission, never retried.
    async fn classify(&self, prompt: &str) -> Result<CommandResponse, ClassifyError>;
}
