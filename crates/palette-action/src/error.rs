//! Error types for the command pipeline.

use crate::types::{EffectSlot, IntentKind, RateLimitUsage};

/// Errors from a classification call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    /// Transport failure, unexpected status or undecodable body.
    #[error("Classification service unavailable: {0}")]
    Unavailable(String),
    #[error("Daily command limit reached")]
    RateLimited(Option<RateLimitUsage>),
}

/// Errors from decoding a raw parameter object into a typed record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("{0} requires parameters")]
    MissingParameters(IntentKind),
    #[error("Invalid parameters for {kind}: {reason}")]
    InvalidParameterValue { kind: IntentKind, reason: String },
}

/// Errors from dispatching an action to its effect handler.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("No handler registered for {0}")]
    UnregisteredHandler(IntentKind),
    #[error("Handler for {expected} received parameters for {found}")]
    ParameterMismatch {
        expected: IntentKind,
        found: IntentKind,
    },
    #[error("{0} already running")]
    Busy(EffectSlot),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
