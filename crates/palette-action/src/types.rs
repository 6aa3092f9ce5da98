//! Core types and value objects for the command pipeline.
//!
//! Defines the closed set of intents, the classification wire format and
//! the resolved action that flows from intake to the dispatcher.

use palette_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Raw parameter object attached to a classification result.
pub type RawParams = Map<String, Value>;

// =============================================================================
// Enums
// =============================================================================

/// Intent kinds the classifier can resolve a prompt to.
///
/// Any wire string outside this set decodes as [`IntentKind::Unknown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    FilterSegment,
    CompareMetrics,
    BulkTag,
    RevokeAccess,
    SimulateProjection,
    ScanAnomalies,
    ScheduleJob,
    TriggerWebhook,
    DataTransformation,
    MergeDuplicates,
    #[default]
    #[serde(other)]
    Unknown,
}

impl IntentKind {
    /// Every kind that maps to an effect handler.
    pub const ACTIONABLE: [IntentKind; 10] = [
        IntentKind::FilterSegment,
        IntentKind::CompareMetrics,
        IntentKind::BulkTag,
        IntentKind::RevokeAccess,
        IntentKind::SimulateProjection,
        IntentKind::ScanAnomalies,
        IntentKind::ScheduleJob,
        IntentKind::TriggerWebhook,
        IntentKind::DataTransformation,
        IntentKind::MergeDuplicates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::FilterSegment => "FILTER_SEGMENT",
            IntentKind::CompareMetrics => "COMPARE_METRICS",
            IntentKind::BulkTag => "BULK_TAG",
            IntentKind::RevokeAccess => "REVOKE_ACCESS",
            IntentKind::SimulateProjection => "SIMULATE_PROJECTION",
            IntentKind::ScanAnomalies => "SCAN_ANOMALIES",
            IntentKind::ScheduleJob => "SCHEDULE_JOB",
            IntentKind::TriggerWebhook => "TRIGGER_WEBHOOK",
            IntentKind::DataTransformation => "DATA_TRANSFORMATION",
            IntentKind::MergeDuplicates => "MERGE_DUPLICATES",
            IntentKind::Unknown => "UNKNOWN",
        }
    }

    /// Whether a handler for this kind needs a parameter object to act.
    ///
    /// A scan runs with or without parameters; every other actionable kind
    /// is skipped when the object is absent.
    pub fn requires_parameters(&self) -> bool {
        !matches!(self, IntentKind::ScanAnomalies | IntentKind::Unknown)
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IntentKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentKind::ACTIONABLE
            .into_iter()
            .chain(std::iter::once(IntentKind::Unknown))
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown intent kind: {}", s))
    }
}

/// Long-running effects that may only have one instance in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSlot {
    Tagging,
    Merge,
    Scan,
    Transform,
}

impl EffectSlot {
    /// Human name of the operation, used in "already running" notices.
    pub fn label(&self) -> &'static str {
        match self {
            EffectSlot::Tagging => "Tagging",
            EffectSlot::Merge => "Merge",
            EffectSlot::Scan => "Scan",
            EffectSlot::Transform => "Transformation",
        }
    }
}

impl fmt::Display for EffectSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Wire format
// =============================================================================

/// Daily usage reported by the classification service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitUsage {
    pub remaining: u32,
    pub used: u32,
    pub limit: u32,
}

/// Body of a `POST /command` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub action: IntentKind,
    #[serde(default)]
    pub params: Option<RawParams>,
    #[serde(default)]
    pub rate_limit: Option<RateLimitUsage>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CommandResponse {
    pub fn new(action: IntentKind, params: Option<RawParams>) -> Self {
        Self {
            action,
            params,
            rate_limit: None,
            error: None,
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Body of a `POST /command` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub prompt: String,
}

// =============================================================================
// Domain Structs
// =============================================================================

/// A classified command waiting to be dispatched.
///
/// Immutable once published; the dispatcher consumes it at most once,
/// identified by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAction {
    pub id: Uuid,
    pub kind: IntentKind,
    pub parameters: Option<RawParams>,
    pub raw_error: Option<String>,
    pub rate_limit: Option<RateLimitUsage>,
    pub received_at: Timestamp,
}

impl ResolvedAction {
    pub fn new(kind: IntentKind, parameters: Option<RawParams>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            parameters,
            raw_error: None,
            rate_limit: None,
            received_at: Timestamp::now(),
        }
    }

    pub fn from_response(response: CommandResponse) -> Self {
        Self {
            raw_error: response.error,
            rate_limit: response.rate_limit,
            ..Self::new(response.action, response.params)
        }
    }
}
