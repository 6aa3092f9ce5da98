//! Typed parameter records, one per intent.
//!
//! The classifier hands back a loose JSON object. [`ActionParams::parse`]
//! validates it against the shape each intent expects so handlers work
//! with plain fields instead of casting values at use.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;
use crate::types::{IntentKind, RawParams};

// =============================================================================
// Per-intent records
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSegmentParams {
    #[serde(default, deserialize_with = "opt_text")]
    pub segment: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub time_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareMetricsParams {
    #[serde(deserialize_with = "text")]
    pub metric: String,
    #[serde(deserialize_with = "text")]
    pub period_a: String,
    #[serde(deserialize_with = "text")]
    pub period_b: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkTagParams {
    #[serde(default, deserialize_with = "opt_text")]
    pub criteria: Option<String>,
    #[serde(deserialize_with = "text")]
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevokeAccessParams {
    #[serde(deserialize_with = "text")]
    pub role: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateProjectionParams {
    #[serde(deserialize_with = "text")]
    pub target: String,
    #[serde(deserialize_with = "percentage")]
    pub change_percentage: f64,
    #[serde(deserialize_with = "text")]
    pub variable: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanAnomaliesParams {
    #[serde(default, rename = "type", deserialize_with = "opt_text")]
    pub scan_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleJobParams {
    #[serde(deserialize_with = "text")]
    pub job_type: String,
    #[serde(deserialize_with = "text")]
    pub recurrence: String,
    #[serde(deserialize_with = "text")]
    pub time: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub day: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerWebhookParams {
    #[serde(deserialize_with = "text")]
    pub destination: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub data_scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTransformationParams {
    #[serde(deserialize_with = "text")]
    pub field: String,
    #[serde(deserialize_with = "text")]
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeDuplicatesParams {
    #[serde(deserialize_with = "text")]
    pub match_key: String,
}

// =============================================================================
// Tagged union
// =============================================================================

/// Validated parameters for one actionable intent.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionParams {
    FilterSegment(FilterSegmentParams),
    CompareMetrics(CompareMetricsParams),
    BulkTag(BulkTagParams),
    RevokeAccess(RevokeAccessParams),
    SimulateProjection(SimulateProjectionParams),
    ScanAnomalies(ScanAnomaliesParams),
    ScheduleJob(ScheduleJobParams),
    TriggerWebhook(TriggerWebhookParams),
    DataTransformation(DataTransformationParams),
    MergeDuplicates(MergeDuplicatesParams),
}

impl ActionParams {
    /// Decode `raw` into the record `kind` expects.
    ///
    /// An absent object is [`SchemaError::MissingParameters`] unless the
    /// intent can run without one. A present object with missing or
    /// mistyped fields is [`SchemaError::InvalidParameterValue`].
    pub fn parse(kind: IntentKind, raw: Option<&RawParams>) -> Result<Self, SchemaError> {
        let empty = RawParams::new();
        let raw = match raw {
            Some(raw) => raw,
            None if kind.requires_parameters() => {
                return Err(SchemaError::MissingParameters(kind));
            }
            None => &empty,
        };

        match kind {
            IntentKind::FilterSegment => decode(kind, raw).map(ActionParams::FilterSegment),
            IntentKind::CompareMetrics => decode(kind, raw).map(ActionParams::CompareMetrics),
            IntentKind::BulkTag => decode(kind, raw).map(ActionParams::BulkTag),
            IntentKind::RevokeAccess => decode(kind, raw).map(ActionParams::RevokeAccess),
            IntentKind::SimulateProjection => {
                decode(kind, raw).map(ActionParams::SimulateProjection)
            }
            IntentKind::ScanAnomalies => decode(kind, raw).map(ActionParams::ScanAnomalies),
            IntentKind::ScheduleJob => decode(kind, raw).map(ActionParams::ScheduleJob),
            IntentKind::TriggerWebhook => decode(kind, raw).map(ActionParams::TriggerWebhook),
            IntentKind::DataTransformation => {
                decode(kind, raw).map(ActionParams::DataTransformation)
            }
            IntentKind::MergeDuplicates => decode(kind, raw).map(ActionParams::MergeDuplicates),
            IntentKind::Unknown => Err(SchemaError::InvalidParameterValue {
                kind,
                reason: "UNKNOWN carries no parameters".to_string(),
            }),
        }
    }

    pub fn kind(&self) -> IntentKind {
        match self {
            ActionParams::FilterSegment(_) => IntentKind::FilterSegment,
            ActionParams::CompareMetrics(_) => IntentKind::CompareMetrics,
            ActionParams::BulkTag(_) => IntentKind::BulkTag,
            ActionParams::RevokeAccess(_) => IntentKind::RevokeAccess,
            ActionParams::SimulateProjection(_) => IntentKind::SimulateProjection,
            ActionParams::ScanAnomalies(_) => IntentKind::ScanAnomalies,
            ActionParams::ScheduleJob(_) => IntentKind::ScheduleJob,
            ActionParams::TriggerWebhook(_) => IntentKind::TriggerWebhook,
            ActionParams::DataTransformation(_) => IntentKind::DataTransformation,
            ActionParams::MergeDuplicates(_) => IntentKind::MergeDuplicates,
        }
    }

    /// One-line description shown in the "applied" feedback strip.
    pub fn describe(&self) -> String {
        match self {
            ActionParams::FilterSegment(p) => {
                let what = p
                    .segment
                    .as_deref()
                    .or(p.location.as_deref())
                    .unwrap_or("criteria");
                format!("Filtered by \"{}\"", what)
            }
            ActionParams::CompareMetrics(p) => {
                format!("Comparing {}: {} vs {}", p.metric, p.period_a, p.period_b)
            }
            ActionParams::BulkTag(p) => format!(
                "Tagged {} as \"{}\"",
                p.criteria.as_deref().unwrap_or("records"),
                p.tag
            ),
            ActionParams::RevokeAccess(_) => fallback_description(IntentKind::RevokeAccess),
            ActionParams::SimulateProjection(p) => format!(
                "Projected {}% {} change",
                p.change_percentage, p.variable
            ),
            ActionParams::ScanAnomalies(_) => "Scanned for security anomalies".to_string(),
            ActionParams::ScheduleJob(p) => format!("Scheduled {} job", p.job_type),
            ActionParams::TriggerWebhook(p) => format!("Synced data to {}", p.destination),
            ActionParams::DataTransformation(p) => {
                format!("Transformed {} to {}", p.field, p.format)
            }
            ActionParams::MergeDuplicates(p) => format!("Merged duplicates by {}", p.match_key),
        }
    }
}

/// Description for an action whose parameters could not be decoded.
pub fn fallback_description(kind: IntentKind) -> String {
    kind.as_str().replacen('_', " ", 1).to_lowercase()
}

fn decode<T: serde::de::DeserializeOwned>(kind: IntentKind, raw: &RawParams) -> Result<T, SchemaError> {
    serde_json::from_value(Value::Object(raw.clone())).map_err(|e| {
        SchemaError::InvalidParameterValue {
            kind,
            reason: e.to_string(),
        }
    })
}

// =============================================================================
// Lenient field decoders
// =============================================================================

/// Scalar rendered as text. Classifiers sometimes emit `9` for `"9"`.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match scalar_text(value) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        Some(_) => Err(de::Error::custom("expected a non-empty string")),
        None => Err(de::Error::custom("expected a string")),
    }
}

/// Optional text; `null` and blank strings read as absent.
fn opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match scalar_text(v) {
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => Ok(Some(s)),
            None => Err(de::Error::custom("expected a string")),
        },
    }
}

/// A number, or a numeric string with an optional trailing `%`.
fn percentage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(de::Error::custom(format!(
            "change_percentage is not a number: {}",
            value
        ))),
    }
}
