//! Keyword classifier.
//!
//! Checks keyword groups in a fixed order, case-insensitively, and the
//! first group with a hit decides the intent. Parameters are filled from
//! a few recognised words and fixed defaults otherwise.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};

use super::Classifier;
use crate::error::ClassifyError;
use crate::types::{CommandResponse, IntentKind, RawParams};

static PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*%").unwrap());

const LOCATIONS: [&str; 7] = ["japan", "usa", "europe", "asia", "germany", "france", "uk"];

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify synchronously.
    pub fn parse(&self, prompt: &str) -> CommandResponse {
        let text = prompt.to_lowercase();
        let has_any = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

        let (kind, params) = if has_any(&["show me", "filter", "display", "users from"]) {
            (IntentKind::FilterSegment, filter_params(&text))
        } else if has_any(&["compare", "vs", "versus"]) {
            let metric = if text.contains("churn") {
                "churn"
            } else if text.contains("growth") {
                "growth"
            } else {
                "revenue"
            };
            (
                IntentKind::CompareMetrics,
                json!({"metric": metric, "period_a": "current_month", "period_b": "2023-11"}),
            )
        } else if has_any(&["tag", "label", "mark as"]) {
            let tag = if text.contains("vip") { "VIP" } else { "tagged" };
            (
                IntentKind::BulkTag,
                json!({"criteria": "spend > 5000", "tag": tag}),
            )
        } else if has_any(&["revoke", "remove access", "disable"]) {
            (
                IntentKind::RevokeAccess,
                json!({"role": "admin", "condition": "last_login > 30days"}),
            )
        } else if has_any(&["simulate", "what if", "what happens", "projection", "forecast"]) {
            let change = PERCENT
                .captures(&text)
                .and_then(|caps| caps[1].parse::<u32>().ok())
                .unwrap_or(20);
            (
                IntentKind::SimulateProjection,
                json!({"variable": "price", "change_percentage": change, "target": "revenue"}),
            )
        } else if has_any(&["scan", "detect", "suspicious", "anomal", "security"]) {
            (IntentKind::ScanAnomalies, json!({"type": "login_logs"}))
        } else if has_any(&["schedule", "email me", "send me", "every monday", "weekly"]) {
            (
                IntentKind::ScheduleJob,
                json!({"job_type": "export_pdf", "recurrence": "weekly", "day": "monday", "time": "09:00"}),
            )
        } else if has_any(&["sync", "hubspot", "salesforce", "webhook", "integration"]) {
            let destination = if text.contains("salesforce") {
                "salesforce"
            } else {
                "hubspot"
            };
            (
                IntentKind::TriggerWebhook,
                json!({"destination": destination, "data_scope": "current_view"}),
            )
        } else if has_any(&["fix", "format", "normalize", "phone", "e.164"]) {
            (
                IntentKind::DataTransformation,
                json!({"field": "phone_number", "format": "E.164"}),
            )
        } else if has_any(&["merge", "duplicate", "dedupe", "dedup"]) {
            (IntentKind::MergeDuplicates, json!({"match_key": "email"}))
        } else {
            return CommandResponse::unknown();
        };

        CommandResponse::new(kind, into_params(params))
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(&self, prompt: &str) -> Result<CommandResponse, ClassifyError> {
        Ok(self.parse(prompt))
    }
}

fn filter_params(text: &str) -> Value {
    let segment = if text.contains("enterprise") {
        "enterprise"
    } else {
        "all"
    };
    let location = LOCATIONS
        .iter()
        .find(|loc| text.contains(*loc))
        .map(|loc| capitalize_ascii(loc));
    let time_range = if text.contains("last week") {
        Some("last_week")
    } else if text.contains("this month") {
        Some("current_month")
    } else if text.contains("today") {
        Some("today")
    } else {
        None
    };
    json!({"segment": segment, "location": location, "time_range": time_range})
}

fn capitalize_ascii(s: &str) -> String {
    let mut out = s.to_string();
    if let Some(first) = out.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    out
}

fn into_params(value: Value) -> Option<RawParams> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
