//! Effect handler registry and trait definition.
//!
//! Defines the `EffectHandler` async trait, one implementation per
//! actionable intent, and the registry the dispatcher looks them up in.

pub mod bulk_tag;
pub mod compare_metrics;
pub mod data_transformation;
pub mod filter_segment;
pub mod merge_duplicates;
pub mod revoke_access;
pub mod scan_anomalies;
pub mod schedule_job;
pub mod simulate_projection;
pub mod trigger_webhook;

use std::collections::HashMap;
use std::future::Future;
use std::ops::Range;
use std::sync::Arc;

use async_trait::async_trait;
use palette_core::config::EffectsConfig;
use palette_core::Dataset;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::ActionError;
use crate::scheduler::EffectScheduler;
use crate::schema::ActionParams;
use crate::store::{ActionStore, SeriesPoint};
use crate::types::IntentKind;

/// Everything a handler may touch while applying one action.
#[derive(Clone)]
pub struct EffectContext {
    pub store: ActionStore,
    pub scheduler: EffectScheduler,
    pub dataset: Arc<Dataset>,
    pub effects: EffectsConfig,
    /// Id of the action being applied; deferred work is cancelled by it.
    pub invocation_id: Uuid,
}

impl EffectContext {
    /// Run deferred work for this invocation under a cancellation token.
    pub fn spawn<F, Fut>(&self, kind: IntentKind, effect: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.scheduler.spawn(self.invocation_id, kind, effect);
    }
}

/// Applies one intent's effects to the store.
///
/// `execute` performs the synchronous part of the effect and hands any
/// timer-driven remainder to the scheduler, so it returns promptly.
#[async_trait]
pub trait EffectHandler: Send + Sync {
    fn kind(&self) -> IntentKind;

    async fn execute(&self, params: ActionParams, ctx: &EffectContext) -> Result<(), ActionError>;
}

/// Lookup table from intent kind to handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<IntentKind, Arc<dyn EffectHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in handler.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }

    /// Register `handler` under its kind, replacing any previous one.
    pub fn register(&mut self, handler: Arc<dyn EffectHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    pub fn register_defaults(&mut self) {
        self.register(Arc::new(filter_segment::FilterSegmentHandler));
        self.register(Arc::new(compare_metrics::CompareMetricsHandler));
        self.register(Arc::new(bulk_tag::BulkTagHandler));
        self.register(Arc::new(revoke_access::RevokeAccessHandler));
        self.register(Arc::new(simulate_projection::SimulateProjectionHandler));
        self.register(Arc::new(scan_anomalies::ScanAnomaliesHandler));
        self.register(Arc::new(schedule_job::ScheduleJobHandler));
        self.register(Arc::new(trigger_webhook::TriggerWebhookHandler));
        self.register(Arc::new(data_transformation::DataTransformationHandler));
        self.register(Arc::new(merge_duplicates::MergeDuplicatesHandler));
    }

    pub fn get(&self, kind: IntentKind) -> Option<Arc<dyn EffectHandler>> {
        self.handlers.get(&kind).cloned()
    }

    pub fn contains(&self, kind: IntentKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

fn mismatch(expected: IntentKind, params: &ActionParams) -> ActionError {
    ActionError::ParameterMismatch {
        expected,
        found: params.kind(),
    }
}

/// Baseline series scaled by `factor` and a per-point random factor drawn
/// from `jitter`.
pub(crate) fn scaled_series(
    baseline: &[(String, f64)],
    factor: f64,
    jitter: Range<f64>,
) -> Vec<SeriesPoint> {
    let mut rng = rand::rng();
    baseline
        .iter()
        .map(|(date, value)| SeriesPoint {
            date: date.clone(),
            value: value * factor * rng.random_range(jitter.clone()),
        })
        .collect()
}

/// Upper-case the first character.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replace underscores with spaces and upper-case the first letter of
/// every word: `export_pdf` becomes `Export Pdf`.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        let c = if c == '_' { ' ' } else { c };
        if at_word_start && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}

/// Round to the nearest integer, halves toward positive infinity.
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
