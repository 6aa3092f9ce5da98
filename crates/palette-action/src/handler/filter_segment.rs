//! FILTER_SEGMENT: narrow the dashboard to a segment, location or period.

use async_trait::async_trait;
use tracing::info;

use super::{mismatch, EffectContext, EffectHandler};
use crate::error::ActionError;
use crate::schema::{ActionParams, FilterSegmentParams};
use crate::store::{DashboardFilters, Toast};
use crate::types::IntentKind;

pub struct FilterSegmentHandler;

#[async_trait]
impl EffectHandler for FilterSegmentHandler {
    fn kind(&self) -> IntentKind {
        IntentKind::FilterSegment
    }

    async fn execute(&self, params: ActionParams, ctx: &EffectContext) -> Result<(), ActionError> {
        let ActionParams::FilterSegment(p) = &params else {
            return Err(mismatch(self.kind(), &params));
        };

        let patch = DashboardFilters {
            segment: p.segment.clone(),
            location: p.location.clone(),
            time_range: p.time_range.clone(),
        };
        let filters = ctx.store.merge_filters(&patch);
        info!(?filters, "Filters applied");

        ctx.store
            .notify(Toast::success("Filters Applied", filter_message(p)));
        Ok(())
    }
}

/// "Showing enterprise from Japan (last week) users".
fn filter_message(p: &FilterSegmentParams) -> String {
    let mut parts = Vec::new();
    if let Some(segment) = &p.segment {
        parts.push(segment.clone());
    }
    if let Some(location) = &p.location {
        parts.push(format!("from {}", location));
    }
    if let Some(time_range) = &p.time_range {
        parts.push(format!("({})", time_range.replace('_', " ")));
    }
    if parts.is_empty() {
        "Showing all users".to_string()
    } else {
        format!("Showing {} users", parts.join(" "))
    }
}
