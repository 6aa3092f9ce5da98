//! COMPARE_METRICS: overlay a comparison series on the revenue chart.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use super::{mismatch, scaled_series, EffectContext, EffectHandler};
use crate::error::ActionError;
use crate::schema::ActionParams;
use crate::store::{ChartOverlay, OverlayKind, Toast};
use crate::types::IntentKind;

pub const COMPARISON_COLOR: &str = "#f59e0b";

pub struct CompareMetricsHandler;

#[async_trait]
impl EffectHandler for CompareMetricsHandler {
    fn kind(&self) -> IntentKind {
        IntentKind::CompareMetrics
    }

    async fn execute(&self, params: ActionParams, ctx: &EffectContext) -> Result<(), ActionError> {
        let ActionParams::CompareMetrics(p) = &params else {
            return Err(mismatch(self.kind(), &params));
        };

        let overlay = ChartOverlay {
            id: format!("comparison-{}", Uuid::new_v4()),
            kind: OverlayKind::Comparison,
            series: scaled_series(&ctx.dataset.revenue_baseline(), 1.0, 0.85..1.0),
            label: format!("{} ({})", p.metric, p.period_b),
            color: COMPARISON_COLOR.to_string(),
        };
        info!(id = %overlay.id, metric = %p.metric, "Comparison overlay added");
        ctx.store.add_overlay(overlay);

        ctx.store.notify(Toast::info(
            "Comparison Added",
            format!("Comparing {}: {} vs {}", p.metric, p.period_a, p.period_b),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::context;
    use crate::schema::CompareMetricsParams;
    use crate::store::Severity;

    fn params() -> ActionParams {
        ActionParams::CompareMetrics(CompareMetricsParams {
            metric: "churn".to_string(),
            period_a: "current_month".to_string(),
            period_b: "2023-11".to_string(),
        })
    }

    #[tokio::test]
    async fn test_adds_comparison_overlay() {
        let ctx = context();
        CompareMetricsHandler.execute(params(), &ctx).await.unwrap();

        let snap = ctx.store.snapshot();
        assert_eq!(snap.overlays.len(), 1);
        let overlay = snap.overlays.iter().next().unwrap();
        assert!(overlay.id.starts_with("comparison-"));
        assert_eq!(overlay.kind, OverlayKind::Comparison);
        assert_eq!(overlay.label, "churn (2023-11)");
        assert_eq!(overlay.color, COMPARISON_COLOR);

        let baseline = ctx.dataset.revenue_baseline();
        assert_eq!(overlay.series.len(), baseline.len());
        for (point, (_, value)) in overlay.series.iter().zip(&baseline) {
            assert!(point.value >= value * 0.85 && point.value < *value);
        }

        let toast = snap.toasts.last().unwrap();
        assert_eq!(toast.severity, Severity::Info);
        assert_eq!(toast.title, "Comparison Added");
        assert_eq!(
            toast.message.as_deref(),
            Some("Comparing churn: current_month vs 2023-11")
        );
    }

    #[tokio::test]
    async fn test_each_comparison_gets_its_own_overlay() {
        let ctx = context();
        CompareMetricsHandler.execute(params(), &ctx).await.unwrap();
        CompareMetricsHandler.execute(params(), &ctx).await.unwrap();

        let snap = ctx.store.snapshot();
        let ids: Vec<&str> = snap.overlays.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }
}
