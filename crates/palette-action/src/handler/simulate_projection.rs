//! SIMULATE_PROJECTION: project the revenue line under a percentage change.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use super::{mismatch, round_half_up, scaled_series, EffectContext, EffectHandler};
use crate::error::ActionError;
use crate::scheduler::sleep_or_cancel;
use crate::schema::ActionParams;
use crate::store::{ChartOverlay, OverlayKind, Toast};
use crate::types::IntentKind;

pub const PROJECTION_COLOR: &str = "#a855f7";

pub struct SimulateProjectionHandler;

#[async_trait]
impl EffectHandler for SimulateProjectionHandler {
    fn kind(&self) -> IntentKind {
        IntentKind::SimulateProjection
    }

    async fn execute(&self, params: ActionParams, ctx: &EffectContext) -> Result<(), ActionError> {
        let ActionParams::SimulateProjection(p) = &params else {
            return Err(mismatch(self.kind(), &params));
        };

        ctx.store.notify(Toast::info(
            "Running Simulation...",
            format!(
                "Projecting {} with {}% {} change",
                p.target, p.change_percentage, p.variable
            ),
        ));

        let p = p.clone();
        let store = ctx.store.clone();
        let delay = ctx.effects.projection_delay();
        let baseline = ctx.dataset.revenue_baseline();
        ctx.spawn(self.kind(), move |token| async move {
            if !sleep_or_cancel(&token, delay).await {
                return;
            }

            let factor = 1.0 + p.change_percentage / 100.0;
            let sign = if p.change_percentage > 0.0 { "+" } else { "" };
            let overlay = ChartOverlay {
                id: format!("projection-{}", Uuid::new_v4()),
                kind: OverlayKind::Projection,
                series: scaled_series(&baseline, factor, 0.95..1.05),
                label: format!("Projected ({}{}% {})", sign, p.change_percentage, p.variable),
                color: PROJECTION_COLOR.to_string(),
            };
            info!(id = %overlay.id, factor, "Projection overlay added");
            store.add_overlay(overlay);

            let impact = round_half_up((factor - 1.0) * 100.0);
            store.notify(Toast::success(
                "Simulation Complete",
                format!("Projection shows ~{}% {} impact", impact, p.target),
            ));
        });
        Ok(())
    }
}
