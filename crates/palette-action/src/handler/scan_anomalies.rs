//! SCAN_ANOMALIES: simulated security scan with fixed findings.

use async_trait::async_trait;
use tracing::{debug, info};

use super::{mismatch, EffectContext, EffectHandler};
use crate::error::ActionError;
use crate::scheduler::sleep_or_cancel;
use crate::schema::ActionParams;
use crate::store::{FindingSeverity, ScanFinding, Toast};
use crate::types::{EffectSlot, IntentKind};

pub struct ScanAnomaliesHandler;

#[async_trait]
impl EffectHandler for ScanAnomaliesHandler {
    fn kind(&self) -> IntentKind {
        IntentKind::ScanAnomalies
    }

    async fn execute(&self, params: ActionParams, ctx: &EffectContext) -> Result<(), ActionError> {
        let ActionParams::ScanAnomalies(p) = &params else {
            return Err(mismatch(self.kind(), &params));
        };
        if !ctx.store.begin_scan() {
            return Err(ActionError::Busy(EffectSlot::Scan));
        }
        info!(scan_type = ?p.scan_type, "Security scan started");

        let store = ctx.store.clone();
        let delay = ctx.effects.scan_delay();
        ctx.spawn(self.kind(), move |token| async move {
            if !sleep_or_cancel(&token, delay).await {
                debug!("Security scan cancelled");
                store.abort_scan();
                return;
            }
            let findings = findings();
            let total: u32 = findings.iter().map(|f| f.count).sum();
            store.complete_scan(findings);
            store.notify(Toast::warning(
                "Scan Complete",
                format!("Found {} potential security events", total),
            ));
        });
        Ok(())
    }
}

fn findings() -> Vec<ScanFinding> {
    [
        ("Failed Login Attempts", 47, FindingSeverity::Medium),
        ("Unusual IP Locations", 12, FindingSeverity::High),
        ("After-hours Access", 23, FindingSeverity::Low),
    ]
    .into_iter()
    .map(|(category, count, severity)| ScanFinding {
        category: category.to_string(),
        count,
        severity,
    })
    .collect()
}
