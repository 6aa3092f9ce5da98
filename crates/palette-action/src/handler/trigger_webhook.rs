//! TRIGGER_WEBHOOK: simulated sync of the current view to an external system.

use async_trait::async_trait;
use tracing::info;

use super::{capitalize, mismatch, EffectContext, EffectHandler};
use crate::error::ActionError;
use crate::scheduler::sleep_or_cancel;
use crate::schema::ActionParams;
use crate::store::Toast;
use crate::types::IntentKind;

pub struct TriggerWebhookHandler;

#[async_trait]
impl EffectHandler for TriggerWebhookHandler {
    fn kind(&self) -> IntentKind {
        IntentKind::TriggerWebhook
    }

    async fn execute(&self, params: ActionParams, ctx: &EffectContext) -> Result<(), ActionError> {
        let ActionParams::TriggerWebhook(p) = &params else {
            return Err(mismatch(self.kind(), &params));
        };
        info!(destination = %p.destination, scope = ?p.data_scope, "Webhook sync started");

        ctx.store.notify(Toast::info(
            format!("Connecting to {}...", capitalize(&p.destination)),
            "Syncing data from current view",
        ));

        let store = ctx.store.clone();
        let delay = ctx.effects.webhook_delay();
        let records = ctx.effects.synced_record_count;
        let destination = p.destination.clone();
        ctx.spawn(self.kind(), move |token| async move {
            if !sleep_or_cancel(&token, delay).await {
                return;
            }
            store.notify(Toast::success(
                "Sync Complete! ✓",
                format!("Successfully synced {} records to {}", records, destination),
            ));
        });
        Ok(())
    }
}
