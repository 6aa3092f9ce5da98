//! BULK_TAG: tag every user matching a criterion, one tick per user.

use async_trait::async_trait;
use palette_core::Dataset;
use tracing::{debug, info};

use super::{mismatch, EffectContext, EffectHandler};
use crate::error::ActionError;
use crate::scheduler::sleep_or_cancel;
use crate::schema::ActionParams;
use crate::store::Toast;
use crate::types::{EffectSlot, IntentKind};

/// The only criterion with its own selection; matched case-insensitively
/// as a substring.
const HIGH_SPEND_CRITERION: &str = "spend > 5000";
const HIGH_SPEND_THRESHOLD: u64 = 5000;

pub struct BulkTagHandler;

#[async_trait]
impl EffectHandler for BulkTagHandler {
    fn kind(&self) -> IntentKind {
        IntentKind::BulkTag
    }

    async fn execute(&self, params: ActionParams, ctx: &EffectContext) -> Result<(), ActionError> {
        let ActionParams::BulkTag(p) = &params else {
            return Err(mismatch(self.kind(), &params));
        };
        if ctx.store.is_busy(EffectSlot::Tagging) {
            return Err(ActionError::Busy(EffectSlot::Tagging));
        }

        let targets = select_users(&ctx.dataset, p.criteria.as_deref());
        let tag = p.tag.clone();
        info!(count = targets.len(), %tag, "Bulk tagging");

        // Nothing to tick through: no tracker, just the zero-count toast.
        if targets.is_empty() {
            ctx.store.notify(completion_toast(0, &tag));
            return Ok(());
        }

        let total = targets.len() as u32;
        if !ctx.store.begin_tagging(total) {
            return Err(ActionError::Busy(EffectSlot::Tagging));
        }

        let store = ctx.store.clone();
        let tick = ctx.effects.tag_tick();
        ctx.spawn(self.kind(), move |token| async move {
            for _ in 0..total {
                if !sleep_or_cancel(&token, tick).await {
                    debug!(%tag, "Bulk tagging cancelled");
                    store.end_tagging();
                    return;
                }
                store.advance_tagging();
            }
            store.end_tagging();
            store.add_user_tags(&targets, &tag);
            store.notify(completion_toast(total as usize, &tag));
        });
        Ok(())
    }
}

/// Users a criterion selects. Criteria containing `spend > 5000` select
/// users spending more than 5000; anything else selects everyone.
pub fn select_users(dataset: &Dataset, criteria: Option<&str>) -> Vec<u32> {
    let high_spend = criteria
        .map(|c| c.to_lowercase().contains(HIGH_SPEND_CRITERION))
        .unwrap_or(false);

    if high_spend {
        dataset
            .users_with_spend_above(HIGH_SPEND_THRESHOLD)
            .map(|u| u.id)
            .collect()
    } else {
        dataset.users.iter().map(|u| u.id).collect()
    }
}

fn completion_toast(count: usize, tag: &str) -> Toast {
    Toast::success("Tagging Complete", format!("Tagged {} users as \"{}\"", count, tag))
}
