//! MERGE_DUPLICATES: merge a fixed batch of duplicate records, one per tick.

use async_trait::async_trait;
use tracing::{debug, info};

use super::{mismatch, EffectContext, EffectHandler};
use crate::error::ActionError;
use crate::scheduler::sleep_or_cancel;
use crate::schema::ActionParams;
use crate::store::Toast;
use crate::types::{EffectSlot, IntentKind};

pub struct MergeDuplicatesHandler;

#[async_trait]
impl EffectHandler for MergeDuplicatesHandler {
    fn kind(&self) -> IntentKind {
        IntentKind::MergeDuplicates
    }

    async fn execute(&self, params: ActionParams, ctx: &EffectContext) -> Result<(), ActionError> {
        let ActionParams::MergeDuplicates(p) = &params else {
            return Err(mismatch(self.kind(), &params));
        };
        let found = ctx.effects.duplicate_count;
        if !ctx.store.begin_merge(found) {
            return Err(ActionError::Busy(EffectSlot::Merge));
        }
        info!(found, match_key = %p.match_key, "Merging duplicates");

        let store = ctx.store.clone();
        let tick = ctx.effects.merge_tick();
        let settle = ctx.effects.merge_settle();
        let match_key = p.match_key.clone();
        ctx.spawn(self.kind(), move |token| async move {
            for _ in 0..found {
                if !sleep_or_cancel(&token, tick).await {
                    debug!("Merge cancelled");
                    store.end_merge();
                    return;
                }
                store.advance_merge();
            }
            // Full bar stays up for the settle period.
            if !sleep_or_cancel(&token, settle).await {
                store.end_merge();
                return;
            }
            store.end_merge();
            store.notify(Toast::success(
                "Merge Complete",
                format!(
                    "Successfully merged {} duplicate records by {}",
                    found, match_key
                ),
            ));
        });
        Ok(())
    }
}
