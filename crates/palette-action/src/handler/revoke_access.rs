//! REVOKE_ACCESS: destructive, so it waits behind a confirmation prompt.

use async_trait::async_trait;
use tracing::info;

use super::{mismatch, EffectContext, EffectHandler};
use crate::confirmation::ConfirmationView;
use crate::error::ActionError;
use crate::scheduler::sleep_or_cancel;
use crate::schema::ActionParams;
use crate::store::Toast;
use crate::types::IntentKind;

pub struct RevokeAccessHandler;

#[async_trait]
impl EffectHandler for RevokeAccessHandler {
    fn kind(&self) -> IntentKind {
        IntentKind::RevokeAccess
    }

    async fn execute(&self, params: ActionParams, ctx: &EffectContext) -> Result<(), ActionError> {
        let ActionParams::RevokeAccess(p) = &params else {
            return Err(mismatch(self.kind(), &params));
        };

        let view = ConfirmationView {
            title: "Revoke Access".to_string(),
            message: format!(
                "This will revoke {} access for users who haven't logged in for 30+ days. \
                 This action cannot be undone.",
                p.role
            ),
        };

        let role = p.role.clone();
        let kind = self.kind();
        let deferred = ctx.clone();
        ctx.store.request_confirmation(
            view,
            Box::new(move || {
                info!(%role, "Revoke access confirmed");
                let store = deferred.store.clone();
                let delay = deferred.effects.revoke_delay();
                let revoked = deferred.effects.revoked_user_count;
                deferred.spawn(kind, move |token| async move {
                    if !sleep_or_cancel(&token, delay).await {
                        return;
                    }
                    store.notify(Toast::warning(
                        "Access Revoked",
                        format!("Revoked {} access for {} inactive users", role, revoked),
                    ));
                });
            }),
        );
        Ok(())
    }
}
