//! DATA_TRANSFORMATION: rewrite one field into a canonical format.

use async_trait::async_trait;
use tracing::{debug, info};

use super::{mismatch, EffectContext, EffectHandler};
use crate::error::ActionError;
use crate::scheduler::sleep_or_cancel;
use crate::schema::ActionParams;
use crate::store::Toast;
use crate::types::{EffectSlot, IntentKind};

pub struct DataTransformationHandler;

#[async_trait]
impl EffectHandler for DataTransformationHandler {
    fn kind(&self) -> IntentKind {
        IntentKind::DataTransformation
    }

    async fn execute(&self, params: ActionParams, ctx: &EffectContext) -> Result<(), ActionError> {
        let ActionParams::DataTransformation(p) = &params else {
            return Err(mismatch(self.kind(), &params));
        };
        if !ctx.store.begin_transform(&p.field) {
            return Err(ActionError::Busy(EffectSlot::Transform));
        }
        info!(field = %p.field, format = %p.format, "Transformation started");

        let store = ctx.store.clone();
        let delay = ctx.effects.transform_delay();
        let field = p.field.clone();
        let format = p.format.clone();
        ctx.spawn(self.kind(), move |token| async move {
            let completed = sleep_or_cancel(&token, delay).await;
            store.end_transform();
            if !completed {
                debug!(%field, "Transformation cancelled");
                return;
            }
            store.notify(Toast::success(
                "Data Transformed",
                format!("All {} values now in {} format", field, format),
            ));
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::{context, toast_titles};
    use crate::schema::DataTransformationParams;
    use std::time::Duration;

    fn params(field: &str) -> ActionParams {
        ActionParams::DataTransformation(DataTransformationParams {
            field: field.to_string(),
            format: "E.164".to_string(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_transform_marks_field_until_done() {
        let ctx = context();
        DataTransformationHandler.execute(params("phone_number"), &ctx).await.unwrap();
        assert_eq!(
            ctx.store.snapshot().progress.transforming_field.as_deref(),
            Some("phone_number")
        );

        tokio::time::sleep(Duration::from_millis(1_600)).await;
        let snap = ctx.store.snapshot();
        assert!(snap.progress.transforming_field.is_none());
        assert_eq!(
            snap.toasts.last().unwrap().message.as_deref(),
            Some("All phone_number values now in E.164 format")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_transform_is_busy() {
        let ctx = context();
        DataTransformationHandler.execute(params("phone_number"), &ctx).await.unwrap();
        let err = DataTransformationHandler
            .execute(params("email"), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Busy(EffectSlot::Transform)));
        assert_eq!(
            ctx.store.snapshot().progress.transforming_field.as_deref(),
            Some("phone_number")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_clears_field() {
        let ctx = context();
        DataTransformationHandler.execute(params("phone_number"), &ctx).await.unwrap();
        ctx.scheduler.cancel(ctx.invocation_id);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(ctx.store.snapshot().progress.transforming_field.is_none());
        assert!(toast_titles(&ctx).is_empty());
    }
}
