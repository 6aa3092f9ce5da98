//! SCHEDULE_JOB: append a recurring job to the jobs list.

use async_trait::async_trait;
use palette_core::types::{JobStatus, ScheduledJobRecord};
use tracing::info;

use super::{capitalize, mismatch, title_case, EffectContext, EffectHandler};
use crate::error::ActionError;
use crate::schema::{ActionParams, ScheduleJobParams};
use crate::store::Toast;
use crate::types::IntentKind;

pub struct ScheduleJobHandler;

#[async_trait]
impl EffectHandler for ScheduleJobHandler {
    fn kind(&self) -> IntentKind {
        IntentKind::ScheduleJob
    }

    async fn execute(&self, params: ActionParams, ctx: &EffectContext) -> Result<(), ActionError> {
        let ActionParams::ScheduleJob(p) = &params else {
            return Err(mismatch(self.kind(), &params));
        };

        let job = build_job(p, &format!("job-{}", ctx.invocation_id));
        info!(id = %job.id, schedule = %job.schedule, "Job scheduled");
        let message = format!("{} will run {}", job.name, p.recurrence);
        ctx.store.add_job(job);

        ctx.store.notify(Toast::success("Job Scheduled", message));
        Ok(())
    }
}

/// `export_pdf` weekly on monday at 09:00 becomes
/// "Export Pdf - Scheduled", "Weekly (monday) at 09:00".
fn build_job(p: &ScheduleJobParams, id: &str) -> ScheduledJobRecord {
    let mut schedule = capitalize(&p.recurrence);
    if let Some(day) = &p.day {
        schedule.push_str(&format!(" ({})", day));
    }
    schedule.push_str(&format!(" at {}", p.time));

    ScheduledJobRecord {
        id: id.to_string(),
        name: format!("{} - Scheduled", title_case(&p.job_type)),
        job_type: p.job_type.clone(),
        schedule,
        next_run: "Pending...".to_string(),
        status: JobStatus::Active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::context;

    fn params(day: Option<&str>) -> ScheduleJobParams {
        ScheduleJobParams {
            job_type: "export_pdf".to_string(),
            recurrence: "weekly".to_string(),
            time: "09:00".to_string(),
            day: day.map(String::from),
        }
    }

    #[test]
    fn test_build_job_with_day() {
        let job = build_job(&params(Some("monday")), "job-1");
        assert_eq!(job.id, "job-1");
        assert_eq!(job.name, "Export Pdf - Scheduled");
        assert_eq!(job.job_type, "export_pdf");
        assert_eq!(job.schedule, "Weekly (monday) at 09:00");
        assert_eq!(job.next_run, "Pending...");
        assert!(job.is_active());
    }

    #[test]
    fn test_build_job_without_day() {
        let job = build_job(&params(None), "job-2");
        assert_eq!(job.schedule, "Weekly at 09:00");
    }

    #[tokio::test]
    async fn test_appends_job_after_seeds() {
        let ctx = context();
        ScheduleJobHandler
            .execute(ActionParams::ScheduleJob(params(Some("monday"))), &ctx)
            .await
            .unwrap();

        let snap = ctx.store.snapshot();
        assert_eq!(snap.jobs.len(), 3);
        let job = snap.jobs.last().unwrap();
        assert_eq!(job.id, format!("job-{}", ctx.invocation_id));

        let toast = snap.toasts.last().unwrap();
        assert_eq!(toast.title, "Job Scheduled");
        assert_eq!(
            toast.message.as_deref(),
            Some("Export Pdf - Scheduled will run weekly")
        );
    }
}
