//! End-to-end scenarios: prompt in, dashboard state out.

use std::sync::Arc;
use std::time::Duration;

use palette_action::{CommandPipeline, IntentKind, KeywordClassifier, SubmitOutcome};
use palette_core::{Dataset, PaletteConfig};

fn pipeline() -> CommandPipeline {
    CommandPipeline::start(&PaletteConfig::default(), Arc::new(KeywordClassifier::new()))
}

/// Let the dispatcher pick up the published action and clear it.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

#[tokio::test(start_paused = true)]
async fn tag_vip_users_scenario() {
    let p = pipeline();
    assert!(matches!(
        p.submit_and_wait("Tag all VIP customers").await,
        SubmitOutcome::Published(_)
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let high_spenders: Vec<u32> = Dataset::sample()
        .users_with_spend_above(5000)
        .map(|u| u.id)
        .collect();
    let tracker = p.store().snapshot().progress.tagging.expect("tracker shown");
    assert_eq!(tracker.total as usize, high_spenders.len());

    tokio::time::sleep(Duration::from_millis(600)).await;
    let snap = p.store().snapshot();
    assert!(snap.progress.tagging.is_none());
    for id in &high_spenders {
        assert_eq!(snap.user_tags.count(*id, "VIP"), 1);
    }
    let toast = snap.toasts.last().unwrap();
    assert_eq!(toast.title, "Tagging Complete");
    assert!(toast
        .message
        .as_deref()
        .unwrap()
        .contains(&high_spenders.len().to_string()));

    p.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn repeated_tagging_adds_one_instance_per_run() {
    let p = pipeline();
    for _ in 0..2 {
        p.submit_and_wait("Tag all VIP customers").await;
        tokio::time::sleep(Duration::from_millis(700)).await;
    }
    let snap = p.store().snapshot();
    assert_eq!(snap.user_tags.count(1, "VIP"), 2);
    assert_eq!(snap.user_tags.count(3, "VIP"), 0);
    p.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn schedule_job_scenario() {
    let p = pipeline();
    let jobs_before = p.store().snapshot().jobs.len();

    p.submit_and_wait("Email me a PDF report every Monday at 9am").await;
    settle().await;

    let snap = p.store().snapshot();
    assert_eq!(snap.jobs.len(), jobs_before + 1);
    let job = snap.jobs.last().unwrap();
    assert!(job.is_active());
    assert!(job.schedule.contains("Weekly"));
    assert!(job.schedule.contains("09:00"));
    assert_eq!(snap.toasts.last().unwrap().title, "Job Scheduled");
    p.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn unknown_command_only_toasts() {
    let p = pipeline();
    let before = p.store().snapshot();

    p.submit_and_wait("tell me a joke").await;
    settle().await;

    let after = p.store().snapshot();
    assert_eq!(after.filters, before.filters);
    assert_eq!(after.overlays, before.overlays);
    assert_eq!(after.jobs, before.jobs);
    assert_eq!(after.user_tags, before.user_tags);
    assert!(after.command.last_action.is_none());
    assert_eq!(after.toasts.last().unwrap().title, "Unknown Command");
    p.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn undo_filter_clears_filters() {
    let p = pipeline();
    p.submit_and_wait("Show me enterprise users").await;
    settle().await;
    assert_eq!(
        p.store().snapshot().filters.segment.as_deref(),
        Some("enterprise")
    );

    assert_eq!(p.store().undo_last_action(), Some(IntentKind::FilterSegment));
    assert!(p.store().snapshot().filters.is_empty());
    p.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn undo_after_other_kind_keeps_dashboard() {
    let p = pipeline();
    p.submit_and_wait("Show me enterprise users").await;
    settle().await;
    p.submit_and_wait("Compare churn vs last month").await;
    settle().await;
    p.submit_and_wait("Sync to HubSpot").await;
    settle().await;

    let before = p.store().snapshot();
    assert_eq!(before.overlays.len(), 1);
    assert_eq!(p.store().undo_last_action(), Some(IntentKind::TriggerWebhook));

    let after = p.store().snapshot();
    assert_eq!(after.filters, before.filters);
    assert_eq!(after.overlays, before.overlays);
    assert!(after.command.last_action.is_none());
    p.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn merge_progress_is_monotonic() {
    let p = pipeline();
    let mut rx = p.store().subscribe();
    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        let mut started = false;
        while rx.changed().await.is_ok() {
            match rx.borrow_and_update().progress.merge {
                Some(m) => {
                    started = true;
                    assert_eq!(m.found, 12);
                    seen.push(m.merged);
                }
                None if started => break,
                None => {}
            }
        }
        seen
    });

    p.submit_and_wait("Merge duplicate records").await;
    tokio::time::sleep(Duration::from_secs(4)).await;

    let seen = observer.await.unwrap();
    assert_eq!(seen.first(), Some(&0));
    assert_eq!(seen.last(), Some(&12));
    assert!(seen.iter().all(|&m| m <= 12));
    assert!(seen.windows(2).all(|w| w[1] == w[0] || w[1] == w[0] + 1));
    assert_eq!(
        p.store().snapshot().toasts.last().unwrap().title,
        "Merge Complete"
    );
    p.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn revoke_runs_only_after_confirmation() {
    let p = pipeline();
    p.submit_and_wait("Revoke admin access for inactive users").await;
    settle().await;
    assert_eq!(
        p.store().snapshot().confirmation.map(|c| c.title).as_deref(),
        Some("Revoke Access")
    );

    assert!(p.store().confirm());
    tokio::time::sleep(Duration::from_millis(1_100)).await;
    assert_eq!(
        p.store().snapshot().toasts.last().unwrap().title,
        "Access Revoked"
    );
    p.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_running_effects() {
    let p = pipeline();
    p.submit_and_wait("Scan for suspicious logins").await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(p.store().snapshot().scan.scanning);

    let store = p.store().clone();
    p.shutdown().await;
    tokio::time::sleep(Duration::from_secs(4)).await;

    let snap = store.snapshot();
    assert!(!snap.scan.scanning);
    assert!(snap.scan.results.is_none());
}
