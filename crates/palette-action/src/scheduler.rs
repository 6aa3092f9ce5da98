//! Effect scheduler for deferred and incremental effects.
//!
//! Every timer-driven effect runs as a Tokio task under its own
//! cancellation token, keyed by the invocation id of the action that
//! started it. All tokens are children of one root token so the whole
//! dispatcher can be shut down at once.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::types::IntentKind;

struct RunningEffect {
    task: u64,
    kind: IntentKind,
    token: CancellationToken,
}

/// Registry of running effect tasks.
#[derive(Clone)]
pub struct EffectScheduler {
    root: CancellationToken,
    next_task: Arc<AtomicU64>,
    running: Arc<Mutex<HashMap<Uuid, Vec<RunningEffect>>>>,
}

impl Default for EffectScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectScheduler {
    pub fn new() -> Self {
        Self {
            root: CancellationToken::new(),
            next_task: Arc::new(AtomicU64::new(0)),
            running: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Spawn an effect task for `invocation_id`.
    ///
    /// `effect` receives the task's cancellation token and is expected to
    /// stop at its next suspension point once the token fires. Must be
    /// called from within a Tokio runtime.
    pub fn spawn<F, Fut>(&self, invocation_id: Uuid, kind: IntentKind, effect: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = self.next_task.fetch_add(1, Ordering::Relaxed);
        let token = self.root.child_token();
        self.running
            .lock()
            .unwrap()
            .entry(invocation_id)
            .or_default()
            .push(RunningEffect {
                task,
                kind,
                token: token.clone(),
            });

        let running = Arc::clone(&self.running);
        let fut = effect(token);
        tokio::spawn(async move {
            fut.await;
            let mut running = running.lock().unwrap();
            if let Some(effects) = running.get_mut(&invocation_id) {
                effects.retain(|e| e.task != task);
                if effects.is_empty() {
                    running.remove(&invocation_id);
                }
            }
            debug!(%invocation_id, %kind, "Effect finished");
        });
    }

    /// Cancel every task started for `invocation_id`.
    ///
    /// Returns `false` if nothing is running under that id.
    pub fn cancel(&self, invocation_id: Uuid) -> bool {
        match self.running.lock().unwrap().get(&invocation_id) {
            Some(effects) => {
                effects.iter().for_each(|e| e.token.cancel());
                !effects.is_empty()
            }
            None => false,
        }
    }

    /// Cancel every running task of `kind`. Returns how many were signalled.
    pub fn cancel_kind(&self, kind: IntentKind) -> usize {
        let running = self.running.lock().unwrap();
        running
            .values()
            .flatten()
            .filter(|e| e.kind == kind)
            .inspect(|e| e.token.cancel())
            .count()
    }

    /// Cancel every running task. New tasks can still be spawned.
    pub fn cancel_all(&self) -> usize {
        let running = self.running.lock().unwrap();
        running
            .values()
            .flatten()
            .inspect(|e| e.token.cancel())
            .count()
    }

    /// Cancel everything, including tasks spawned from now on.
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    /// Resolves once [`EffectScheduler::shutdown`] has been called.
    pub async fn shut_down(&self) {
        self.root.cancelled().await;
    }

    /// Invocations with at least one live task, sorted by id.
    pub fn active(&self) -> Vec<(Uuid, IntentKind)> {
        let running = self.running.lock().unwrap();
        let mut active: Vec<(Uuid, IntentKind)> = running
            .iter()
            .filter_map(|(id, effects)| effects.first().map(|e| (*id, e.kind)))
            .collect();
        active.sort_by_key(|(id, _)| *id);
        active
    }
}

/// Sleep for `duration` unless `token` fires first.
///
/// Returns `true` if the full duration elapsed.
pub async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[tokio::test(start_paused = true)]
    async fn test_spawned_effect_runs_to_completion() {
        let scheduler = EffectScheduler::new();
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        let id = Uuid::new_v4();

        scheduler.spawn(id, IntentKind::ScanAnomalies, |token| async move {
            if sleep_or_cancel(&token, Duration::from_secs(3)).await {
                flag.store(true, Ordering::SeqCst);
            }
        });
        assert_eq!(scheduler.active(), vec![(id, IntentKind::ScanAnomalies)]);

        tokio::time::sleep(Duration::from_millis(3_100)).await;
        assert!(done.load(Ordering::SeqCst));
        assert!(scheduler.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_effect() {
        let scheduler = EffectScheduler::new();
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        let id = Uuid::new_v4();

        scheduler.spawn(id, IntentKind::TriggerWebhook, |token| async move {
            if sleep_or_cancel(&token, Duration::from_millis(2_500)).await {
                flag.store(true, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(scheduler.cancel(id));
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(!done.load(Ordering::SeqCst));
        assert!(scheduler.active().is_empty());
        assert!(!scheduler.cancel(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_kind_only_hits_that_kind() {
        let scheduler = EffectScheduler::new();
        let scan_done = Arc::new(AtomicBool::new(false));
        let sync_done = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&scan_done);
        scheduler.spawn(Uuid::new_v4(), IntentKind::ScanAnomalies, |token| async move {
            if sleep_or_cancel(&token, Duration::from_secs(1)).await {
                flag.store(true, Ordering::SeqCst);
            }
        });
        let flag = Arc::clone(&sync_done);
        scheduler.spawn(Uuid::new_v4(), IntentKind::TriggerWebhook, |token| async move {
            if sleep_or_cancel(&token, Duration::from_secs(1)).await {
                flag.store(true, Ordering::SeqCst);
            }
        });

        assert_eq!(scheduler.cancel_kind(IntentKind::ScanAnomalies), 1);
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert!(!scan_done.load(Ordering::SeqCst));
        assert!(sync_done.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_leaves_scheduler_usable() {
        let scheduler = EffectScheduler::new();
        for _ in 0..3 {
            scheduler.spawn(Uuid::new_v4(), IntentKind::MergeDuplicates, |token| async move {
                sleep_or_cancel(&token, Duration::from_secs(10)).await;
            });
        }
        assert_eq!(scheduler.cancel_all(), 3);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(scheduler.active().is_empty());

        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        scheduler.spawn(Uuid::new_v4(), IntentKind::MergeDuplicates, |token| async move {
            if sleep_or_cancel(&token, Duration::from_millis(100)).await {
                flag.store(true, Ordering::SeqCst);
            }
        });
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_future_spawns() {
        let scheduler = EffectScheduler::new();
        scheduler.shutdown();

        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        scheduler.spawn(Uuid::new_v4(), IntentKind::ScanAnomalies, |token| async move {
            if sleep_or_cancel(&token, Duration::from_millis(100)).await {
                flag.store(true, Ordering::SeqCst);
            }
        });
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!done.load(Ordering::SeqCst));

        tokio::time::timeout(Duration::from_secs(1), scheduler.shut_down())
            .await
            .expect("shut_down resolves after shutdown");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_or_cancel_elapses() {
        let token = CancellationToken::new();
        assert!(sleep_or_cancel(&token, Duration::from_millis(10)).await);
        token.cancel();
        assert!(!sleep_or_cancel(&token, Duration::from_millis(10)).await);
    }
}
