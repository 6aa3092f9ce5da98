//! Observable dashboard state.
//!
//! [`ActionStore`] is the single shared mutable resource of the pipeline.
//! Intake, dispatcher and effect handlers talk to each other only through
//! it. State lives in a `tokio::sync::watch` channel; every mutation is one
//! modify-and-notify step over the whole [`DashboardState`], so observers
//! never see a half-applied change.
//!
//! The state is split into slices, each owning its own invariants:
//!
//! | slice | module |
//! |---|---|
//! | palette, in-flight request, resolved action, last action | [`command`] |
//! | filters | [`filters`] |
//! | chart overlays | [`overlays`] |
//! | scheduled jobs | [`jobs`] |
//! | per-user tags | [`tags`] |
//! | toasts | [`notifications`] |
//! | progress trackers, transforming field | [`progress`] |
//! | scanning flag and results | [`scan`] |
//!
//! The confirmation prompt's view is part of the state; its callback is
//! held by a [`ConfirmationGate`] beside it.

pub mod command;
pub mod filters;
pub mod jobs;
pub mod notifications;
pub mod overlays;
pub mod progress;
pub mod scan;
pub mod tags;

use std::sync::{Arc, Weak};
use std::time::Duration;

use palette_core::types::ScheduledJobRecord;
use palette_core::Dataset;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::confirmation::{ConfirmCallback, ConfirmationGate, ConfirmationView};
use crate::types::{EffectSlot, IntentKind, ResolvedAction};

pub use command::{CommandState, LastActionRecord};
pub use filters::DashboardFilters;
pub use jobs::JobList;
pub use notifications::{Severity, Toast, ToastList};
pub use overlays::{ChartOverlay, OverlayKind, OverlayList, SeriesPoint};
pub use progress::{MergeProgress, ProgressState, TaggingProgress};
pub use scan::{FindingSeverity, ScanFinding, ScanState};
pub use tags::UserTagIndex;

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub command: CommandState,
    pub filters: DashboardFilters,
    pub overlays: OverlayList,
    pub jobs: JobList,
    pub user_tags: UserTagIndex,
    pub toasts: ToastList,
    pub confirmation: Option<ConfirmationView>,
    pub scan: ScanState,
    pub progress: ProgressState,
}

impl DashboardState {
    pub fn new(dataset: &Dataset) -> Self {
        Self {
            jobs: JobList::seeded(&dataset.seed_jobs),
            ..Self::default()
        }
    }

    pub fn is_busy(&self, slot: EffectSlot) -> bool {
        match slot {
            EffectSlot::Tagging => self.progress.tagging.is_some(),
            EffectSlot::Merge => self.progress.merge.is_some(),
            EffectSlot::Scan => self.scan.scanning,
            EffectSlot::Transform => self.progress.transforming_field.is_some(),
        }
    }
}

struct StoreInner {
    state: watch::Sender<DashboardState>,
    gate: ConfirmationGate,
    toast_ttl: Duration,
}

/// Cheaply cloneable handle to the shared dashboard state.
#[derive(Clone)]
pub struct ActionStore {
    inner: Arc<StoreInner>,
}

impl ActionStore {
    pub fn new(dataset: &Dataset, toast_ttl: Duration) -> Self {
        let (state, _) = watch::channel(DashboardState::new(dataset));
        Self {
            inner: Arc::new(StoreInner {
                state,
                gate: ConfirmationGate::new(),
                toast_ttl,
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> DashboardState {
        self.inner.state.borrow().clone()
    }

    /// Run `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    pub fn current_action(&self) -> Option<ResolvedAction> {
        self.read(|s| s.command.current.clone())
    }

    pub fn is_busy(&self, slot: EffectSlot) -> bool {
        self.read(|s| s.is_busy(slot))
    }

    // =========================================================================
    // Write helpers
    // =========================================================================

    /// Apply `f` and notify observers.
    fn update<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        let mut out = None;
        self.inner.state.send_modify(|state| out = Some(f(state)));
        match out {
            Some(value) => value,
            None => unreachable!("send_modify runs its closure exactly once"),
        }
    }

    /// Apply `f`; notify observers only when it reports a change.
    fn update_if(&self, f: impl FnOnce(&mut DashboardState) -> bool) -> bool {
        self.inner.state.send_if_modified(f)
    }

    // =========================================================================
    // Command palette
    // =========================================================================

    pub fn open_palette(&self) {
        self.update_if(|s| !std::mem::replace(&mut s.command.palette_open, true));
    }

    pub fn close_palette(&self) {
        self.update_if(|s| std::mem::replace(&mut s.command.palette_open, false));
    }

    pub fn toggle_palette(&self) -> bool {
        self.update(|s| {
            s.command.palette_open = !s.command.palette_open;
            s.command.palette_open
        })
    }

    /// Mark a classification request as in flight.
    ///
    /// Refused while another request is outstanding or the previous
    /// resolved action has not been cleared.
    pub fn try_begin_processing(&self) -> bool {
        self.update_if(|s| s.command.begin())
    }

    pub fn finish_processing(&self) {
        self.update_if(|s| s.command.finish());
    }

    pub fn publish_action(&self, action: ResolvedAction) {
        debug!(id = %action.id, kind = %action.kind, "Resolved action published");
        self.update(|s| s.command.publish(action));
    }

    /// Clear the resolved action `id` once consumed.
    pub fn clear_action(&self, id: Uuid) -> bool {
        self.update_if(|s| s.command.clear(id))
    }

    // =========================================================================
    // Last action and undo
    // =========================================================================

    pub fn record_last_action(&self, record: LastActionRecord) {
        self.update(|s| s.command.last_action = Some(record));
    }

    pub fn last_action(&self) -> Option<LastActionRecord> {
        self.read(|s| s.command.last_action.clone())
    }

    /// Revert what the last action changed, where that is possible, and
    /// clear the record.
    ///
    /// Filters are reset after FILTER_SEGMENT and overlays removed after
    /// COMPARE_METRICS or SIMULATE_PROJECTION. Every other kind only loses
    /// its record. Returns the kind that was undone.
    pub fn undo_last_action(&self) -> Option<IntentKind> {
        let mut undone = None;
        self.update_if(|s| {
            let Some(record) = s.command.last_action.take() else {
                return false;
            };
            match record.kind {
                IntentKind::FilterSegment => {
                    s.filters.clear();
                }
                IntentKind::CompareMetrics | IntentKind::SimulateProjection => {
                    s.overlays.clear();
                }
                _ => {}
            }
            undone = Some(record.kind);
            true
        });
        undone
    }

    /// Clear the last action record without reverting anything.
    pub fn dismiss_last_action(&self) -> bool {
        self.update_if(|s| s.command.last_action.take().is_some())
    }

    // =========================================================================
    // Filters, overlays, jobs, tags
    // =========================================================================

    pub fn merge_filters(&self, patch: &DashboardFilters) -> DashboardFilters {
        self.update_if(|s| s.filters.merge(patch));
        self.read(|s| s.filters.clone())
    }

    pub fn clear_filters(&self) -> bool {
        self.update_if(|s| s.filters.clear())
    }

    pub fn add_overlay(&self, overlay: ChartOverlay) {
        self.update(|s| s.overlays.add(overlay));
    }

    pub fn remove_overlay(&self, id: &str) -> bool {
        self.update_if(|s| s.overlays.remove(id))
    }

    pub fn clear_overlays(&self) -> bool {
        self.update_if(|s| s.overlays.clear())
    }

    pub fn add_job(&self, job: ScheduledJobRecord) {
        self.update(|s| s.jobs.append(job));
    }

    /// Append `tag` to every user in `user_ids` in one step.
    pub fn add_user_tags(&self, user_ids: &[u32], tag: &str) {
        self.update(|s| {
            for &id in user_ids {
                s.user_tags.add(id, tag);
            }
        });
    }

    // =========================================================================
    // Toasts
    // =========================================================================

    /// Show a toast. It expires by itself after the configured TTL when a
    /// Tokio runtime is available, and can be dismissed before that.
    pub fn notify(&self, toast: Toast) -> Uuid {
        let id = toast.id;
        debug!(severity = %toast.severity, title = %toast.title, "Toast");
        if !self.update_if(|s| s.toasts.push(toast)) {
            return id;
        }

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let weak: Weak<StoreInner> = Arc::downgrade(&self.inner);
            let ttl = self.inner.toast_ttl;
            handle.spawn(async move {
                tokio::time::sleep(ttl).await;
                if let Some(inner) = weak.upgrade() {
                    inner.state.send_if_modified(|s| s.toasts.dismiss(id));
                }
            });
        }
        id
    }

    pub fn dismiss_toast(&self, id: Uuid) -> bool {
        self.update_if(|s| s.toasts.dismiss(id))
    }

    // =========================================================================
    // Confirmation
    // =========================================================================

    /// Show the confirmation prompt. `on_confirm` runs only from
    /// [`ActionStore::confirm`].
    pub fn request_confirmation(&self, view: ConfirmationView, on_confirm: ConfirmCallback) {
        self.inner.gate.request(view.clone(), on_confirm);
        self.update(|s| s.confirmation = Some(view));
    }

    /// Approve the prompt and run its callback. Returns `false` when no
    /// prompt is open.
    pub fn confirm(&self) -> bool {
        let Some(pending) = self.inner.gate.approve() else {
            return false;
        };
        self.update(|s| s.confirmation = None);
        pending.confirm();
        true
    }

    /// Close the prompt without running its callback.
    pub fn dismiss_confirmation(&self) -> bool {
        let dismissed = self.inner.gate.dismiss();
        self.update_if(|s| s.confirmation.take().is_some());
        dismissed
    }

    // =========================================================================
    // Scan
    // =========================================================================

    pub fn begin_scan(&self) -> bool {
        self.update_if(|s| s.scan.begin())
    }

    pub fn complete_scan(&self, results: Vec<ScanFinding>) {
        self.update(|s| s.scan.complete(results));
    }

    pub fn abort_scan(&self) -> bool {
        self.update_if(|s| s.scan.abort())
    }

    // =========================================================================
    // Progress trackers
    // =========================================================================

    pub fn begin_tagging(&self, total: u32) -> bool {
        self.update_if(|s| s.progress.begin_tagging(total))
    }

    pub fn advance_tagging(&self) -> Option<TaggingProgress> {
        let mut step = None;
        self.update_if(|s| {
            step = s.progress.advance_tagging();
            step.is_some()
        });
        step
    }

    pub fn end_tagging(&self) -> bool {
        self.update_if(|s| s.progress.end_tagging())
    }

    pub fn begin_merge(&self, found: u32) -> bool {
        self.update_if(|s| s.progress.begin_merge(found))
    }

    pub fn advance_merge(&self) -> Option<MergeProgress> {
        let mut step = None;
        self.update_if(|s| {
            step = s.progress.advance_merge();
            step.is_some()
        });
        step
    }

    pub fn end_merge(&self) -> bool {
        self.update_if(|s| s.progress.end_merge())
    }

    pub fn begin_transform(&self, field: &str) -> bool {
        self.update_if(|s| s.progress.begin_transform(field))
    }

    pub fn end_transform(&self) -> bool {
        self.update_if(|s| s.progress.end_transform())
    }
}
