//! Action dispatcher.
//!
//! Watches the store for newly resolved actions and runs each exactly once,
//! in arrival order: reject UNKNOWN, record the last action, decode the
//! parameters, look up the handler and execute it. The consumed action is
//! cleared after a short delay, and only then can intake accept more input.

use std::sync::Arc;

use palette_core::config::{DispatchConfig, EffectsConfig};
use palette_core::types::Timestamp;
use palette_core::Dataset;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ActionError, SchemaError};
use crate::handler::{EffectContext, HandlerRegistry};
use crate::scheduler::EffectScheduler;
use crate::schema::{fallback_description, ActionParams};
use crate::store::{ActionStore, LastActionRecord, Toast};
use crate::types::{IntentKind, ResolvedAction};

/// What happened to one resolved action.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The handler ran; deferred work may still be in flight.
    Applied,
    /// The action was UNKNOWN.
    Unrecognized,
    /// Parameters were missing or invalid, so nothing ran.
    Skipped(SchemaError),
    /// The handler refused or could not be found.
    Failed(ActionError),
}

/// Runs resolved actions against the registered effect handlers.
pub struct Dispatcher {
    store: ActionStore,
    registry: HandlerRegistry,
    scheduler: EffectScheduler,
    dataset: Arc<Dataset>,
    dispatch: DispatchConfig,
    effects: EffectsConfig,
}

impl Dispatcher {
    pub fn new(
        store: ActionStore,
        registry: HandlerRegistry,
        dataset: Arc<Dataset>,
        dispatch: DispatchConfig,
        effects: EffectsConfig,
    ) -> Self {
        Self {
            store,
            registry,
            scheduler: EffectScheduler::new(),
            dataset,
            dispatch,
            effects,
        }
    }

    pub fn store(&self) -> &ActionStore {
        &self.store
    }

    pub fn scheduler(&self) -> &EffectScheduler {
        &self.scheduler
    }

    /// Dispatch one action.
    pub async fn dispatch(&self, action: &ResolvedAction) -> DispatchOutcome {
        if action.kind == IntentKind::Unknown {
            info!(id = %action.id, error = ?action.raw_error, "Unrecognized command");
            self.store.notify(Toast::error(
                "Unknown Command",
                "Sorry, I couldn't understand that request. Try one of the suggested prompts.",
            ));
            return DispatchOutcome::Unrecognized;
        }

        let parsed = ActionParams::parse(action.kind, action.parameters.as_ref());
        let summary = match &parsed {
            Ok(params) => params.describe(),
            Err(_) => fallback_description(action.kind),
        };
        self.store.record_last_action(LastActionRecord {
            kind: action.kind,
            parameters: action.parameters.clone(),
            timestamp: Timestamp::now(),
            invocation_id: action.id,
            summary,
        });

        let params = match parsed {
            Ok(params) => params,
            Err(err) => {
                self.report_schema_error(&err);
                return DispatchOutcome::Skipped(err);
            }
        };

        let Some(handler) = self.registry.get(action.kind) else {
            warn!(kind = %action.kind, "No handler registered");
            return DispatchOutcome::Failed(ActionError::UnregisteredHandler(action.kind));
        };

        let ctx = EffectContext {
            store: self.store.clone(),
            scheduler: self.scheduler.clone(),
            dataset: Arc::clone(&self.dataset),
            effects: self.effects.clone(),
            invocation_id: action.id,
        };
        match handler.execute(params, &ctx).await {
            Ok(()) => {
                info!(id = %action.id, kind = %action.kind, "Action applied");
                DispatchOutcome::Applied
            }
            Err(ActionError::Busy(slot)) => {
                warn!(kind = %action.kind, %slot, "Effect already running");
                self.store.notify(Toast::warning(
                    format!("{} Already Running", slot.label()),
                    "Wait for the current operation to finish and try again.",
                ));
                DispatchOutcome::Failed(ActionError::Busy(slot))
            }
            Err(err) => {
                warn!(kind = %action.kind, error = %err, "Action failed");
                DispatchOutcome::Failed(err)
            }
        }
    }

    fn report_schema_error(&self, err: &SchemaError) {
        match err {
            SchemaError::MissingParameters(kind) => {
                debug!(%kind, "Action skipped: no parameters");
                if self.dispatch.strict_parameters {
                    self.store.notify(Toast::error("Missing Parameters", err.to_string()));
                }
            }
            SchemaError::InvalidParameterValue { kind, reason } => {
                warn!(%kind, %reason, "Action skipped: invalid parameters");
                if self.dispatch.strict_parameters {
                    self.store.notify(Toast::error("Invalid Parameters", err.to_string()));
                }
            }
        }
    }

    /// Consume resolved actions until [`Dispatcher::shutdown`] is called.
    pub async fn run(&self) {
        let mut rx = self.store.subscribe();
        let mut last_seen: Option<Uuid> = None;
        info!("Dispatcher started");

        loop {
            let current = rx.borrow_and_update().command.current.clone();
            if let Some(action) = current.filter(|a| last_seen != Some(a.id)) {
                last_seen = Some(action.id);
                self.dispatch(&action).await;

                tokio::select! {
                    _ = self.scheduler.shut_down() => {
                        self.store.clear_action(action.id);
                        break;
                    }
                    _ = tokio::time::sleep(self.dispatch.action_clear_delay()) => {
                        self.store.clear_action(action.id);
                    }
                }
                continue;
            }

            tokio::select! {
                _ = self.scheduler.shut_down() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("Dispatcher stopped");
    }

    /// Cancel the deferred effects of one invocation.
    pub fn cancel(&self, invocation_id: Uuid) -> bool {
        let cancelled = self.scheduler.cancel(invocation_id);
        if cancelled {
            info!(%invocation_id, "Effect cancelled");
        }
        cancelled
    }

    /// Cancel the deferred effects of every invocation of `kind`.
    pub fn cancel_kind(&self, kind: IntentKind) -> usize {
        let count = self.scheduler.cancel_kind(kind);
        info!(%kind, count, "Effects cancelled");
        count
    }

    pub fn cancel_all(&self) -> usize {
        let count = self.scheduler.cancel_all();
        info!(count, "All effects cancelled");
        count
    }

    /// Cancel every effect and stop [`Dispatcher::run`].
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    /// Invocations with deferred work still running.
    pub fn active(&self) -> Vec<(Uuid, IntentKind)> {
        self.scheduler.active()
    }
}
