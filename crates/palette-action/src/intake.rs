//! Command intake.
//!
//! Accepts free text, sends it to the classifier and publishes the result
//! as a [`ResolvedAction`]. One submission at a time: new text is ignored
//! while a request is outstanding or the previous action has not been
//! cleared by the dispatcher.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier::Classifier;
use crate::error::ClassifyError;
use crate::store::{ActionStore, Toast};
use crate::types::ResolvedAction;

/// Result of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty text, or another submission was still in flight.
    Ignored,
    /// The classified action was published under this id.
    Published(Uuid),
    RateLimited,
    Failed,
}

/// Clears the processing flag however the submission ends.
struct ProcessingGuard {
    store: ActionStore,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.store.finish_processing();
    }
}

#[derive(Clone)]
pub struct CommandIntake {
    store: ActionStore,
    classifier: Arc<dyn Classifier>,
    /// Cap shown in the rate-limit toast when the service omits usage.
    daily_limit: u32,
}

impl CommandIntake {
    pub fn new(store: ActionStore, classifier: Arc<dyn Classifier>, daily_limit: u32) -> Self {
        Self {
            store,
            classifier,
            daily_limit,
        }
    }

    /// Submit `text` without waiting for the classifier.
    ///
    /// Returns `true` if the submission was accepted. Must be called from
    /// within a Tokio runtime.
    pub fn submit(&self, text: &str) -> bool {
        let Some(guard) = self.accept(text) else {
            return false;
        };
        let intake = self.clone();
        let prompt = text.trim().to_string();
        tokio::spawn(async move {
            intake.classify_and_publish(&prompt, guard).await;
        });
        true
    }

    /// Submit `text` and wait until the outcome is known.
    pub async fn submit_and_wait(&self, text: &str) -> SubmitOutcome {
        match self.accept(text) {
            Some(guard) => self.classify_and_publish(text.trim(), guard).await,
            None => SubmitOutcome::Ignored,
        }
    }

    fn accept(&self, text: &str) -> Option<ProcessingGuard> {
        let prompt = text.trim();
        if prompt.is_empty() {
            debug!("Empty submission ignored");
            return None;
        }
        if !self.store.try_begin_processing() {
            debug!("Submission ignored: previous command still in flight");
            return None;
        }
        info!(chars = prompt.chars().count(), "Command submitted");
        Some(ProcessingGuard {
            store: self.store.clone(),
        })
    }

    async fn classify_and_publish(&self, prompt: &str, _guard: ProcessingGuard) -> SubmitOutcome {
        match self.classifier.classify(prompt).await {
            Ok(response) => {
                let action = ResolvedAction::from_response(response);
                let id = action.id;
                info!(%id, kind = %action.kind, "Command classified");
                self.store.publish_action(action);
                SubmitOutcome::Published(id)
            }
            Err(ClassifyError::RateLimited(usage)) => {
                let limit = usage.map(|u| u.limit).unwrap_or(self.daily_limit);
                warn!(limit, "Daily command limit reached");
                self.store.notify(Toast::error(
                    "Rate Limit Exceeded",
                    format!("You have reached the daily limit of {} commands.", limit),
                ));
                SubmitOutcome::RateLimited
            }
            Err(err @ ClassifyError::Unavailable(_)) => {
                warn!(error = %err, "Classification failed");
                self.store
                    .notify(Toast::error("Connection Error", "Failed to connect to the AI service."));
                SubmitOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommandResponse, IntentKind, RateLimitUsage};
    use async_trait::async_trait;
    use palette_core::Dataset;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays canned results and counts calls.
    struct ScriptedClassifier {
        calls: AtomicUsize,
        result: Mutex<Result<CommandResponse, ClassifyError>>,
        delay: Duration,
    }

    impl ScriptedClassifier {
        fn new(result: Result<CommandResponse, ClassifyError>) -> Arc<Self> {
            Self::delayed(result, Duration::ZERO)
        }

        fn delayed(result: Result<CommandResponse, ClassifyError>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: Mutex::new(result),
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Classifier for ScriptedClassifier {
        async fn classify(&self, _prompt: &str) -> Result<CommandResponse, ClassifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.result.lock().unwrap().clone()
        }
    }

    fn intake(classifier: Arc<ScriptedClassifier>) -> (CommandIntake, ActionStore) {
        let store = ActionStore::new(&Dataset::sample(), Duration::from_secs(5));
        (CommandIntake::new(store.clone(), classifier, 10), store)
    }

    fn scan_response() -> Result<CommandResponse, ClassifyError> {
        Ok(CommandResponse::new(IntentKind::ScanAnomalies, None))
    }

    #[tokio::test]
    async fn test_blank_submission_is_a_no_op() {
        let classifier = ScriptedClassifier::new(scan_response());
        let (intake, store) = intake(Arc::clone(&classifier));
        let before = store.snapshot();

        assert_eq!(intake.submit_and_wait("   \n").await, SubmitOutcome::Ignored);
        assert!(!intake.submit(""));
        assert_eq!(classifier.calls(), 0);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_success_publishes_action() {
        let classifier = ScriptedClassifier::new(scan_response());
        let (intake, store) = intake(classifier);
        store.open_palette();

        let SubmitOutcome::Published(id) = intake.submit_and_wait("scan logs").await else {
            panic!("expected a published action");
        };
        let snap = store.snapshot();
        let action = snap.command.current.unwrap();
        assert_eq!(action.id, id);
        assert_eq!(action.kind, IntentKind::ScanAnomalies);
        assert!(!snap.command.processing);
        assert!(!snap.command.palette_open);
    }

    #[tokio::test]
    async fn test_uncleared_action_blocks_next_submission() {
        let classifier = ScriptedClassifier::new(scan_response());
        let (intake, store) = intake(Arc::clone(&classifier));

        let SubmitOutcome::Published(id) = intake.submit_and_wait("scan").await else {
            panic!("expected a published action");
        };
        assert_eq!(intake.submit_and_wait("scan again").await, SubmitOutcome::Ignored);
        assert_eq!(classifier.calls(), 1);

        store.clear_action(id);
        assert!(matches!(
            intake.submit_and_wait("scan again").await,
            SubmitOutcome::Published(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_while_processing_is_ignored() {
        let classifier = ScriptedClassifier::delayed(scan_response(), Duration::from_millis(500));
        let (intake, store) = intake(Arc::clone(&classifier));

        assert!(intake.submit("first"));
        assert!(store.snapshot().command.processing);
        assert!(!intake.submit("second"));

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(classifier.calls(), 1);
        assert!(!store.snapshot().command.processing);
        assert!(store.current_action().is_some());
    }

    #[tokio::test]
    async fn test_rate_limited_toasts_once() {
        let usage = RateLimitUsage {
            remaining: 0,
            used: 10,
            limit: 10,
        };
        let classifier = ScriptedClassifier::new(Err(ClassifyError::RateLimited(Some(usage))));
        let (intake, store) = intake(classifier);

        assert_eq!(intake.submit_and_wait("tag vips").await, SubmitOutcome::RateLimited);
        let snap = store.snapshot();
        assert!(snap.command.current.is_none());
        assert!(!snap.command.processing);
        assert_eq!(snap.toasts.len(), 1);
        let toast = snap.toasts.last().unwrap();
        assert_eq!(toast.title, "Rate Limit Exceeded");
        assert_eq!(
            toast.message.as_deref(),
            Some("You have reached the daily limit of 10 commands.")
        );
    }

    #[tokio::test]
    async fn test_rate_limit_without_usage_uses_configured_cap() {
        let classifier = ScriptedClassifier::new(Err(ClassifyError::RateLimited(None)));
        let store = ActionStore::new(&Dataset::sample(), Duration::from_secs(5));
        let intake = CommandIntake::new(store.clone(), classifier, 25);

        intake.submit_and_wait("tag vips").await;
        assert_eq!(
            store.snapshot().toasts.last().unwrap().message.as_deref(),
            Some("You have reached the daily limit of 25 commands.")
        );
    }

    #[tokio::test]
    async fn test_unavailable_toasts_connection_error() {
        let classifier = ScriptedClassifier::new(Err(ClassifyError::Unavailable(
            "connection refused".to_string(),
        )));
        let (intake, store) = intake(classifier);

        assert_eq!(intake.submit_and_wait("scan").await, SubmitOutcome::Failed);
        let snap = store.snapshot();
        assert!(!snap.command.processing);
        assert!(snap.command.current.is_none());
        assert_eq!(snap.toasts.last().unwrap().title, "Connection Error");

        // The next submission is accepted.
        assert_eq!(intake.submit_and_wait("scan").await, SubmitOutcome::Failed);
    }
}
