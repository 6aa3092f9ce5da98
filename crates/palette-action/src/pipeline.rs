//! Wiring: one store, one intake, one running dispatcher.

use std::sync::Arc;

use palette_core::{Dataset, PaletteConfig};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::dispatcher::Dispatcher;
use crate::handler::HandlerRegistry;
use crate::intake::{CommandIntake, SubmitOutcome};
use crate::store::ActionStore;

/// A running command pipeline.
pub struct CommandPipeline {
    store: ActionStore,
    intake: CommandIntake,
    dispatcher: Arc<Dispatcher>,
    runner: JoinHandle<()>,
}

impl CommandPipeline {
    /// Start a pipeline over the sample dataset.
    pub fn start(config: &PaletteConfig, classifier: Arc<dyn Classifier>) -> Self {
        Self::start_with(config, classifier, Dataset::sample(), HandlerRegistry::with_defaults())
    }

    /// Start a pipeline with an explicit dataset and handler set.
    pub fn start_with(
        config: &PaletteConfig,
        classifier: Arc<dyn Classifier>,
        dataset: Dataset,
        registry: HandlerRegistry,
    ) -> Self {
        let dataset = Arc::new(dataset);
        let store = ActionStore::new(&dataset, config.effects.toast_ttl());
        let intake = CommandIntake::new(
            store.clone(),
            classifier,
            config.server.daily_command_limit,
        );
        let dispatcher = Arc::new(Dispatcher::new(
            store.clone(),
            registry,
            dataset,
            config.dispatch.clone(),
            config.effects.clone(),
        ));

        let runner = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.run().await })
        };
        info!(
            strict_parameters = config.dispatch.strict_parameters,
            "Command pipeline started"
        );

        Self {
            store,
            intake,
            dispatcher,
            runner,
        }
    }

    pub fn store(&self) -> &ActionStore {
        &self.store
    }

    pub fn intake(&self) -> &CommandIntake {
        &self.intake
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn submit(&self, text: &str) -> bool {
        self.intake.submit(text)
    }

    pub async fn submit_and_wait(&self, text: &str) -> SubmitOutcome {
        self.intake.submit_and_wait(text).await
    }

    /// Cancel every effect and wait for the dispatcher to stop.
    pub async fn shutdown(self) {
        self.dispatcher.shutdown();
        if let Err(e) = self.runner.await {
            warn!(error = %e, "Dispatcher task ended abnormally");
        }
        info!("Command pipeline stopped");
    }
}
