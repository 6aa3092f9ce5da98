//! Command pipeline for the palette.
//!
//! Classifies free-text commands into intents, publishes them to an
//! observable dashboard store and applies each intent's effects through
//! pluggable handlers.

pub mod classifier;
pub mod confirmation;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod intake;
pub mod pipeline;
pub mod scheduler;
pub mod schema;
pub mod store;
pub mod types;

pub use classifier::{Classifier, HttpClassifier, KeywordClassifier};
pub use confirmation::{ConfirmationGate, ConfirmationView};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{ActionError, ClassifyError, SchemaError};
pub use handler::{EffectContext, EffectHandler, HandlerRegistry};
pub use intake::{CommandIntake, SubmitOutcome};
pub use pipeline::CommandPipeline;
pub use scheduler::EffectScheduler;
pub use schema::ActionParams;
pub use store::{ActionStore, DashboardState};
pub use types::{
    CommandRequest, CommandResponse, EffectSlot, IntentKind, RateLimitUsage, RawParams,
    ResolvedAction,
};
