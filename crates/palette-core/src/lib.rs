pub mod config;
pub mod error;
pub mod fixtures;
pub mod types;

pub use config::PaletteConfig;
pub use error::{PaletteError, Result};
pub use fixtures::Dataset;
pub use types::*;
