//! Configuration and CLI handling

pub mod cli;
pub mod settings;
pub mod targets;
pub mod tempo;

pub use cli::Cli;
pub use settings::Settings;
pub use targets::parse_targets;
pub use tempo::{BpmBand, TempoConfig};
