// Core stream engine - independent of the CLI

pub mod bitrate;
pub mod command;
pub mod error;
pub mod platform;
pub mod probe;
pub mod runner;
pub mod settings;

pub use error::{Error, Result};
pub use settings::{ResolvedSettings, SourceKind, StreamOptions};
