//! RepoLens Utilities
//!
//! Small building blocks shared by every RepoLens crate: configuration
//! file loading, logging setup and character-exact string truncation.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod logging;
pub mod string;

pub use config::{load_config, load_config_or_default};
pub use string::{char_prefix, truncate_with_marker};

/// Result type used throughout RepoLens utilities
pub type Result<T> = std::result::Result<T, UtilError>;

/// Error types for utility operations
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
