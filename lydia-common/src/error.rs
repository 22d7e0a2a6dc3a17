//! Common error types for Lydia

use thiserror::Error;

/// Common result type for Lydia operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared across the Lydia crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
