//! # Lydia Common Library
//!
//! Shared code for the Lydia music-library tools:
//! - Error types
//! - Configuration loading and validation

pub mod config;
pub mod error;

pub use config::{Behavior, CollisionPolicy, LydiaConfig};
pub use error::{Error, Result};
