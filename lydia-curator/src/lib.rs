//! lydia-curator library interface
//!
//! Validates and repairs artist/album folders of a music library, stages
//! clean albums by artist and writes inventory snapshots. The `lydia`
//! binary is a thin CLI over this crate.

pub mod error;
pub mod models;
pub mod services;
pub mod validators;
pub mod workflow;

pub use crate::error::{CurateError, CurateResult, Operation};
pub use crate::models::{Folder, FolderKind};
pub use crate::services::{CleanReport, CleaningEngine, FolderState};
pub use crate::validators::{FolderValidator, ValidationViolation};
