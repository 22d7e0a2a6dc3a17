//! Folder validation layer

pub mod folder_validator;

pub use folder_validator::{FolderValidator, ValidationViolation};
