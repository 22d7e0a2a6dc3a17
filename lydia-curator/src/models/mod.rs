//! Domain models

pub mod folder;

pub use folder::{Folder, FolderKind};
