//! Service modules for library curation
//!
//! Scanning and tag probing feed the validator; the cleaning engine and
//! staging passes change the filesystem only through `FolderMutator`.

pub mod cleaning_engine;
pub mod file_scanner;
pub mod folder_mutator;
pub mod inventory;
pub mod metadata_extractor;
pub mod name_inference;
pub mod staging;

pub use cleaning_engine::{CleanReport, CleaningEngine, Correction, FolderState};
pub use file_scanner::{DirListing, FileScanner};
pub use folder_mutator::{Confirm, FolderMutator, MutationOutcome, StdinConfirm};
pub use inventory::{write_inventory, InventoryBuilder, InventorySnapshot};
pub use metadata_extractor::{LoftyProbe, MetadataError, MetadataProbe, ProbedMetadata};
pub use name_inference::{InferenceError, InferenceSource, InferredName};
pub use staging::{archive_albums, stage_albums, unstage_albums, TransferSummary};
