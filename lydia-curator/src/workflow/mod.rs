//! Library-wide passes built on the cleaning engine

pub mod cleanup;

pub use cleanup::{clean_albums, clean_artists, RunSummary};
