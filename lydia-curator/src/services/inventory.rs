//! Library inventory snapshot
//!
//! Read-only projection of the library: artist → album names, plus the
//! flat list of unsorted albums. Never validates or mutates anything.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{CurateError, CurateResult, Operation};
use crate::services::file_scanner::FileScanner;

pub const ARTISTS_FILE: &str = "artists.json";
pub const ALBUMS_FILE: &str = "albums.json";

/// Artist → album basenames, and the flat album list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    pub artists: BTreeMap<String, Vec<String>>,
    pub albums: Vec<String>,
}

/// Builds inventory snapshots from the artist and album trees
pub struct InventoryBuilder {
    scanner: FileScanner,
}

impl InventoryBuilder {
    pub fn new(scanner: FileScanner) -> Self {
        Self { scanner }
    }

    /// List both trees one level deep
    ///
    /// An unreadable root fails the build; an unreadable artist folder is
    /// logged and left out.
    pub fn build(&self, artists_root: &Path, albums_root: &Path) -> CurateResult<InventorySnapshot> {
        let mut snapshot = InventorySnapshot::default();

        for artist in self.scanner.list_dir(artists_root)?.subdirectories {
            match self.scanner.list_dir(&artists_root.join(&artist)) {
                Ok(listing) => {
                    snapshot.artists.insert(artist, listing.subdirectories);
                }
                Err(e) => {
                    warn!(artist = %artist, error = %e, "Leaving artist out of inventory");
                }
            }
        }

        snapshot.albums = self.scanner.list_dir(albums_root)?.subdirectories;

        info!(
            artists = snapshot.artists.len(),
            albums = snapshot.albums.len(),
            "Inventory built"
        );
        Ok(snapshot)
    }
}

/// Write `artists.json` and `albums.json` (pretty-printed) into `directory`
pub fn write_inventory(snapshot: &InventorySnapshot, directory: &Path) -> CurateResult<Vec<PathBuf>> {
    fs::create_dir_all(directory).map_err(|e| CurateError::io(Operation::CreateDir, directory, e))?;

    let artists_path = directory.join(ARTISTS_FILE);
    write_json(&artists_path, &snapshot.artists)?;

    let albums_path = directory.join(ALBUMS_FILE);
    write_json(&albums_path, &snapshot.albums)?;

    info!(directory = %directory.display(), "Inventory written");
    Ok(vec![artists_path, albums_path])
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> CurateResult<()> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    fs::write(path, content).map_err(|e| CurateError::io(Operation::Write, path, e))
}
