//! Moving albums through the staging directory
//!
//! - stage: clean albums leave the albums directory for
//!   `staging/<artist>/`, the artist taken from their tags
//! - unstage: `staging/<artist>/<album>` goes back to the albums directory
//! - archive: `staging/<artist>/<album>` goes to `artists/<artist>/`
//!
//! Artist folders left empty in staging are removed afterwards.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::CurateResult;
use crate::models::{Folder, FolderKind};
use crate::services::cleaning_engine::CleaningEngine;
use crate::services::folder_mutator::{validate_basename, Confirm, MutationOutcome};
use crate::services::metadata_extractor::MetadataProbe;
use lydia_common::Behavior;

/// Counts for one staging run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub moved: usize,
    pub left_in_place: usize,
    pub failed: usize,
}

impl TransferSummary {
    fn record(&mut self, outcome: MutationOutcome) {
        if outcome.is_applied() {
            self.moved += 1;
        } else {
            self.left_in_place += 1;
        }
    }
}

/// Move every clean album with a known artist into `staging_root/<artist>/`
pub fn stage_albums<P: MetadataProbe, C: Confirm>(
    engine: &mut CleaningEngine<P, C>,
    albums_root: &Path,
    staging_root: &Path,
    mode: Behavior,
) -> CurateResult<TransferSummary> {
    let mut summary = TransferSummary::default();

    for path in engine.scanner().list_subdirectories(albums_root)? {
        let mut folder = match Folder::open(&path, FolderKind::Album, engine.scanner()) {
            Ok(folder) => folder,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read album");
                summary.failed += 1;
                continue;
            }
        };

        if folder.is_opted_out() {
            info!(path = %path.display(), "Skipped (name starts with '_')");
            summary.left_in_place += 1;
            continue;
        }

        let violations = match engine.validator().validate(&folder) {
            Ok(violations) => violations,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot validate album");
                summary.failed += 1;
                continue;
            }
        };
        if !violations.is_empty() {
            warn!(path = %path.display(), violations = ?violations, "Not staged, album needs cleaning first");
            summary.left_in_place += 1;
            continue;
        }

        let metadata = engine.probe().probe_folder(&folder, engine.scanner());
        let Some(artist) = metadata.artist.map(|a| a.trim().to_lowercase()) else {
            warn!(path = %path.display(), "Not staged, no artist in tags");
            summary.left_in_place += 1;
            continue;
        };
        if let Err(e) = validate_basename(&artist) {
            warn!(path = %path.display(), error = %e, "Not staged, artist can't be a folder name");
            summary.left_in_place += 1;
            continue;
        }

        match engine.mutator().move_to(&mut folder, &staging_root.join(&artist), mode) {
            Ok(outcome) => summary.record(outcome),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to stage album");
                summary.failed += 1;
            }
        }
    }

    info!(
        moved = summary.moved,
        left = summary.left_in_place,
        failed = summary.failed,
        "Staging complete"
    );
    Ok(summary)
}

/// Move staged albums back to the albums directory
pub fn unstage_albums<P: MetadataProbe, C: Confirm>(
    engine: &mut CleaningEngine<P, C>,
    staging_root: &Path,
    albums_root: &Path,
    mode: Behavior,
) -> CurateResult<TransferSummary> {
    drain_staging(engine, staging_root, mode, |_artist| albums_root.to_path_buf())
}

/// Move staged albums under their artist in the artists directory
pub fn archive_albums<P: MetadataProbe, C: Confirm>(
    engine: &mut CleaningEngine<P, C>,
    staging_root: &Path,
    artists_root: &Path,
    mode: Behavior,
) -> CurateResult<TransferSummary> {
    drain_staging(engine, staging_root, mode, |artist| artists_root.join(artist))
}

fn drain_staging<P, C, F>(
    engine: &mut CleaningEngine<P, C>,
    staging_root: &Path,
    mode: Behavior,
    target_for: F,
) -> CurateResult<TransferSummary>
where
    P: MetadataProbe,
    C: Confirm,
    F: Fn(&str) -> PathBuf,
{
    let mut summary = TransferSummary::default();

    for artist_path in engine.scanner().list_subdirectories(staging_root)? {
        let mut artist = match Folder::open(&artist_path, FolderKind::Artist, engine.scanner()) {
            Ok(folder) => folder,
            Err(e) => {
                warn!(path = %artist_path.display(), error = %e, "Cannot read staged artist");
                summary.failed += 1;
                continue;
            }
        };
        let target = target_for(artist.basename());

        let albums = match artist.children(engine.scanner()) {
            Ok(albums) => albums,
            Err(e) => {
                warn!(path = %artist_path.display(), error = %e, "Cannot list staged albums");
                summary.failed += 1;
                continue;
            }
        };

        for album in albums {
            let album_path = artist_path.join(&album);
            let result = Folder::open(&album_path, FolderKind::Album, engine.scanner())
                .and_then(|mut folder| engine.mutator().move_to(&mut folder, &target, mode));

            match result {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    warn!(path = %album_path.display(), error = %e, "Failed to move staged album");
                    summary.failed += 1;
                }
            }
        }

        if let Err(e) = remove_if_empty(engine, &mut artist) {
            warn!(path = %artist_path.display(), error = %e, "Failed to remove emptied staging folder");
        }
    }

    info!(
        moved = summary.moved,
        left = summary.left_in_place,
        failed = summary.failed,
        "Staged albums moved"
    );
    Ok(summary)
}

fn remove_if_empty<P: MetadataProbe, C: Confirm>(
    engine: &mut CleaningEngine<P, C>,
    artist: &mut Folder,
) -> CurateResult<()> {
    if engine.scanner().list_dir(artist.path())?.is_empty() {
        info!(path = %artist.path().display(), "Removing emptied staging folder");
        engine.mutator().delete(artist, Behavior::Force)?;
    }
    Ok(())
}
