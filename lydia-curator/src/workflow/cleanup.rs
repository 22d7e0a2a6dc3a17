//! Cleaning passes over the artists and albums directories
//!
//! Each folder is its own error boundary: a failure is logged, counted and
//! the pass moves on to the next folder.

use std::path::Path;

use tracing::{error, info};

use crate::error::CurateResult;
use crate::models::{Folder, FolderKind};
use crate::services::cleaning_engine::{CleanReport, CleaningEngine, FolderState};
use crate::services::folder_mutator::Confirm;
use crate::services::metadata_extractor::MetadataProbe;

/// Tally of one cleaning pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub clean: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub unresolved: usize,
    pub failed: usize,
    pub mutations: usize,
    pub warnings: usize,
}

impl RunSummary {
    fn record(&mut self, report: &CleanReport) {
        self.processed += 1;
        self.mutations += report.applied_mutations();
        self.warnings += report.warnings.len();
        match report.state {
            FolderState::Clean => self.clean += 1,
            FolderState::Deleted => self.deleted += 1,
            FolderState::Skipped => self.skipped += 1,
            FolderState::Unresolved(_) => self.unresolved += 1,
        }
    }

    fn record_failure(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }

    /// Emit the end-of-run summary event
    pub fn log(&self, pass: &str) {
        info!(
            pass,
            processed = self.processed,
            clean = self.clean,
            deleted = self.deleted,
            skipped = self.skipped,
            unresolved = self.unresolved,
            failed = self.failed,
            mutations = self.mutations,
            warnings = self.warnings,
            "Pass complete"
        );
    }
}

/// Clean every album folder directly under `albums_root`
pub fn clean_albums<P: MetadataProbe, C: Confirm>(
    engine: &mut CleaningEngine<P, C>,
    albums_root: &Path,
) -> CurateResult<RunSummary> {
    let mut summary = RunSummary::default();

    for path in engine.scanner().list_subdirectories(albums_root)? {
        clean_one(engine, &path, FolderKind::Album, &mut summary);
    }

    summary.log("albums");
    Ok(summary)
}

/// Clean every artist folder, then the albums inside each one that survives
///
/// Opted-out and deleted artists are not descended into.
pub fn clean_artists<P: MetadataProbe, C: Confirm>(
    engine: &mut CleaningEngine<P, C>,
    artists_root: &Path,
) -> CurateResult<RunSummary> {
    let mut summary = RunSummary::default();

    for path in engine.scanner().list_subdirectories(artists_root)? {
        let Some((artist, state)) = clean_one(engine, &path, FolderKind::Artist, &mut summary) else {
            continue;
        };
        if matches!(state, FolderState::Deleted | FolderState::Skipped) {
            continue;
        }

        let albums = match artist.children(engine.scanner()) {
            Ok(albums) => albums,
            Err(e) => {
                error!(path = %artist.path().display(), error = %e, "Cannot list albums");
                summary.failed += 1;
                continue;
            }
        };
        for album in albums {
            clean_one(engine, &artist.path().join(album), FolderKind::Album, &mut summary);
        }
    }

    summary.log("artists");
    Ok(summary)
}

/// `None` when the folder could not be opened or cleaning failed
fn clean_one<P: MetadataProbe, C: Confirm>(
    engine: &mut CleaningEngine<P, C>,
    path: &Path,
    kind: FolderKind,
    summary: &mut RunSummary,
) -> Option<(Folder, FolderState)> {
    let mut folder = match Folder::open(path, kind, engine.scanner()) {
        Ok(folder) => folder,
        Err(e) => {
            error!(path = %path.display(), kind = %kind, error = %e, "Cannot open folder");
            summary.record_failure();
            return None;
        }
    };

    match engine.clean(&mut folder) {
        Ok(report) => {
            summary.record(&report);
            Some((folder, report.state))
        }
        Err(e) => {
            error!(path = %path.display(), kind = %kind, error = %e, "Failed to clean folder");
            summary.record_failure();
            None
        }
    }
}
