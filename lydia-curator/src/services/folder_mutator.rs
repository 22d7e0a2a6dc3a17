//! Folder mutations: rename, delete, move
//!
//! Each mutation takes a `Behavior` deciding whether it runs at all
//! (`Skip`), only after confirmation (`Prompt`) or unconditionally
//! (`Force`). Confirmation goes through the injected `Confirm`
//! implementation so the mechanism stays testable without a terminal.
//!
//! On success the `Folder` handle is updated in place; on failure the
//! filesystem error is returned and the handle is left untouched.

use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::error::{CurateError, CurateResult, Operation};
use crate::models::Folder;
use crate::services::file_scanner::FileScanner;
use lydia_common::{Behavior, CollisionPolicy};

/// Source of yes/no answers for `Prompt` mode
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

/// Asks on stdout and reads the answer from stdin
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        print!("{} [y/N] ", question);
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(_) => false,
        }
    }
}

/// Only "y" and "yes" (any case) count as consent
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Result of a mutation request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Filesystem changed and the folder handle updated
    Applied,
    /// Prompt answered with anything but yes
    Declined,
    /// Disabled by configuration, or nothing to do
    Skipped,
    /// Dry run: logged, nothing touched
    DryRun,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

/// Applies single corrective actions to folders
pub struct FolderMutator<C: Confirm> {
    confirm: C,
    collision_policy: CollisionPolicy,
    scanner: FileScanner,
    dry_run: bool,
}

impl<C: Confirm> FolderMutator<C> {
    pub fn new(confirm: C, collision_policy: CollisionPolicy, scanner: FileScanner) -> Self {
        Self {
            confirm,
            collision_policy,
            scanner,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Rename within the same parent directory
    pub fn rename(
        &mut self,
        folder: &mut Folder,
        new_basename: &str,
        mode: Behavior,
    ) -> CurateResult<MutationOutcome> {
        folder.ensure_present()?;
        validate_basename(new_basename)?;

        if new_basename == folder.basename() {
            return Ok(MutationOutcome::Skipped);
        }

        let question = format!(
            "Would you like to rename '{}' to '{}' in '{}'?",
            folder.basename(),
            new_basename,
            folder.parent_path().display()
        );
        if let Some(outcome) = self.authorize(mode, &question) {
            return Ok(outcome);
        }

        let destination = folder.parent_path().join(new_basename);
        self.relocate(folder, &destination, Operation::Rename)
    }

    /// Recursively remove the folder
    pub fn delete(&mut self, folder: &mut Folder, mode: Behavior) -> CurateResult<MutationOutcome> {
        folder.ensure_present()?;

        let question = format!("Would you like to delete '{}'?", folder.path().display());
        if let Some(outcome) = self.authorize(mode, &question) {
            return Ok(outcome);
        }

        info!(path = %folder.path().display(), "Deleting folder");
        fs::remove_dir_all(folder.path())
            .map_err(|e| CurateError::io(Operation::Delete, folder.path(), e))?;
        info!(path = %folder.path().display(), "Deleted folder");

        folder.mark_deleted();
        Ok(MutationOutcome::Applied)
    }

    /// Move under `new_parent`, keeping the basename
    pub fn move_to(
        &mut self,
        folder: &mut Folder,
        new_parent: &Path,
        mode: Behavior,
    ) -> CurateResult<MutationOutcome> {
        folder.ensure_present()?;

        if new_parent == folder.parent_path() {
            return Ok(MutationOutcome::Skipped);
        }

        let question = format!(
            "Would you like to move '{}' to '{}'?",
            folder.path().display(),
            new_parent.display()
        );
        if let Some(outcome) = self.authorize(mode, &question) {
            return Ok(outcome);
        }

        fs::create_dir_all(new_parent)
            .map_err(|e| CurateError::io(Operation::CreateDir, new_parent, e))?;

        let destination = new_parent.join(folder.basename());
        self.relocate(folder, &destination, Operation::Move)
    }

    /// `Some(outcome)` when the mutation must not run
    fn authorize(&mut self, mode: Behavior, question: &str) -> Option<MutationOutcome> {
        match mode {
            Behavior::Skip => return Some(MutationOutcome::Skipped),
            Behavior::Prompt | Behavior::Force => {}
        }

        if self.dry_run {
            info!("Dry run, not applied: {}", question);
            return Some(MutationOutcome::DryRun);
        }

        if mode == Behavior::Prompt && !self.confirm.confirm(question) {
            info!("Okay, leaving it as is: {}", question);
            return Some(MutationOutcome::Declined);
        }

        None
    }

    fn relocate(
        &mut self,
        folder: &mut Folder,
        destination: &Path,
        operation: Operation,
    ) -> CurateResult<MutationOutcome> {
        if destination.symlink_metadata().is_ok() && !same_directory(folder.path(), destination) {
            match self.collision_policy {
                CollisionPolicy::Fail => {
                    warn!(
                        path = %folder.path().display(),
                        destination = %destination.display(),
                        "Destination already exists, leaving folder in place"
                    );
                    return Err(CurateError::NameCollision {
                        path: destination.to_path_buf(),
                    });
                }
                CollisionPolicy::Overwrite => {
                    warn!(destination = %destination.display(), "Removing existing destination before {}", operation);
                    remove_path(destination)?;
                }
                CollisionPolicy::Merge => {
                    return self.merge_into(folder, destination);
                }
            }
        }

        let source = folder.path().to_path_buf();
        fs::rename(&source, destination).map_err(|e| CurateError::io(operation, &source, e))?;
        folder.relocate(destination.to_path_buf())?;

        info!(
            from = %source.display(),
            to = %destination.display(),
            "Successfully completed {}",
            operation
        );
        Ok(MutationOutcome::Applied)
    }

    /// Move every entry into an existing destination directory, then drop the source
    ///
    /// Nothing is moved unless every entry fits without collision.
    fn merge_into(&mut self, folder: &mut Folder, destination: &Path) -> CurateResult<MutationOutcome> {
        if !destination.is_dir() {
            return Err(CurateError::NameCollision {
                path: destination.to_path_buf(),
            });
        }

        let source = folder.path().to_path_buf();
        let listing = self.scanner.list_dir(&source)?;
        let entries: Vec<String> = listing
            .subdirectories
            .into_iter()
            .chain(listing.files)
            .collect();

        if let Some(conflict) = entries
            .iter()
            .map(|name| destination.join(name))
            .find(|target| target.symlink_metadata().is_ok())
        {
            warn!(
                path = %source.display(),
                conflict = %conflict.display(),
                "Cannot merge, entry already exists in destination"
            );
            return Err(CurateError::NameCollision { path: conflict });
        }

        let mut moved = Vec::with_capacity(entries.len());
        for name in &entries {
            let from = source.join(name);
            if let Err(e) = fs::rename(&from, destination.join(name)) {
                self.undo_merge(folder, &moved, destination);
                return Err(CurateError::io(Operation::Move, &from, e));
            }
            moved.push(name.as_str());
        }
        if let Err(e) = fs::remove_dir(&source) {
            self.undo_merge(folder, &moved, destination);
            return Err(CurateError::io(Operation::Delete, &source, e));
        }

        folder.relocate(destination.to_path_buf())?;
        folder.refresh_files(&self.scanner)?;

        info!(
            from = %source.display(),
            to = %destination.display(),
            entries = entries.len(),
            "Merged folder into existing destination"
        );
        Ok(MutationOutcome::Applied)
    }

    /// Return already merged entries to the source after a failed merge
    fn undo_merge(&self, folder: &mut Folder, moved: &[&str], destination: &Path) {
        for name in moved.iter().rev() {
            let from = destination.join(name);
            let back = folder.path().join(name);
            match fs::rename(&from, &back) {
                Ok(()) => info!(entry = %back.display(), "Returned entry after failed merge"),
                Err(e) => warn!(
                    entry = %from.display(),
                    to = %back.display(),
                    error = %e,
                    "Could not return entry after failed merge"
                ),
            }
        }

        if let Err(e) = folder.refresh_files(&self.scanner) {
            warn!(path = %folder.path().display(), error = %e, "Could not refresh file snapshot");
        }
    }
}

/// Reject names that are not a single ordinary path component
pub fn validate_basename(name: &str) -> CurateResult<()> {
    if name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains('\0')
        || name.chars().any(std::path::is_separator)
    {
        return Err(CurateError::UnsafeName(name.to_string()));
    }
    Ok(())
}

fn remove_path(path: &Path) -> CurateResult<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| CurateError::io(Operation::Delete, path, e))
}

/// Both paths name the same directory (case-only renames on
/// case-insensitive filesystems)
#[cfg(unix)]
fn same_directory(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_directory(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
