//! Folder handle shared by validation, inference and mutation

use std::path::{Path, PathBuf};

use crate::error::{CurateError, CurateResult, Operation};
use crate::services::file_scanner::FileScanner;

/// Role of a folder in the library layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderKind {
    /// Top-level directory grouping one artist's albums
    Artist,
    /// Directory holding one album's audio files
    Album,
}

impl std::fmt::Display for FolderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FolderKind::Artist => write!(f, "artist"),
            FolderKind::Album => write!(f, "album"),
        }
    }
}

/// One directory on disk
///
/// `path` and `basename` are only ever replaced together (see `relocate`);
/// the parent path is derived from `path`. The recursive file listing is
/// a snapshot taken at construction and stored relative to the folder, so
/// renames and moves do not invalidate it.
#[derive(Debug, Clone)]
pub struct Folder {
    path: PathBuf,
    basename: String,
    kind: FolderKind,
    files: Vec<PathBuf>,
    deleted: bool,
}

impl Folder {
    /// Open a folder handle and snapshot its recursive file listing
    pub fn open(path: impl Into<PathBuf>, kind: FolderKind, scanner: &FileScanner) -> CurateResult<Self> {
        let path = absolute(path.into())?;
        let basename = basename_of(&path)?;

        let files = scanner
            .scan_files(&path)?
            .into_iter()
            .filter_map(|file| file.strip_prefix(&path).ok().map(Path::to_path_buf))
            .collect();

        Ok(Self {
            path,
            basename,
            kind,
            files,
            deleted: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parent_path(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn kind(&self) -> FolderKind {
        self.kind
    }

    /// Snapshot of contained files, relative to the folder
    pub fn relative_files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Snapshot of contained files as absolute paths under the current location
    pub fn files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.files.iter().map(|relative| self.path.join(relative))
    }

    /// Fresh listing of immediate subdirectory names
    pub fn children(&self, scanner: &FileScanner) -> CurateResult<Vec<String>> {
        self.ensure_present()?;
        Ok(scanner.list_dir(&self.path)?.subdirectories)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Underscore-prefixed folders are never touched
    pub fn is_opted_out(&self) -> bool {
        self.basename.starts_with('_')
    }

    pub fn ensure_present(&self) -> CurateResult<()> {
        if self.deleted {
            return Err(CurateError::FolderDeleted {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    /// Point the handle at its new location after a rename or move
    pub(crate) fn relocate(&mut self, new_path: PathBuf) -> CurateResult<()> {
        let basename = basename_of(&new_path)?;
        self.path = new_path;
        self.basename = basename;
        Ok(())
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
        self.files.clear();
    }

    /// Retake the file snapshot (after a merge changed the contents)
    pub(crate) fn refresh_files(&mut self, scanner: &FileScanner) -> CurateResult<()> {
        self.files = scanner
            .scan_files(&self.path)?
            .into_iter()
            .filter_map(|file| file.strip_prefix(&self.path).ok().map(Path::to_path_buf))
            .collect();
        Ok(())
    }
}

fn absolute(path: PathBuf) -> CurateResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(|e| CurateError::io(Operation::List, &path, e))?;
    Ok(cwd.join(path))
}

fn basename_of(path: &Path) -> CurateResult<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| CurateError::UnsafeName(path.display().to_string()))
}
