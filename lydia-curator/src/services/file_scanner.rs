//! Directory listing and audio file discovery
//!
//! Two kinds of reads:
//! - `list_dir`: immediate entries of one directory, split into
//!   subdirectories and files (used for validation, always fresh)
//! - `scan_files`: recursive file listing (folder snapshots, audio checks)

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{CurateError, CurateResult, Operation};
use lydia_common::LydiaConfig;

/// Immediate contents of one directory, names sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    pub subdirectories: Vec<String>,
    pub files: Vec<String>,
}

impl DirListing {
    pub fn is_empty(&self) -> bool {
        self.subdirectories.is_empty() && self.files.is_empty()
    }
}

/// Filesystem scanner
#[derive(Debug, Clone)]
pub struct FileScanner {
    ignore_patterns: Vec<String>,
    audio_extensions: Vec<String>,
}

impl FileScanner {
    /// Create scanner recognizing the given audio extensions (lowercase, no dot)
    ///
    /// Recursive scans skip system files like .DS_Store and Thumbs.db.
    pub fn new(audio_extensions: &[String]) -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                "desktop.ini".to_string(),
            ],
            audio_extensions: audio_extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &LydiaConfig) -> Self {
        Self::new(&config.audio_extensions)
    }

    /// Read the immediate entries of `path`
    ///
    /// Symlinks are classified by their target.
    pub fn list_dir(&self, path: &Path) -> CurateResult<DirListing> {
        let entries =
            std::fs::read_dir(path).map_err(|e| CurateError::io(Operation::List, path, e))?;

        let mut listing = DirListing::default();
        for entry in entries {
            let entry = entry.map_err(|e| CurateError::io(Operation::List, path, e))?;
            let name = entry.file_name().to_string_lossy().to_string();

            if entry.path().is_dir() {
                listing.subdirectories.push(name);
            } else {
                listing.files.push(name);
            }
        }

        listing.subdirectories.sort();
        listing.files.sort();
        Ok(listing)
    }

    /// Absolute paths of the immediate subdirectories of `path`, sorted
    pub fn list_subdirectories(&self, path: &Path) -> CurateResult<Vec<PathBuf>> {
        let listing = self.list_dir(path)?;
        Ok(listing
            .subdirectories
            .into_iter()
            .map(|name| path.join(name))
            .collect())
    }

    /// Recursive listing of every file under `root`, sorted
    ///
    /// An unreadable root is an error; unreadable nested entries are
    /// logged and skipped.
    pub fn scan_files(&self, root: &Path) -> CurateResult<Vec<PathBuf>> {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e));

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        files.push(entry.into_path());
                    }
                }
                Err(e) if e.depth() == 0 => {
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                    return Err(CurateError::io(Operation::List, root, source));
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        tracing::debug!(root = %root.display(), count = files.len(), "Scanned files");
        Ok(files)
    }

    /// Audio files under `root`, sorted
    pub fn scan_audio_files(&self, root: &Path) -> CurateResult<Vec<PathBuf>> {
        Ok(self
            .scan_files(root)?
            .into_iter()
            .filter(|p| self.is_audio_file(p))
            .collect())
    }

    /// Check extension against the configured audio set (case-insensitive)
    pub fn is_audio_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| self.is_audio_extension(&ext.to_string_lossy()))
            .unwrap_or(false)
    }

    fn is_audio_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.audio_extensions.iter().any(|known| *known == ext)
    }

    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        let file_name = entry.file_name().to_string_lossy();
        !self
            .ignore_patterns
            .iter()
            .any(|pattern| file_name == pattern.as_str())
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::from_config(&LydiaConfig::default())
    }
}
