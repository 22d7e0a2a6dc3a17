//! Embedded audio metadata probe
//!
//! Extracts artist, album and recording year from audio file tags using
//! lofty. All-empty results mean "no metadata available" and are not an
//! error.

use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::Path;
use thiserror::Error;

use crate::models::Folder;
use crate::services::file_scanner::FileScanner;

/// Metadata extraction errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// File could not be opened or its tags parsed
    #[error("Failed to read file: {0}")]
    ReadError(String),
}

/// Tag fields relevant to folder naming
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbedMetadata {
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Recording year as written in the tag
    pub year: Option<String>,
}

impl ProbedMetadata {
    pub fn is_empty(&self) -> bool {
        self.artist.is_none() && self.album.is_none() && self.year.is_none()
    }
}

/// Source of embedded metadata for a single audio file
pub trait MetadataProbe {
    fn probe(&self, file_path: &Path) -> Result<ProbedMetadata, MetadataError>;

    /// Probe the first readable audio file of a folder's snapshot
    ///
    /// Unreadable files are skipped; a folder with none readable yields
    /// empty metadata.
    fn probe_folder(&self, folder: &Folder, scanner: &FileScanner) -> ProbedMetadata {
        for file in folder.files().filter(|path| scanner.is_audio_file(path)) {
            match self.probe(&file) {
                Ok(metadata) => return metadata,
                Err(e) => {
                    tracing::debug!(file = %file.display(), error = %e, "Skipping unreadable audio file");
                }
            }
        }
        ProbedMetadata::default()
    }
}

/// Tag reader backed by lofty
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyProbe;

impl LoftyProbe {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataProbe for LoftyProbe {
    fn probe(&self, file_path: &Path) -> Result<ProbedMetadata, MetadataError> {
        let tagged_file = Probe::open(file_path)
            .map_err(|e| MetadataError::ReadError(e.to_string()))?
            .read()
            .map_err(|e| MetadataError::ReadError(e.to_string()))?;

        // Primary tag first (ID3v2 for MP3, Vorbis comments for FLAC)
        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            tracing::debug!(file = %file_path.display(), "No tags found in audio file");
            return Ok(ProbedMetadata::default());
        };

        let metadata = ProbedMetadata {
            artist: non_blank(tag.artist().map(|s| s.to_string())),
            album: non_blank(tag.album().map(|s| s.to_string())),
            year: tag.year().filter(|year| *year > 0).map(|year| year.to_string()),
        };

        tracing::debug!(
            file = %file_path.display(),
            artist = ?metadata.artist,
            album = ?metadata.album,
            year = ?metadata.year,
            "Extracted metadata"
        );

        Ok(metadata)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FolderKind;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct OnlyFile(PathBuf);

    impl MetadataProbe for OnlyFile {
        fn probe(&self, file_path: &Path) -> Result<ProbedMetadata, MetadataError> {
            if file_path == self.0 {
                Ok(ProbedMetadata {
                    year: Some("1999".to_string()),
                    ..ProbedMetadata::default()
                })
            } else {
                Err(MetadataError::ReadError("unreadable".to_string()))
            }
        }
    }

    #[test]
    fn test_probe_nonexistent_file() {
        let result = LoftyProbe::new().probe(Path::new("/nonexistent/file.mp3"));
        assert!(result.is_err());
    }

    #[test]
    fn test_probe_folder_skips_unreadable_files() {
        let temp_dir = TempDir::new().unwrap();
        let album = temp_dir.path().join("album");
        fs::create_dir(&album).unwrap();
        fs::write(album.join("01.mp3"), b"").unwrap();
        fs::write(album.join("02.mp3"), b"").unwrap();
        fs::write(album.join("00.txt"), b"").unwrap();

        let scanner = FileScanner::default();
        let folder = Folder::open(&album, FolderKind::Album, &scanner).unwrap();
        let probe = OnlyFile(album.join("02.mp3"));

        let metadata = probe.probe_folder(&folder, &scanner);
        assert_eq!(metadata.year.as_deref(), Some("1999"));
    }

    #[test]
    fn test_probe_folder_without_audio_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = FileScanner::default();
        let folder = Folder::open(temp_dir.path(), FolderKind::Album, &scanner).unwrap();

        let metadata = LoftyProbe::new().probe_folder(&folder, &scanner);
        assert!(metadata.is_empty());
    }
}
