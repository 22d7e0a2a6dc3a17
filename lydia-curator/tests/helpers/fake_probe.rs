//! In-memory metadata probe
//!
//! Answers for any file whose path contains a registered fragment; every
//! other file is treated as unreadable.

use std::path::Path;

use lydia_curator::services::{MetadataError, MetadataProbe, ProbedMetadata};

#[derive(Debug, Clone, Default)]
pub struct FakeProbe {
    entries: Vec<(String, ProbedMetadata)>,
}

impl FakeProbe {
    /// Probe that fails on every file
    pub fn unreadable() -> Self {
        Self::default()
    }

    /// Probe that reads no tags from any file
    pub fn blank() -> Self {
        Self::default().with("", ProbedMetadata::default())
    }

    pub fn with(mut self, fragment: &str, metadata: ProbedMetadata) -> Self {
        self.entries.push((fragment.to_string(), metadata));
        self
    }

    pub fn with_artist(self, fragment: &str, artist: &str) -> Self {
        self.with(
            fragment,
            ProbedMetadata {
                artist: Some(artist.to_string()),
                ..ProbedMetadata::default()
            },
        )
    }
}

impl MetadataProbe for FakeProbe {
    fn probe(&self, file_path: &Path) -> Result<ProbedMetadata, MetadataError> {
        let path = file_path.to_string_lossy();
        self.entries
            .iter()
            .find(|(fragment, _)| path.contains(fragment.as_str()))
            .map(|(_, metadata)| metadata.clone())
            .ok_or_else(|| MetadataError::ReadError(format!("no fixture for {}", path)))
    }
}

/// Tags with the given year and album
pub fn tags(year: Option<&str>, album: Option<&str>) -> ProbedMetadata {
    ProbedMetadata {
        artist: None,
        album: album.map(str::to_string),
        year: year.map(str::to_string),
    }
}
