//! Year/title inference for album folders
//!
//! Derives a `YYYY - title` basename from the current folder name, falling
//! back to embedded tags. Rules are tried in order and the first one that
//! produces both a year and a title wins:
//!
//! 1. `1994 - title`
//! 2. `(1994) - title` or `[1994] - title`
//! 3. recording year from the first readable audio file
//! 4. any `17xx`..`20xx` run in the name
//!
//! For rules 3 and 4 the title is the text after the first `" - "` in the
//! name, else the album tag. Tags are only read when rules 1 and 2 fail.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::Folder;
use crate::services::file_scanner::FileScanner;
use crate::services::metadata_extractor::{MetadataProbe, ProbedMetadata};

// ASCII digits only: `\d` would also accept Arabic-Indic or fullwidth digits
static STANDARD_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([0-9]{4}) - (.*)$").expect("valid regex"));

static BRACKETED_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(?:\(([0-9]{4})\)|\[([0-9]{4})\]) - (.*)$").expect("valid regex")
});

static TITLE_AFTER_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r" - (.*)").expect("valid regex"));

static BARE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(17|18|19|20)[0-9]{2}").expect("valid regex"));

const EARLIEST_YEAR: u32 = 1700;
const LATEST_YEAR: u32 = 2099;

/// Why no name could be inferred
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("no year found in folder name or tags")]
    NoYear,

    #[error("year {0} found but no title in folder name or tags")]
    NoTitle(String),

    #[error("candidate name '{0}' contains a path separator")]
    UnsafeName(String),
}

/// Which rule produced an inferred name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceSource {
    StandardPrefix,
    BracketedYear,
    EmbeddedTags,
    YearInName,
}

/// Year and title derived for a folder, title case preserved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredName {
    pub year: String,
    pub title: String,
    pub source: InferenceSource,
}

impl InferredName {
    /// Compose the normalized `YYYY - title` basename
    pub fn to_basename(&self) -> Result<String, InferenceError> {
        let title = normalize_title(&self.title);
        if title.is_empty() {
            return Err(InferenceError::NoTitle(self.year.clone()));
        }

        let candidate = format!("{} - {}", self.year, title);
        if candidate.contains('/') {
            return Err(InferenceError::UnsafeName(candidate));
        }
        Ok(candidate)
    }
}

/// Lowercase, `:` to `_`, trailing `?` removed
pub fn normalize_title(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .replace(':', "_")
        .trim_end_matches('?')
        .trim_end()
        .to_string()
}

/// Infer for a folder, probing its audio files only if needed
pub fn infer_for_folder<P: MetadataProbe + ?Sized>(
    folder: &Folder,
    probe: &P,
    scanner: &FileScanner,
) -> Result<InferredName, InferenceError> {
    infer_year_and_title(folder.basename(), || probe.probe_folder(folder, scanner))
}

/// Infer year and title from a basename, with tags supplied lazily
pub fn infer_year_and_title<F>(basename: &str, read_tags: F) -> Result<InferredName, InferenceError>
where
    F: FnOnce() -> ProbedMetadata,
{
    // Rule 1: "1994 - title"
    if let Some(caps) = STANDARD_PREFIX.captures(basename) {
        let year = &caps[1];
        let title = &caps[2];
        if is_valid_year(year) && !title.trim().is_empty() {
            return Ok(InferredName {
                year: year.to_string(),
                title: title.to_string(),
                source: InferenceSource::StandardPrefix,
            });
        }
    }

    // Rule 2: "(1994) - title" / "[1994] - title"
    if let Some(caps) = BRACKETED_PREFIX.captures(basename) {
        let year = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        let title = &caps[3];
        if is_valid_year(year) && !title.trim().is_empty() {
            return Ok(InferredName {
                year: year.to_string(),
                title: title.to_string(),
                source: InferenceSource::BracketedYear,
            });
        }
    }

    let tags = read_tags();
    let title = title_after_hyphen(basename).or_else(|| tags.album.clone());

    // Rule 3: recording year from tags
    if let Some(year) = tags.year.as_deref().and_then(leading_year) {
        return match title {
            Some(title) => Ok(InferredName {
                year,
                title,
                source: InferenceSource::EmbeddedTags,
            }),
            None => Err(InferenceError::NoTitle(year)),
        };
    }

    // Rule 4: anything in the name that looks like a year
    if let Some(found) = BARE_YEAR.find(basename) {
        let year = found.as_str().to_string();
        return match title {
            Some(title) => Ok(InferredName {
                year,
                title,
                source: InferenceSource::YearInName,
            }),
            None => Err(InferenceError::NoTitle(year)),
        };
    }

    Err(InferenceError::NoYear)
}

fn is_valid_year(year: &str) -> bool {
    year.len() == 4
        && year
            .parse::<u32>()
            .map(|y| (EARLIEST_YEAR..=LATEST_YEAR).contains(&y))
            .unwrap_or(false)
}

/// First four characters of a tag date ("1994", "1994-05-01") if they form a valid year
fn leading_year(value: &str) -> Option<String> {
    let year: String = value.trim().chars().take(4).collect();
    is_valid_year(&year).then_some(year)
}

fn title_after_hyphen(basename: &str) -> Option<String> {
    TITLE_AFTER_HYPHEN
        .captures(basename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}
