//! Folder validation rules
//!
//! Violations come back in a fixed order so that cleaning priority is
//! deterministic:
//!
//! | Kind   | Rules (in order)                                                   |
//! |--------|--------------------------------------------------------------------|
//! | Album  | lowercase, year-title, no subdirectories, not empty, has audio, no doubled year prefix |
//! | Artist | lowercase, not empty, no loose files                               |

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CurateResult;
use crate::models::{Folder, FolderKind};
use crate::services::file_scanner::FileScanner;

static YEAR_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(17|18|19|20)[0-9]{2} - .+$").expect("valid regex"));

static YEAR_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4} - $").expect("valid regex"));

/// Length of a `"YYYY - "` prefix in characters
pub const YEAR_PREFIX_LEN: usize = 7;

/// A rule a folder breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationViolation {
    NameNotLowercase,
    NameMissingYearTitle,
    HasUnexpectedSubdirectories,
    IsEmpty,
    NoAudioFiles,
    /// Artist folders only
    HasLooseFiles,
    NameHasDuplicatedYearPrefix,
}

impl ValidationViolation {
    /// One-line human-readable reason
    pub fn describe(&self) -> &'static str {
        match self {
            ValidationViolation::NameNotLowercase => "name has uppercase letters",
            ValidationViolation::NameMissingYearTitle => "name isn't in format 'YYYY - title'",
            ValidationViolation::HasUnexpectedSubdirectories => "contains subdirectories",
            ValidationViolation::IsEmpty => "is empty",
            ValidationViolation::NoAudioFiles => "contains no audio files",
            ValidationViolation::HasLooseFiles => "contains loose files next to album folders",
            ValidationViolation::NameHasDuplicatedYearPrefix => "name repeats its 'YYYY - ' prefix",
        }
    }
}

impl std::fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Evaluates folders against the rule set for their kind
#[derive(Debug, Clone)]
pub struct FolderValidator {
    scanner: FileScanner,
}

impl FolderValidator {
    pub fn new(scanner: FileScanner) -> Self {
        Self { scanner }
    }

    /// Validate against a fresh read of the directory
    pub fn validate(&self, folder: &Folder) -> CurateResult<Vec<ValidationViolation>> {
        folder.ensure_present()?;

        let basename = folder.basename();
        let listing = self.scanner.list_dir(folder.path())?;
        let mut violations = Vec::new();

        if !is_lowercase_name(basename) {
            violations.push(ValidationViolation::NameNotLowercase);
        }

        match folder.kind() {
            FolderKind::Album => {
                if !has_year_and_title(basename) {
                    violations.push(ValidationViolation::NameMissingYearTitle);
                }

                if !listing.subdirectories.is_empty() {
                    violations.push(ValidationViolation::HasUnexpectedSubdirectories);
                }

                if listing.is_empty() {
                    violations.push(ValidationViolation::IsEmpty);
                }

                if self.scanner.scan_audio_files(folder.path())?.is_empty() {
                    violations.push(ValidationViolation::NoAudioFiles);
                }

                if has_duplicated_year_prefix(basename) {
                    violations.push(ValidationViolation::NameHasDuplicatedYearPrefix);
                }
            }
            FolderKind::Artist => {
                if listing.is_empty() {
                    violations.push(ValidationViolation::IsEmpty);
                }

                if !listing.files.is_empty() {
                    violations.push(ValidationViolation::HasLooseFiles);
                }
            }
        }

        if !violations.is_empty() {
            tracing::debug!(
                path = %folder.path().display(),
                violations = ?violations,
                "Folder failed validation"
            );
        }

        Ok(violations)
    }
}

/// Chinese/Japanese/Korean ranges (radicals through unified ideographs)
pub fn contains_cjk(name: &str) -> bool {
    name.chars().any(|c| ('\u{2E80}'..='\u{9FFF}').contains(&c))
}

/// Every letter is already in lowercase form; names with any CJK character
/// always pass
///
/// Uppercase and titlecase letters (`ǅ`) fail. Letters of caseless scripts
/// have no lowercase mapping and pass, so lowercasing always converges.
pub fn is_lowercase_name(name: &str) -> bool {
    if contains_cjk(name) {
        return true;
    }
    !name.chars().any(has_lowercase_form)
}

fn has_lowercase_form(c: char) -> bool {
    c.is_alphabetic() && !c.is_lowercase() && c.to_lowercase().ne([c])
}

/// `YYYY - title` with the year in 1700..=2099
pub fn has_year_and_title(name: &str) -> bool {
    YEAR_TITLE.is_match(name)
}

/// `YYYY - YYYY - ...`: the first seven characters repeat at 7..14
pub fn has_duplicated_year_prefix(name: &str) -> bool {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() < YEAR_PREFIX_LEN * 2 {
        return false;
    }

    let first: String = chars[..YEAR_PREFIX_LEN].iter().collect();
    let second: String = chars[YEAR_PREFIX_LEN..YEAR_PREFIX_LEN * 2].iter().collect();

    first == second && YEAR_PREFIX.is_match(&first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn open(path: &std::path::Path, kind: FolderKind) -> Folder {
        Folder::open(path, kind, &FileScanner::default()).unwrap()
    }

    #[test]
    fn test_lowercase_rule() {
        assert!(is_lowercase_name("1994 - mule variations"));
        assert!(is_lowercase_name("1999 - 123 !?"));
        assert!(!is_lowercase_name("1994 - Mule Variations"));
        assert!(is_lowercase_name("1994 - ÉCOUTE 東京"));
        assert!(!is_lowercase_name("1994 - ÉCOUTE"));
    }

    #[test]
    fn test_titlecase_letters_are_not_lowercase() {
        assert!(!is_lowercase_name("1994 - ǅemal"));
        assert!(is_lowercase_name("1994 - ǆemal"));
        assert!(is_lowercase_name("1994 - مرحبا"));
        assert!(is_lowercase_name(&"1994 - ǅemal".to_lowercase()));
    }

    #[test]
    fn test_year_title_rule() {
        assert!(has_year_and_title("1994 - mule variations"));
        assert!(has_year_and_title("1700 - x"));
        assert!(has_year_and_title("2099 - x"));
        assert!(!has_year_and_title("1699 - x"));
        assert!(!has_year_and_title("2100 - x"));
        assert!(!has_year_and_title("1994 - "));
        assert!(!has_year_and_title("1994-mule"));
        assert!(!has_year_and_title("(1994) - mule"));
        assert!(!has_year_and_title("19٨٥ - x"));
        assert!(!has_year_and_title("１９９４ - mule"));
    }

    #[test]
    fn test_duplicated_year_prefix() {
        assert!(has_duplicated_year_prefix("1994 - 1994 - mule variations"));
        assert!(!has_duplicated_year_prefix("1994 - 1995 - mule variations"));
        assert!(!has_duplicated_year_prefix("1994 - mule variations"));
        assert!(!has_duplicated_year_prefix("abcdefgabcdefg"));
        assert!(!has_duplicated_year_prefix("١٩٩٤ - ١٩٩٤ - mule"));
    }

    #[test]
    fn test_clean_album_has_no_violations() {
        let temp_dir = TempDir::new().unwrap();
        let album = temp_dir.path().join("1994 - mule variations");
        fs::create_dir(&album).unwrap();
        fs::write(album.join("01.mp3"), b"").unwrap();

        let validator = FolderValidator::new(FileScanner::default());
        assert!(validator.validate(&open(&album, FolderKind::Album)).unwrap().is_empty());
    }

    #[test]
    fn test_album_violations_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let album = temp_dir.path().join("Mule Variations");
        fs::create_dir_all(album.join("scans")).unwrap();

        let validator = FolderValidator::new(FileScanner::default());
        let violations = validator.validate(&open(&album, FolderKind::Album)).unwrap();

        assert_eq!(
            violations,
            vec![
                ValidationViolation::NameNotLowercase,
                ValidationViolation::NameMissingYearTitle,
                ValidationViolation::HasUnexpectedSubdirectories,
                ValidationViolation::NoAudioFiles,
            ]
        );
    }

    #[test]
    fn test_empty_album() {
        let temp_dir = TempDir::new().unwrap();
        let album = temp_dir.path().join("1994 - nothing");
        fs::create_dir(&album).unwrap();

        let validator = FolderValidator::new(FileScanner::default());
        let violations = validator.validate(&open(&album, FolderKind::Album)).unwrap();
        assert_eq!(
            violations,
            vec![ValidationViolation::IsEmpty, ValidationViolation::NoAudioFiles]
        );
    }

    #[test]
    fn test_artist_rules() {
        let temp_dir = TempDir::new().unwrap();
        let artist = temp_dir.path().join("Tom Waits");
        fs::create_dir_all(artist.join("1999 - mule variations")).unwrap();
        fs::write(artist.join("folder.jpg"), b"").unwrap();

        let validator = FolderValidator::new(FileScanner::default());
        let violations = validator.validate(&open(&artist, FolderKind::Artist)).unwrap();
        assert_eq!(
            violations,
            vec![
                ValidationViolation::NameNotLowercase,
                ValidationViolation::HasLooseFiles,
            ]
        );
    }

    #[test]
    fn test_validation_reads_fresh_listing() {
        let temp_dir = TempDir::new().unwrap();
        let album = temp_dir.path().join("1994 - mule variations");
        fs::create_dir(&album).unwrap();
        let folder = open(&album, FolderKind::Album);

        fs::write(album.join("01.flac"), b"").unwrap();

        let validator = FolderValidator::new(FileScanner::default());
        assert!(validator.validate(&folder).unwrap().is_empty());
    }
}
