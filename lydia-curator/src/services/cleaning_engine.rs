//! Per-folder cleaning state machine
//!
//! ```text
//! Unvalidated -> Validated -> Clean
//!                          -> Mutating -> Validated (loop)
//!                          -> Deleted | Skipped | Unresolved
//! ```
//!
//! Priority: deletion (empty, then no audio) beats every rename; then
//! lowercase, doubled year prefix, year-title inference. Each correction
//! is attempted at most once per folder, which bounds the loop. Every
//! applied rename is followed by a fresh validation.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::{CurateError, CurateResult};
use crate::models::Folder;
use crate::services::file_scanner::FileScanner;
use crate::services::folder_mutator::{Confirm, FolderMutator, MutationOutcome};
use crate::services::metadata_extractor::MetadataProbe;
use crate::services::name_inference;
use crate::validators::folder_validator::YEAR_PREFIX_LEN;
use crate::validators::{FolderValidator, ValidationViolation};
use lydia_common::config::AlbumValidationBehavior;
use lydia_common::{Behavior, LydiaConfig};

/// Corrective action, declared in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Correction {
    RemoveEmpty,
    RemoveNoAudio,
    Lowercase,
    DedupeYearPrefix,
    YearPlusTitle,
}

impl Correction {
    fn is_deletion(&self) -> bool {
        matches!(self, Correction::RemoveEmpty | Correction::RemoveNoAudio)
    }
}

/// Where a folder ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderState {
    /// No violations (possibly after corrections)
    Clean,
    Deleted,
    /// Opted out with a leading underscore
    Skipped,
    /// Violations remain after every applicable correction was attempted
    Unresolved(Vec<ValidationViolation>),
}

/// What happened to one folder
#[derive(Debug, Clone)]
pub struct CleanReport {
    pub original_path: PathBuf,
    pub final_path: PathBuf,
    pub state: FolderState,
    pub mutations: Vec<(Correction, MutationOutcome)>,
    pub warnings: Vec<String>,
}

impl CleanReport {
    fn new(folder: &Folder) -> Self {
        Self {
            original_path: folder.path().to_path_buf(),
            final_path: folder.path().to_path_buf(),
            state: FolderState::Clean,
            mutations: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Number of mutations that changed the filesystem
    pub fn applied_mutations(&self) -> usize {
        self.mutations
            .iter()
            .filter(|(_, outcome)| outcome.is_applied())
            .count()
    }

    fn warn(&mut self, folder: &Folder, message: String) {
        warn!(path = %folder.path().display(), "{}", message);
        self.warnings.push(message);
    }
}

/// Validates folders and applies corrections according to configuration
pub struct CleaningEngine<P: MetadataProbe, C: Confirm> {
    behavior: AlbumValidationBehavior,
    scanner: FileScanner,
    validator: FolderValidator,
    probe: P,
    mutator: FolderMutator<C>,
}

impl<P: MetadataProbe, C: Confirm> CleaningEngine<P, C> {
    pub fn new(config: &LydiaConfig, probe: P, confirm: C) -> Self {
        let scanner = FileScanner::from_config(config);
        Self {
            behavior: config.album_validation_behavior,
            validator: FolderValidator::new(scanner.clone()),
            mutator: FolderMutator::new(confirm, config.collision_policy, scanner.clone()),
            scanner,
            probe,
        }
    }

    /// Turn every `prompt` setting into `force`
    pub fn with_force(mut self, force: bool) -> Self {
        if force {
            self.behavior = self.behavior.forced();
        }
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.mutator = self.mutator.with_dry_run(dry_run);
        self
    }

    pub fn scanner(&self) -> &FileScanner {
        &self.scanner
    }

    pub fn validator(&self) -> &FolderValidator {
        &self.validator
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn mutator(&mut self) -> &mut FolderMutator<C> {
        &mut self.mutator
    }

    /// Run the state machine on one folder
    ///
    /// Collisions and unsafe names abort only the rename concerned and are
    /// reported as warnings. Filesystem failures abort the folder and are
    /// returned to the caller.
    pub fn clean(&mut self, folder: &mut Folder) -> CurateResult<CleanReport> {
        let mut report = CleanReport::new(folder);

        if folder.is_opted_out() {
            info!(path = %folder.path().display(), "Skipped (name starts with '_')");
            report.state = FolderState::Skipped;
            return Ok(report);
        }

        let mut attempted = BTreeSet::new();

        loop {
            let violations = self.validator.validate(folder)?;
            if violations.is_empty() {
                info!(path = %folder.path().display(), "Folder looks legit");
                report.state = FolderState::Clean;
                break;
            }

            let Some(correction) = next_correction(&violations, &attempted) else {
                for violation in &violations {
                    if is_report_only(violation) {
                        report.warn(folder, format!("{} {}, leaving it alone", folder.basename(), violation));
                    }
                }
                report.state = FolderState::Unresolved(violations);
                break;
            };
            attempted.insert(correction);

            let outcome = match self.apply(correction, folder, &mut report) {
                Ok(outcome) => outcome,
                Err(e @ (CurateError::NameCollision { .. } | CurateError::UnsafeName(_))) => {
                    report.warn(folder, format!("Not renamed: {}", e));
                    continue;
                }
                Err(e) => return Err(e),
            };

            let Some(outcome) = outcome else {
                continue;
            };
            report.mutations.push((correction, outcome));

            if correction.is_deletion() {
                match outcome {
                    MutationOutcome::Applied => {
                        report.state = FolderState::Deleted;
                        break;
                    }
                    // Configured off: the remaining rules still apply
                    MutationOutcome::Skipped => {}
                    MutationOutcome::Declined | MutationOutcome::DryRun => {
                        report.state = FolderState::Unresolved(violations);
                        break;
                    }
                }
            }
        }

        report.final_path = folder.path().to_path_buf();
        Ok(report)
    }

    /// `Ok(None)` when the correction could not even be attempted
    fn apply(
        &mut self,
        correction: Correction,
        folder: &mut Folder,
        report: &mut CleanReport,
    ) -> CurateResult<Option<MutationOutcome>> {
        let outcome = match correction {
            Correction::RemoveEmpty => {
                info!(path = %folder.path().display(), "Folder is empty");
                self.mutator.delete(folder, self.behavior.remove_empty_folders)?
            }
            Correction::RemoveNoAudio => {
                info!(path = %folder.path().display(), "Folder doesn't contain any audio files");
                self.mutator.delete(folder, self.behavior.remove_folders_with_no_audio)?
            }
            Correction::Lowercase => {
                let lowercase = folder.basename().to_lowercase();
                info!(path = %folder.path().display(), "Name has uppercase letters");
                self.mutator.rename(folder, &lowercase, self.behavior.rename_as_lowercase)?
            }
            Correction::DedupeYearPrefix => {
                let deduped: String = folder.basename().chars().skip(YEAR_PREFIX_LEN).collect();
                info!(path = %folder.path().display(), "Name repeats its year prefix");
                self.mutator.rename(folder, &deduped, self.behavior.rename_as_year_plus_title)?
            }
            Correction::YearPlusTitle => {
                let mode = self.behavior.rename_as_year_plus_title;
                if mode == Behavior::Skip {
                    return Ok(Some(MutationOutcome::Skipped));
                }

                let inferred = name_inference::infer_for_folder(folder, &self.probe, &self.scanner)
                    .and_then(|inferred| inferred.to_basename());
                let candidate = match inferred {
                    Ok(candidate) => candidate,
                    Err(source) => {
                        let error = CurateError::Inference {
                            path: folder.path().to_path_buf(),
                            source,
                        };
                        report.warn(folder, format!("Couldn't figure out a 'YYYY - title' name. {}", error));
                        return Ok(None);
                    }
                };

                info!(
                    path = %folder.path().display(),
                    candidate = %candidate,
                    "Name isn't in format 'YYYY - title', inferred a new one"
                );
                self.mutator.rename(folder, &candidate, mode)?
            }
        };

        Ok(Some(outcome))
    }
}

/// Highest-priority correction not yet attempted
fn next_correction(
    violations: &[ValidationViolation],
    attempted: &BTreeSet<Correction>,
) -> Option<Correction> {
    let is_empty = violations.contains(&ValidationViolation::IsEmpty);

    violations
        .iter()
        .filter_map(correction_for)
        // An empty folder is governed by the empty-folder setting alone
        .filter(|c| !(is_empty && *c == Correction::RemoveNoAudio))
        .filter(|c| !attempted.contains(c))
        .min()
}

fn correction_for(violation: &ValidationViolation) -> Option<Correction> {
    match violation {
        ValidationViolation::IsEmpty => Some(Correction::RemoveEmpty),
        ValidationViolation::NoAudioFiles => Some(Correction::RemoveNoAudio),
        ValidationViolation::NameNotLowercase => Some(Correction::Lowercase),
        ValidationViolation::NameHasDuplicatedYearPrefix => Some(Correction::DedupeYearPrefix),
        ValidationViolation::NameMissingYearTitle => Some(Correction::YearPlusTitle),
        ValidationViolation::HasUnexpectedSubdirectories | ValidationViolation::HasLooseFiles => None,
    }
}

fn is_report_only(violation: &ValidationViolation) -> bool {
    correction_for(violation).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deletion_outranks_renames() {
        let violations = vec![
            ValidationViolation::NameNotLowercase,
            ValidationViolation::NameMissingYearTitle,
            ValidationViolation::NoAudioFiles,
        ];
        assert_eq!(
            next_correction(&violations, &BTreeSet::new()),
            Some(Correction::RemoveNoAudio)
        );
    }

    #[test]
    fn test_empty_folder_ignores_no_audio_setting() {
        let violations = vec![ValidationViolation::IsEmpty, ValidationViolation::NoAudioFiles];
        let attempted = BTreeSet::from([Correction::RemoveEmpty]);
        assert_eq!(next_correction(&violations, &attempted), None);
    }

    #[test]
    fn test_attempted_corrections_not_repeated() {
        let violations = vec![
            ValidationViolation::NameNotLowercase,
            ValidationViolation::NameMissingYearTitle,
        ];
        let attempted = BTreeSet::from([Correction::Lowercase]);
        assert_eq!(
            next_correction(&violations, &attempted),
            Some(Correction::YearPlusTitle)
        );
    }

    #[test]
    fn test_report_only_violations() {
        let violations = vec![ValidationViolation::HasUnexpectedSubdirectories];
        assert_eq!(next_correction(&violations, &BTreeSet::new()), None);
        assert!(is_report_only(&ValidationViolation::HasLooseFiles));
    }
}
