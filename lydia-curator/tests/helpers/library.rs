//! Temporary library trees

use std::fs;
use std::path::{Path, PathBuf};

use lydia_common::{Behavior, LydiaConfig};
use tempfile::TempDir;

/// `artists/`, `albums/` and `staging/` under one temporary root
pub struct TestLibrary {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestLibrary {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        for dir in ["artists", "albums", "staging"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artists(&self) -> PathBuf {
        self.root.join("artists")
    }

    pub fn albums(&self) -> PathBuf {
        self.root.join("albums")
    }

    pub fn staging(&self) -> PathBuf {
        self.root.join("staging")
    }

    /// Create `relative` under the root holding the given (empty) files
    pub fn folder(&self, relative: &str, files: &[&str]) -> PathBuf {
        let path = self.root.join(relative);
        fs::create_dir_all(&path).unwrap();
        for file in files {
            fs::write(path.join(file), b"").unwrap();
        }
        path
    }

    /// Config pointing at this library with every behavior set to `mode`
    pub fn config(&self, mode: Behavior) -> LydiaConfig {
        let mut config = LydiaConfig {
            artists_directory: Some(self.artists()),
            albums_directory: Some(self.albums()),
            staging_directory: Some(self.staging()),
            inventory_path: Some(self.root.join("inventory")),
            ..LydiaConfig::default()
        };
        let behavior = &mut config.album_validation_behavior;
        behavior.rename_as_lowercase = mode;
        behavior.rename_as_year_plus_title = mode;
        behavior.remove_empty_folders = mode;
        behavior.remove_folders_with_no_audio = mode;
        config
    }

    /// Sorted names of the directories directly under `relative`
    pub fn dirs_in(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.root.join(relative))
            .unwrap()
            .map(|entry| entry.unwrap())
            .filter(|entry| entry.file_type().unwrap().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Make `path` read-only; false when permissions are not enforced (root)
#[cfg(unix)]
pub fn lock_read_only(path: &Path) -> bool {
    set_mode(path, 0o555);
    let marker = path.join(".lydia-write-check");
    if fs::write(&marker, b"").is_ok() {
        fs::remove_file(&marker).unwrap();
        unlock(path);
        return false;
    }
    true
}

/// Make `path` unlistable; false when permissions are not enforced (root)
#[cfg(unix)]
pub fn lock_unreadable(path: &Path) -> bool {
    set_mode(path, 0o000);
    if fs::read_dir(path).is_ok() {
        unlock(path);
        return false;
    }
    true
}

#[cfg(unix)]
pub fn unlock(path: &Path) {
    set_mode(path, 0o755);
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

/// Confirmation that always gives the same answer
pub fn answer(yes: bool) -> impl FnMut(&str) -> bool {
    move |_question: &str| yes
}
