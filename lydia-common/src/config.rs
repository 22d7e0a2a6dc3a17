//! Configuration loading and resolution
//!
//! The configuration file is TOML. Resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `LYDIA_CONFIG` environment variable
//! 3. `<config dir>/lydia/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A file named explicitly by (1) or (2) must load. Missing default files
//! only produce a warning.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "LYDIA_CONFIG";

/// Interaction mode for one corrective category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// Never apply the correction
    Skip,
    /// Ask before applying
    #[default]
    Prompt,
    /// Apply without asking
    Force,
}

impl Behavior {
    /// Upgrade `Prompt` to `Force`; `Skip` stays disabled
    pub fn forced(self) -> Self {
        match self {
            Behavior::Prompt => Behavior::Force,
            other => other,
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::Skip => write!(f, "skip"),
            Behavior::Prompt => write!(f, "prompt"),
            Behavior::Force => write!(f, "force"),
        }
    }
}

/// What to do when a rename or move lands on an existing directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Abort the mutation
    #[default]
    Fail,
    /// Delete the existing destination, then proceed
    Overwrite,
    /// Move the source's entries into the destination when none collide
    Merge,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::Fail => write!(f, "fail"),
            CollisionPolicy::Overwrite => write!(f, "overwrite"),
            CollisionPolicy::Merge => write!(f, "merge"),
        }
    }
}

/// Per-category interaction modes used while cleaning folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlbumValidationBehavior {
    #[serde(default)]
    pub rename_as_lowercase: Behavior,

    #[serde(default)]
    pub rename_as_year_plus_title: Behavior,

    #[serde(default)]
    pub remove_empty_folders: Behavior,

    #[serde(default)]
    pub remove_folders_with_no_audio: Behavior,
}

impl AlbumValidationBehavior {
    /// Same settings with every `Prompt` turned into `Force`
    pub fn forced(&self) -> Self {
        Self {
            rename_as_lowercase: self.rename_as_lowercase.forced(),
            rename_as_year_plus_title: self.rename_as_year_plus_title.forced(),
            remove_empty_folders: self.remove_empty_folders.forced(),
            remove_folders_with_no_audio: self.remove_folders_with_no_audio.forced(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_audio_extensions() -> Vec<String> {
    vec!["mp3".to_string(), "flac".to_string()]
}

/// Settings consumed by every Lydia command
///
/// Built once at startup and handed to the engine by reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LydiaConfig {
    /// Root of the sorted `artist/album` tree
    #[serde(default)]
    pub artists_directory: Option<PathBuf>,

    /// Flat directory of albums not yet assigned to an artist
    #[serde(default)]
    pub albums_directory: Option<PathBuf>,

    /// Holding area for albums pending artist assignment
    #[serde(default)]
    pub staging_directory: Option<PathBuf>,

    /// Directory receiving `artists.json` and `albums.json`
    #[serde(default)]
    pub inventory_path: Option<PathBuf>,

    /// File extensions counted as audio content (lowercase, no dot)
    #[serde(default = "default_audio_extensions")]
    pub audio_extensions: Vec<String>,

    #[serde(default)]
    pub collision_policy: CollisionPolicy,

    #[serde(default)]
    pub album_validation_behavior: AlbumValidationBehavior,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for LydiaConfig {
    fn default() -> Self {
        Self {
            artists_directory: None,
            albums_directory: None,
            staging_directory: None,
            inventory_path: None,
            audio_extensions: default_audio_extensions(),
            collision_policy: CollisionPolicy::default(),
            album_validation_behavior: AlbumValidationBehavior::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl LydiaConfig {
    /// Parse, normalize and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: LydiaConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

        config.audio_extensions = config
            .audio_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .collect();

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read config {} failed: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check invariants that hold regardless of the requested command
    pub fn validate(&self) -> Result<()> {
        if self.audio_extensions.is_empty() {
            return Err(Error::Config(
                "audio_extensions must list at least one extension".to_string(),
            ));
        }

        if self.audio_extensions.iter().any(|ext| ext.is_empty()) {
            return Err(Error::Config(
                "audio_extensions contains an empty entry".to_string(),
            ));
        }

        Ok(())
    }

    pub fn require_artists_directory(&self) -> Result<&Path> {
        require_existing_dir("artists_directory", self.artists_directory.as_deref())
    }

    pub fn require_albums_directory(&self) -> Result<&Path> {
        require_existing_dir("albums_directory", self.albums_directory.as_deref())
    }

    /// Staging directory; created on demand, so it only has to be set
    pub fn require_staging_directory(&self) -> Result<&Path> {
        let path = require_field("staging_directory", self.staging_directory.as_deref())?;
        if path.exists() && !path.is_dir() {
            return Err(Error::Config(format!(
                "staging_directory {} is not a directory",
                path.display()
            )));
        }
        Ok(path)
    }

    /// Inventory output directory; created on demand
    pub fn require_inventory_path(&self) -> Result<&Path> {
        let path = require_field("inventory_path", self.inventory_path.as_deref())?;
        if path.exists() && !path.is_dir() {
            return Err(Error::Config(format!(
                "inventory_path {} is not a directory",
                path.display()
            )));
        }
        Ok(path)
    }
}

fn require_field<'a>(name: &str, value: Option<&'a Path>) -> Result<&'a Path> {
    value.ok_or_else(|| Error::Config(format!("{} is not configured", name)))
}

fn require_existing_dir<'a>(name: &str, value: Option<&'a Path>) -> Result<&'a Path> {
    let path = require_field(name, value)?;
    if !path.is_dir() {
        return Err(Error::Config(format!(
            "{} {} does not exist or is not a directory",
            name,
            path.display()
        )));
    }
    Ok(path)
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    DefaultFile(PathBuf),
    CompiledDefaults,
}

/// Resolves the configuration file following the priority order above
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Resolve and load configuration
    pub fn resolve(&self) -> Result<(LydiaConfig, ConfigSource)> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            let config = LydiaConfig::load_from_path(path)?;
            info!("Configuration loaded from {}", path.display());
            return Ok((config, ConfigSource::CommandLine(path.clone())));
        }

        // Priority 2: Environment variable
        if let Ok(value) = std::env::var(CONFIG_ENV_VAR) {
            if !value.trim().is_empty() {
                let path = PathBuf::from(value);
                let config = LydiaConfig::load_from_path(&path)?;
                info!("Configuration loaded from {} ({})", path.display(), CONFIG_ENV_VAR);
                return Ok((config, ConfigSource::Environment(path)));
            }
        }

        // Priority 3: Platform config directory
        if let Some(path) = default_config_path() {
            if path.exists() {
                let config = LydiaConfig::load_from_path(&path)?;
                info!("Configuration loaded from {}", path.display());
                return Ok((config, ConfigSource::DefaultFile(path)));
            }
        }

        // Priority 4: Compiled defaults
        warn!("No configuration file found, using compiled defaults");
        Ok((LydiaConfig::default(), ConfigSource::CompiledDefaults))
    }
}

/// `<config dir>/lydia/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lydia").join("config.toml"))
}
