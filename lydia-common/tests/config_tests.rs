//! Integration tests for configuration loading and resolution
//!
//! Tests that manipulate LYDIA_CONFIG are marked with #[serial]
//! so they never race on the process environment.

use lydia_common::config::{ConfigResolver, ConfigSource, CONFIG_ENV_VAR};
use lydia_common::{Behavior, CollisionPolicy, Error, LydiaConfig};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
artists_directory = "/music/artists"
albums_directory = "/music/albums"
staging_directory = "/music/staging"
inventory_path = "/music/inventory"
audio_extensions = ["mp3", "flac", "ogg"]
collision_policy = "merge"

[album_validation_behavior]
rename_as_lowercase = "force"
rename_as_year_plus_title = "prompt"
remove_empty_folders = "skip"
remove_folders_with_no_audio = "force"

[logging]
level = "debug"
"#;

#[test]
fn test_full_config_parses() {
    let config = LydiaConfig::from_toml_str(FULL_CONFIG).unwrap();

    assert_eq!(config.artists_directory.as_deref(), Some(std::path::Path::new("/music/artists")));
    assert_eq!(config.audio_extensions, vec!["mp3", "flac", "ogg"]);
    assert_eq!(config.collision_policy, CollisionPolicy::Merge);
    assert_eq!(config.album_validation_behavior.rename_as_lowercase, Behavior::Force);
    assert_eq!(config.album_validation_behavior.remove_empty_folders, Behavior::Skip);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_forced_behavior_keeps_skip() {
    let config = LydiaConfig::from_toml_str(FULL_CONFIG).unwrap();
    let forced = config.album_validation_behavior.forced();

    assert_eq!(forced.rename_as_year_plus_title, Behavior::Force);
    assert_eq!(forced.remove_empty_folders, Behavior::Skip);
}

#[test]
fn test_unknown_field_rejected() {
    let result = LydiaConfig::from_toml_str("artist_directory = \"/typo\"");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_require_existing_directories() {
    let temp_dir = TempDir::new().unwrap();
    let artists = temp_dir.path().join("artists");
    fs::create_dir(&artists).unwrap();

    let config = LydiaConfig {
        artists_directory: Some(artists.clone()),
        albums_directory: Some(temp_dir.path().join("missing")),
        ..LydiaConfig::default()
    };

    assert_eq!(config.require_artists_directory().unwrap(), artists.as_path());
    assert!(matches!(config.require_albums_directory(), Err(Error::Config(_))));
}

#[test]
fn test_staging_directory_may_not_exist_yet() {
    let temp_dir = TempDir::new().unwrap();
    let config = LydiaConfig {
        staging_directory: Some(temp_dir.path().join("staging")),
        ..LydiaConfig::default()
    };

    assert!(config.require_staging_directory().is_ok());
}

#[test]
fn test_staging_directory_must_not_be_a_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("staging");
    fs::write(&file, b"not a directory").unwrap();

    let config = LydiaConfig {
        staging_directory: Some(file),
        ..LydiaConfig::default()
    };

    assert!(matches!(config.require_staging_directory(), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_resolver_prefers_command_line() {
    let temp_dir = TempDir::new().unwrap();
    let cli_path = temp_dir.path().join("cli.toml");
    let env_path = temp_dir.path().join("env.toml");
    fs::write(&cli_path, "collision_policy = \"overwrite\"").unwrap();
    fs::write(&env_path, "collision_policy = \"merge\"").unwrap();
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let (config, source) = ConfigResolver::new(Some(cli_path.clone())).resolve().unwrap();

    assert_eq!(config.collision_policy, CollisionPolicy::Overwrite);
    assert_eq!(source, ConfigSource::CommandLine(cli_path));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_resolver_uses_environment_variable() {
    let temp_dir = TempDir::new().unwrap();
    let env_path = temp_dir.path().join("env.toml");
    fs::write(&env_path, "collision_policy = \"merge\"").unwrap();
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let (config, source) = ConfigResolver::new(None).resolve().unwrap();

    assert_eq!(config.collision_policy, CollisionPolicy::Merge);
    assert_eq!(source, ConfigSource::Environment(env_path));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_resolver_fails_on_missing_explicit_file() {
    env::set_var(CONFIG_ENV_VAR, "/nonexistent/lydia/config.toml");

    let result = ConfigResolver::new(None).resolve();
    assert!(matches!(result, Err(Error::Config(_))));

    env::remove_var(CONFIG_ENV_VAR);
}
