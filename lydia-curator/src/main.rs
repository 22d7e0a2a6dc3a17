//! lydia - music library curator
//!
//! Cleans artist and album folder names, removes empty or audio-less
//! folders, moves clean albums through a staging area and writes
//! inventory snapshots.
//!
//! Exit code 1 on configuration failure, 0 otherwise.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use lydia_common::config::ConfigResolver;
use lydia_common::{Behavior, LydiaConfig};
use lydia_curator::services::inventory::{write_inventory, InventoryBuilder};
use lydia_curator::services::{
    archive_albums, stage_albums, unstage_albums, CleaningEngine, LoftyProbe, StdinConfirm,
};
use lydia_curator::workflow::{clean_albums, clean_artists};

/// Command-line arguments for lydia
#[derive(Parser, Debug)]
#[command(name = "lydia")]
#[command(about = "Music library folder curator")]
#[command(version)]
struct Args {
    /// Configuration file (TOML); falls back to $LYDIA_CONFIG, then the user config dir
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Turn every 'prompt' behavior into 'force'
    #[arg(short, long)]
    force: bool,

    /// Log what would change without touching the filesystem
    #[arg(short = 'n', long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean artist folders and the albums inside them
    CleanArtists,
    /// Clean folders in the albums directory
    CleanAlbums,
    /// Move clean albums into staging, grouped by artist
    Stage,
    /// Move staged albums back to the albums directory
    Unstage,
    /// Move staged albums into the artists directory
    Archive,
    /// Write artists.json and albums.json
    Inventory,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins; otherwise the configured level replaces this once loaded
    let from_env = EnvFilter::try_from_default_env().ok();
    let has_env_filter = from_env.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(from_env.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, source) = match ConfigResolver::new(args.config.clone()).resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(1);
        }
    };

    if !has_env_filter {
        if let Err(e) = filter_handle.reload(EnvFilter::new(&config.logging.level)) {
            error!("Failed to apply log level '{}': {}", config.logging.level, e);
        }
    }
    tracing::debug!(source = ?source, "Configuration resolved");

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            if is_configuration_error(&e) {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

fn is_configuration_error(e: &anyhow::Error) -> bool {
    e.chain()
        .any(|cause| cause.downcast_ref::<lydia_common::Error>().is_some())
}

fn run(args: &Args, config: &LydiaConfig) -> Result<()> {
    info!(
        command = ?args.command,
        force = args.force,
        dry_run = args.dry_run,
        "Starting lydia {}",
        env!("CARGO_PKG_VERSION")
    );

    let mut engine = CleaningEngine::new(config, LoftyProbe::new(), StdinConfirm)
        .with_force(args.force)
        .with_dry_run(args.dry_run);

    let transfer_mode = if args.force {
        Behavior::Force
    } else {
        Behavior::Prompt
    };

    match args.command {
        Command::CleanArtists => {
            let artists = config.require_artists_directory()?;
            clean_artists(&mut engine, artists).context("Cleaning artists failed")?;
        }
        Command::CleanAlbums => {
            let albums = config.require_albums_directory()?;
            clean_albums(&mut engine, albums).context("Cleaning albums failed")?;
        }
        Command::Stage => {
            let albums = config.require_albums_directory()?;
            let staging = config.require_staging_directory()?;
            stage_albums(&mut engine, albums, staging, transfer_mode).context("Staging failed")?;
        }
        Command::Unstage => {
            let staging = config.require_staging_directory()?;
            let albums = config.require_albums_directory()?;
            unstage_albums(&mut engine, staging, albums, transfer_mode)
                .context("Unstaging failed")?;
        }
        Command::Archive => {
            let staging = config.require_staging_directory()?;
            let artists = config.require_artists_directory()?;
            archive_albums(&mut engine, staging, artists, transfer_mode)
                .context("Archiving failed")?;
        }
        Command::Inventory => {
            let artists = config.require_artists_directory()?;
            let albums = config.require_albums_directory()?;
            let output = config.require_inventory_path()?;
            let snapshot = InventoryBuilder::new(engine.scanner().clone())
                .build(artists, albums)
                .context("Building inventory failed")?;
            let written = write_inventory(&snapshot, output).context("Writing inventory failed")?;
            for path in written {
                info!(path = %path.display(), "Wrote inventory file");
            }
        }
    }

    Ok(())
}
