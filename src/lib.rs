// src/lib.rs

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod hash;
pub mod logging;
pub mod store;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::cli::{CliArgs, Command};
use crate::config::resolve;
use crate::fs::{FileSystem, RealFileSystem};
use crate::store::{BackupStore, SnapshotNaming};
use crate::watch::ensure_watch_dir;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - startup checks (watched dir must exist, backup dir is created)
/// - the selected mode: monitor, list or revert
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve(args.config.as_deref(), &args.overrides())?;
    let command = args.command();

    if args.dry_run {
        commands::print_dry_run(&cfg, &mut std::io::stdout().lock())?;
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    ensure_watch_dir(fs.as_ref(), cfg.watch_dir())?;
    let store = BackupStore::open(
        Arc::clone(&fs),
        cfg.backup_dir(),
        SnapshotNaming::new(cfg.separator()),
    )?;

    debug!(?command, "dispatching");

    match command {
        Command::Monitor => {
            commands::monitor(fs, store, &cfg, args.once).await?;
        }
        Command::List { basename } => {
            commands::list_versions(&store, &basename, &mut std::io::stdout().lock())?;
        }
        Command::Revert {
            basename,
            digest_prefix,
        } => {
            commands::revert_version(
                &store,
                &basename,
                &digest_prefix,
                cfg.watch_dir(),
                &mut std::io::stdout().lock(),
                &mut std::io::stderr().lock(),
            )?;
        }
    }

    Ok(())
}
