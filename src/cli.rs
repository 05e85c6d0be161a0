// src/cli.rs

//! CLI argument parsing using `clap`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::ConfigOverrides;

/// Command-line arguments for `snapwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "snapwatch",
    version,
    about = "Watch a directory and keep a content-addressed history of every file.",
    long_about = None,
    after_help = "Examples:\n  snapwatch                          start monitoring\n  snapwatch list notes.txt           list stored versions of notes.txt\n  snapwatch revert notes.txt 3a7b    restore the version whose digest starts with 3a7b"
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Snapwatch.toml` in the current working directory, if it exists.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory to watch (overrides `[watch].dir`).
    #[arg(long, value_name = "DIR", global = true)]
    pub watch_dir: Option<PathBuf>,

    /// Directory holding snapshots (overrides `[backup].dir`).
    #[arg(long, value_name = "DIR", global = true)]
    pub backup_dir: Option<PathBuf>,

    /// Milliseconds between polls (overrides `[watch].interval_ms`).
    #[arg(long, value_name = "MS", global = true)]
    pub interval_ms: Option<u64>,

    /// Separator between file name and digest (overrides `[backup].separator`).
    #[arg(long, value_name = "SEP", global = true)]
    pub separator: Option<String>,

    /// Poll once and exit instead of monitoring forever.
    #[arg(long, global = true)]
    pub once: bool,

    /// Print the resolved configuration and exit without touching any files.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SNAPWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Watch the directory and store a snapshot of every change (default).
    Monitor,
    /// List the stored digests for a file.
    List {
        /// File name inside the watched directory.
        basename: String,
    },
    /// Restore a stored version of a file into the watched directory.
    Revert {
        /// File name inside the watched directory.
        basename: String,
        /// Full digest or any prefix of it.
        digest_prefix: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliArgs {
    /// The selected mode; no subcommand means monitor.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Monitor)
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            watch_dir: self.watch_dir.clone(),
            backup_dir: self.backup_dir.clone(),
            interval_ms: self.interval_ms,
            separator: self.separator.clone(),
        }
    }
}

/// Parse `std::env::args`, returning clap's error (help, version or misuse)
/// so the caller controls the exit code.
pub fn try_parse() -> Result<CliArgs, clap::Error> {
    CliArgs::try_parse()
}

pub fn try_parse_from<I, T>(args: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CliArgs::try_parse_from(args)
}

/// Exit status for a parse error: help and version go to stdout and succeed,
/// everything else is a usage error.
pub fn exit_code_for(err: &clap::Error) -> i32 {
    if err.use_stderr() { 1 } else { 0 }
}
