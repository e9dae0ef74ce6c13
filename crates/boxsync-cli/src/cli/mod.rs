//! CLI for boxsync.

mod commands;

use anyhow::Result;
use boxsync_core::config::{self, SyncConfig};
use boxsync_core::logging;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_checksum, run_completions, run_sync_command};

/// Top-level CLI for boxsync.
#[derive(Debug, Parser)]
#[command(name = "boxsync")]
#[command(about = "Mirror a remote box manifest into a local directory", long_about = None)]
pub struct Cli {
    /// Read settings from this file instead of ~/.config/boxsync/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch the manifest, download missing or outdated boxes and remove obsolete files.
    Sync {
        /// Manifest URL (overrides manifest_url from the config file).
        #[arg(long, value_name = "URL")]
        manifest_url: Option<String>,
        /// Directory holding the boxes (overrides target_dir).
        #[arg(long, value_name = "DIR")]
        target_dir: Option<PathBuf>,
        /// Process up to N boxes concurrently (overrides concurrency).
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,
        /// Exit non-zero if any box failed to sync.
        #[arg(long)]
        strict: bool,
    },

    /// Compute the checksum of a local file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
        /// Hash function: sha1 or sha256.
        #[arg(long, default_value = "sha1")]
        algorithm: String,
    },

    /// Print shell completions to stdout.
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub manifest_url: Option<String>,
    pub target_dir: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub verbose: bool,
    pub strict: bool,
}

impl Overrides {
    pub fn apply(self, mut cfg: SyncConfig) -> SyncConfig {
        if let Some(url) = self.manifest_url {
            cfg.manifest_url = url;
        }
        if let Some(dir) = self.target_dir {
            cfg.target_dir = dir;
        }
        if let Some(n) = self.concurrency {
            cfg.concurrency = n;
        }
        cfg.verbose |= self.verbose;
        cfg.fail_on_artifact_error |= self.strict;
        cfg
    }
}

impl Cli {
    fn load_config(&self) -> Result<SyncConfig> {
        match &self.config {
            Some(path) => config::load_from_path(path),
            None => config::load_or_init(),
        }
    }

    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell);
            return Ok(());
        }

        let cfg = cli.load_config()?;
        let verbose = cli.verbose || cfg.verbose;
        if logging::init_logging(verbose).is_err() {
            logging::init_logging_stderr(verbose);
        }
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Sync {
                manifest_url,
                target_dir,
                concurrency,
                strict,
            } => {
                let overrides = Overrides {
                    manifest_url,
                    target_dir,
                    concurrency,
                    verbose: cli.verbose,
                    strict,
                };
                run_sync_command(overrides.apply(cfg)).await?;
            }
            CliCommand::Checksum { path, algorithm } => run_checksum(&path, &algorithm)?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
