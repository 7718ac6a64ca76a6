//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use expectfile_core::ExpectConfig;

#[derive(Debug, Parser)]
#[command(
    name = "expectfile",
    version,
    about = "Check build outputs against an expectation manifest"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile the files under a directory against a manifest
    Check(CheckArgs),

    /// Validate a manifest without checking any files
    Validate {
        /// Manifest file (YAML, or JSON by extension)
        manifest: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Report lines only
    Text,
    /// Report lines plus the run report as JSON on stdout
    Json,
    /// Report lines plus the run report as YAML on stdout
    Yaml,
}

#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Manifest file (YAML, or JSON by extension)
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Directory whose files form the observed stream
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Probe the filesystem for each expected path instead of walking the
    /// directory
    #[arg(long)]
    pub real: bool,

    /// Report passing files too
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress report lines
    #[arg(short, long)]
    pub silent: bool,

    /// Do not fail on files outside the manifest
    #[arg(long)]
    pub allow_unexpected: bool,

    /// Do not fail on expected files that never appeared
    #[arg(long)]
    pub allow_missing: bool,

    /// Exit with an error naming the failure count instead of a plain
    /// failing status
    #[arg(long)]
    pub error_on_failure: bool,

    /// Output format for the run report
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl CheckArgs {
    /// Apply command-line overrides on top of the manifest options.
    pub fn apply(&self, mut config: ExpectConfig) -> ExpectConfig {
        if self.verbose {
            config.verbose = true;
        }
        if self.silent {
            config.silent = true;
        }
        if self.allow_unexpected {
            config.report_unexpected = false;
        }
        if self.allow_missing {
            config.report_missing = false;
        }
        if self.error_on_failure {
            config.error_on_failure = true;
        }
        config
    }
}
