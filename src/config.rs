//! Configuration management for linestop.
//!
//! Handles:
//! - Command-line argument parsing
//! - Language profile directory configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "linestop")]
#[command(about = "Live line validation for code editors")]
#[command(version)]
pub struct Args {
    /// Language to validate against
    #[arg(
        long,
        global = true,
        help = "Language to use (e.g., 'java', 'python'); overrides detection"
    )]
    pub language: Option<String>,

    /// Extra directories containing language profile files
    #[arg(
        long = "language-dir",
        global = true,
        help = "Directory containing language profile TOML files (repeatable)"
    )]
    pub language_dirs: Vec<PathBuf>,

    /// Log level
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Validate every line of a file and report rejected lines
    Check {
        file: PathBuf,
        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive session: each stdin line is a commit attempt
    Session {
        /// Print decisions as JSON
        #[arg(long)]
        json: bool,
    },
    /// List registered languages
    Languages,
    /// Print the starter template for a language
    Template { language: String },
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Language explicitly set via command line
    pub cli_language: Option<String>,
    /// Per-user profile directory, if one can be determined
    pub user_language_dir: Option<PathBuf>,
    /// Directories given on the command line, lowest priority first
    pub language_dirs: Vec<PathBuf>,
    pub log_level: String,
    pub command: Command,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let user_language_dir =
            dirs::config_dir().map(|dir| dir.join("linestop").join("languages"));

        Ok(Config {
            cli_language: args.language,
            user_language_dir,
            language_dirs: args.language_dirs,
            log_level: args.log_level,
            command: args.command,
        })
    }

    /// Get the language name requested on the command line
    pub fn get_effective_language(&self) -> Option<&str> {
        self.cli_language.as_deref()
    }
}
