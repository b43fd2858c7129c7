//! Command line definition.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use livery::ThemeConfig;

/// Manage installed theme bundles.
#[derive(Debug, Parser)]
#[command(name = "livery", version, about)]
pub struct Cli {
    /// Theme configuration file (.yaml, .yml or .json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding theme bundles (overrides the configured root)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Seconds to wait for git before giving up
    #[arg(long, global = true, default_value_t = 300, value_name = "SECS")]
    pub timeout: u64,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// List all installed themes
    List,

    /// Show a theme's paths, fallback and assets
    Show {
        /// Theme name, with or without the .theme suffix
        name: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Install a theme by cloning a git repository
    Install {
        /// Repository to clone
        repo: String,

        /// Theme name to install as
        name: String,
    },

    /// Update a theme from its source repository
    Update {
        /// Theme name
        name: String,
    },

    /// Uninstall a theme
    #[command(alias = "uninstall")]
    Remove {
        /// Theme name
        name: String,
    },
}

impl Cli {
    /// Loads the theme configuration, applying `--root`.
    pub fn theme_config(&self) -> anyhow::Result<ThemeConfig> {
        let config = match &self.config {
            Some(path) => ThemeConfig::from_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => ThemeConfig::new(),
        };

        Ok(match &self.root {
            Some(root) => config.set("root", root.to_string_lossy().into_owned()),
            None => config,
        })
    }

    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
