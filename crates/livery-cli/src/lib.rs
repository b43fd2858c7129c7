//! # livery-cli - Theme Bundle Tasks
//!
//! Command line tasks for managing the bundles a
//! [`ThemeRegistry`](livery::ThemeRegistry) discovers: listing and inspecting
//! installed themes, installing them from git repositories, pulling updates,
//! and removing them.
//!
//! ```text
//! livery list
//! livery show admin --json
//! livery install https://github.com/user/admin-theme.git admin
//! livery update admin
//! livery remove admin
//! ```
//!
//! Bundles are always placed at `<root>/<name>.theme`, where `root` comes from
//! the theme configuration (`--config`) or `--root`.

pub mod cli;
pub mod commands;
pub mod git;

use std::io::Write;

pub use cli::{Cli, Command};
pub use commands::TaskContext;

/// Runs the parsed command, writing its report to `out`.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> anyhow::Result<()> {
    let ctx = TaskContext::new(cli.theme_config()?).with_timeout(Some(cli.git_timeout()));

    match &cli.command {
        Command::List => commands::list(&ctx, out),
        Command::Show { name, json } => commands::show(&ctx, name, *json, out),
        Command::Install { repo, name } => commands::install(&ctx, repo, name, out),
        Command::Update { name } => commands::update(&ctx, name, out),
        Command::Remove { name } => commands::remove(&ctx, name, out),
    }
}
