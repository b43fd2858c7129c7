//! Task implementations behind each subcommand.
//!
//! Every task writes its report to the given writer so tests can capture it.
//! Bundle directories follow the same `<root>/<name>.theme` convention the
//! registry discovers.

use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context as _};
use console::style;
use livery::{bundle_name, ThemeConfig, ThemeRegistry};
use serde::Serialize;

use crate::git::{GitCommand, DEFAULT_GIT};

/// Shared settings for all tasks.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub config: ThemeConfig,
    pub git: String,
    pub timeout: Option<Duration>,
}

impl TaskContext {
    pub fn new(config: ThemeConfig) -> Self {
        Self {
            config,
            git: DEFAULT_GIT.to_string(),
            timeout: Some(Duration::from_secs(300)),
        }
    }

    pub fn with_git(mut self, program: impl Into<String>) -> Self {
        self.git = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn root(&self) -> PathBuf {
        self.config.root()
    }

    fn bundle_path(&self, name: &str) -> anyhow::Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root().join(bundle_name(name)))
    }
}

/// Theme summary printed by `show`.
#[derive(Debug, Serialize)]
pub struct ThemeSummary {
    pub name: String,
    pub bundle: String,
    pub path: PathBuf,
    pub uri: String,
    pub public: bool,
    pub fallback: Option<String>,
    pub scripts: Vec<String>,
    pub styles: Vec<String>,
}

pub fn list<W: Write>(ctx: &TaskContext, out: &mut W) -> anyhow::Result<()> {
    let registry = ThemeRegistry::initialize(ctx.config.clone())?;

    writeln!(out)?;
    writeln!(out, "Listing themes within {}", registry.root().display())?;
    writeln!(out)?;

    let mut bundles: Vec<_> = registry.themes().collect();
    bundles.sort_by(|a, b| a.dir_name().cmp(b.dir_name()));

    if bundles.is_empty() {
        writeln!(out, "  No themes installed")?;
    }
    for bundle in bundles {
        writeln!(
            out,
            "  {}  {}",
            style(bundle.dir_name()).bold(),
            style(bundle.display_name()).dim()
        )?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn show<W: Write>(ctx: &TaskContext, name: &str, json: bool, out: &mut W) -> anyhow::Result<()> {
    let registry = ThemeRegistry::initialize(ctx.config.clone())?;
    let theme = registry
        .instance(name)
        .with_context(|| format!("loading theme {}", name))?;

    let summary = ThemeSummary {
        name: theme.name().to_string(),
        bundle: theme.bundle().to_string(),
        path: theme.path().to_path_buf(),
        uri: theme.uri().to_string(),
        public: theme.is_public(),
        fallback: theme.fallback().map(|fallback| fallback.bundle().to_string()),
        scripts: theme.js().urls(),
        styles: theme.css().urls(),
    };

    if json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{}", style(&summary.name).bold())?;
    writeln!(out, "  path:     {}", summary.path.display())?;
    writeln!(out, "  uri:      {}", summary.uri)?;
    writeln!(out, "  public:   {}", if summary.public { "yes" } else { "no" })?;
    writeln!(
        out,
        "  fallback: {}",
        summary.fallback.as_deref().unwrap_or("none")
    )?;
    write_list(out, "scripts", &summary.scripts)?;
    write_list(out, "styles", &summary.styles)?;
    Ok(())
}

pub fn install<W: Write>(
    ctx: &TaskContext,
    repo: &str,
    name: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    let target = ctx.bundle_path(name)?;
    if target.exists() {
        bail!("theme {} is already installed at {}", name, target.display());
    }

    let root = ctx.root();
    std::fs::create_dir_all(&root)
        .with_context(|| format!("creating theme root {}", root.display()))?;

    writeln!(out)?;
    writeln!(out, "Importing '{}' theme into {}", repo_name(repo), target.display())?;

    let output = GitCommand::clone_repo(&ctx.git, repo, &target).run(ctx.timeout)?;
    write!(out, "{}", output)?;

    writeln!(out, "Finished importing '{}' theme", name)?;
    writeln!(out)?;
    Ok(())
}

pub fn update<W: Write>(ctx: &TaskContext, name: &str, out: &mut W) -> anyhow::Result<()> {
    let target = ctx.bundle_path(name)?;
    if !target.is_dir() {
        bail!("theme {} is not installed (looked in {})", name, target.display());
    }

    writeln!(out)?;
    writeln!(out, "Updating {} theme", name)?;

    let output = GitCommand::pull(&ctx.git, &target).run(ctx.timeout)?;
    write!(out, "{}", output)?;

    writeln!(out, "Finished updating {} theme", name)?;
    writeln!(out)?;
    Ok(())
}

pub fn remove<W: Write>(ctx: &TaskContext, name: &str, out: &mut W) -> anyhow::Result<()> {
    let target = ctx.bundle_path(name)?;
    if !target.is_dir() {
        bail!("theme {} is not installed (looked in {})", name, target.display());
    }

    writeln!(out)?;
    writeln!(out, "Removing {} theme", name)?;

    std::fs::remove_dir_all(&target)
        .with_context(|| format!("removing {}", target.display()))?;
    tracing::info!(path = %target.display(), "theme removed");

    writeln!(out, "Finished removing '{}' theme", name)?;
    writeln!(out)?;
    Ok(())
}

fn write_list<W: Write>(out: &mut W, label: &str, items: &[String]) -> std::io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "  {}:  none", label);
    }
    writeln!(out, "  {}:", label)?;
    for item in items {
        writeln!(out, "    {}", item)?;
    }
    Ok(())
}

/// Theme names must be a single plain path component.
fn validate_name(name: &str) -> anyhow::Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => bail!("invalid theme name {:?}", name),
    }
}

/// Repository name from a clone URL, e.g. `site` for `https://host/user/site.git`.
fn repo_name(repo: &str) -> &str {
    let last = repo
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(repo);
    last.strip_suffix(".git").unwrap_or(last)
}
