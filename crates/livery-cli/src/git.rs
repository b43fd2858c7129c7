//! Running `git` for bundle installation and updates.
//!
//! Commands are built as argument vectors and executed directly, never through
//! a shell, so repository URLs and theme names are passed through verbatim.
//! Git's own progress output goes to stderr, which is inherited so the user
//! sees it live; stdout is captured and returned.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use wait_timeout::ChildExt;

/// Default program used for version-control operations.
pub const DEFAULT_GIT: &str = "git";

#[derive(Debug, Error)]
pub enum GitError {
    #[error("could not start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("lost contact with git while working on {}: {source}", .bundle.display())]
    Io {
        bundle: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("git did not finish with {} within {after:?} (`{command}`)", .bundle.display())]
    Timeout {
        command: String,
        bundle: PathBuf,
        after: Duration,
    },
    #[error("git could not {action} {}: `{command}` failed with status {status}", .bundle.display())]
    Failed {
        command: String,
        action: &'static str,
        bundle: PathBuf,
        status: ExitStatus,
    },
}

/// A git invocation against one bundle directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    program: String,
    args: Vec<OsString>,
    action: &'static str,
    bundle: PathBuf,
}

impl GitCommand {
    fn new(program: &str, action: &'static str, bundle: &Path) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            action,
            bundle: bundle.to_path_buf(),
        }
    }

    fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `git clone <repo> <target>`
    pub fn clone_repo(program: &str, repo: &str, target: &Path) -> Self {
        Self::new(program, "clone into", target)
            .arg("clone")
            .arg(repo)
            .arg(target)
    }

    /// `git -C <dir> pull`
    pub fn pull(program: &str, dir: &Path) -> Self {
        Self::new(program, "update", dir).arg("-C").arg(dir).arg("pull")
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// The bundle directory this command works on.
    pub fn bundle(&self) -> &Path {
        &self.bundle
    }

    /// Human-readable command line, for logs and error messages.
    pub fn describe(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    /// Runs the command, returning its stdout.
    ///
    /// Stdout is drained on a separate thread while waiting, so a chatty
    /// child never stalls on a full pipe. With a timeout, the child is killed
    /// once it is exceeded.
    pub fn run(&self, timeout: Option<Duration>) -> Result<String, GitError> {
        let description = self.describe();
        tracing::debug!(command = %description, bundle = %self.bundle.display(), "running git");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| GitError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let reader = thread::spawn(move || -> std::io::Result<Vec<u8>> {
            let mut output = Vec::new();
            if let Some(mut stdout) = stdout {
                stdout.read_to_end(&mut output)?;
            }
            Ok(output)
        });

        let waited = match timeout {
            Some(duration) => child.wait_timeout(duration),
            None => child.wait().map(Some),
        };
        let status = match waited.map_err(|source| self.io_error(source))? {
            Some(status) => status,
            None => {
                child.kill().map_err(|source| self.io_error(source))?;
                child.wait().map_err(|source| self.io_error(source))?;
                return Err(GitError::Timeout {
                    command: description,
                    bundle: self.bundle.clone(),
                    after: timeout.unwrap_or_default(),
                });
            }
        };

        let output = reader
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("stdout reader panicked")))
            .map_err(|source| self.io_error(source))?;

        if !status.success() {
            return Err(GitError::Failed {
                command: description,
                action: self.action,
                bundle: self.bundle.clone(),
                status,
            });
        }

        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    fn io_error(&self, source: std::io::Error) -> GitError {
        GitError::Io {
            bundle: self.bundle.clone(),
            source,
        }
    }
}
