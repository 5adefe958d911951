// Copyright 2026 Oxide Computer Company

//! The version control collaborator.

use crate::{RepoCheckError, ResolveError, VcsEnvError};
use camino::Utf8Path;
use fs_err as fs;
use mktarball_types::CommitId;
use std::{
    ffi::OsString,
    io,
    process::{Child, Command, Stdio},
};

/// Reads a binary path from the environment variable `var`, see
/// [`binary_from_env_value`].
pub(crate) fn read_binary_env(
    var: &'static str,
    default: &str,
) -> Result<String, VcsEnvError> {
    binary_from_env_value(var, std::env::var_os(var), default)
}

/// Picks the binary named by `value`, the contents of `var`.
///
/// Surrounding whitespace is ignored, and an unset or blank value means
/// `default`. A value that isn't UTF-8 is an error.
fn binary_from_env_value(
    var: &'static str,
    value: Option<OsString>,
    default: &str,
) -> Result<String, VcsEnvError> {
    let Some(value) = value else {
        return Ok(default.to_owned());
    };
    let value = value
        .into_string()
        .map_err(|value| VcsEnvError::NonUtf8 { var, value })?;
    match value.trim() {
        "" => Ok(default.to_owned()),
        binary => Ok(binary.to_owned()),
    }
}

/// The git binary used to resolve revisions and archive trees.
///
/// Construct with [`Vcs::git()`], which honors `$GIT`, or
/// [`Vcs::with_binary()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vcs {
    binary: String,
}

impl Vcs {
    /// Creates a git VCS using the `$GIT` environment variable or `"git"`.
    ///
    /// The environment is read once here; the returned value never consults
    /// it again.
    ///
    /// Returns an error if the `$GIT` environment variable is set but is not
    /// valid UTF-8.
    pub fn git() -> Result<Self, VcsEnvError> {
        let binary = read_binary_env("GIT", "git")?;
        Ok(Vcs { binary })
    }

    /// Creates a git VCS that runs the given binary.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Vcs { binary: binary.into() }
    }

    /// Returns the path to the VCS binary.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Checks that `repo_root` exists and is a directory.
    ///
    /// Bare repositories are allowed, so this does not look for `.git`.
    pub fn check_repo_root(repo_root: &Utf8Path) -> Result<(), RepoCheckError> {
        // Use metadata() to distinguish "not a directory" from I/O
        // errors (e.g., permission denied).
        match fs::metadata(repo_root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(RepoCheckError::NotADirectory {
                repo_root: repo_root.to_owned(),
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(RepoCheckError::PathNotFound {
                    repo_root: repo_root.to_owned(),
                })
            }
            Err(err) => Err(RepoCheckError::Io {
                path: repo_root.to_owned(),
                source: err,
            }),
        }
    }

    /// Resolves `revision` to the commit it names.
    ///
    /// Runs `git rev-parse --verify <revision>^{commit}`, so tags are peeled
    /// to the commit they point at and non-commit objects are rejected.
    pub fn resolve_commit(
        &self,
        repo_root: &Utf8Path,
        revision: &str,
    ) -> Result<CommitId, ResolveError> {
        Self::check_repo_root(repo_root)?;
        if revision.starts_with('-') {
            return Err(ResolveError::InvalidRevision {
                revision: revision.to_owned(),
            });
        }

        tracing::debug!(%repo_root, revision, "resolving revision");
        let output = Command::new(&self.binary)
            .current_dir(repo_root)
            .args(["rev-parse", "--verify"])
            .arg(format!("{revision}^{{commit}}"))
            .output()
            .map_err(|source| ResolveError::SpawnFailed {
                binary_path: self.binary.clone(),
                repo_root: repo_root.to_owned(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::UnknownRevision {
                revision: revision.to_owned(),
                repo_root: repo_root.to_owned(),
                exit_status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        stdout.parse().map_err(|error| ResolveError::UnexpectedOutput {
            revision: revision.to_owned(),
            stdout: stdout.to_owned(),
            error,
        })
    }

    /// Starts `git archive` for `commit`, writing a tar stream to the
    /// child's stdout with every entry under `prefix/`.
    pub(crate) fn spawn_archive(
        &self,
        repo_root: &Utf8Path,
        commit: CommitId,
        prefix: &str,
    ) -> io::Result<Child> {
        tracing::debug!(%repo_root, %commit, prefix, "archiving tree");
        Command::new(&self.binary)
            .current_dir(repo_root)
            .args(["archive", "--format=tar"])
            .arg(format!("--prefix={prefix}/"))
            .arg(commit.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
    }
}
