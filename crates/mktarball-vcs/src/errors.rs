// Copyright 2026 Oxide Computer Company

//! Error types for revision resolution and tree export.

use camino::Utf8PathBuf;
use mktarball_types::{CommitId, CommitIdParseError};
use std::{ffi::OsString, io};
use thiserror::Error;

// ---- VCS errors ----

/// An error from reading a VCS binary path from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VcsEnvError {
    /// The environment variable is set but is not valid UTF-8.
    #[error(
        "${var} environment variable is not valid \
         UTF-8: {value:?}"
    )]
    NonUtf8 {
        /// The environment variable name.
        var: &'static str,
        /// The non-UTF-8 value.
        value: OsString,
    },
}

/// An error that occurs while checking the repository directory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepoCheckError {
    /// The provided repository directory does not exist.
    #[error("repository directory {repo_root} does not exist")]
    PathNotFound {
        /// The path that was provided.
        repo_root: Utf8PathBuf,
    },

    /// The provided repository directory is not a directory.
    #[error("repository directory {repo_root} is not a directory")]
    NotADirectory {
        /// The path that was provided.
        repo_root: Utf8PathBuf,
    },

    /// An I/O error occurred while probing the repository directory.
    #[error("I/O error while checking repository directory {path}")]
    Io {
        /// The path being checked when the error occurred.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// An error that occurs while resolving a revision to a commit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// The repository directory is unusable.
    #[error(transparent)]
    Repo(#[from] RepoCheckError),

    /// The revision could be mistaken for a command-line option.
    #[error("invalid revision {revision:?}: must not start with '-'")]
    InvalidRevision {
        /// The revision that was provided.
        revision: String,
    },

    /// Failed to spawn the VCS process.
    #[error("failed to run git at {binary_path:?} in {repo_root}")]
    SpawnFailed {
        /// The path to the VCS executable.
        binary_path: String,
        /// The working directory where the command was run.
        repo_root: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The revision does not name a commit.
    #[error(
        "revision {revision:?} does not resolve to a commit \
         in {repo_root} ({exit_status}): {stderr}"
    )]
    UnknownRevision {
        /// The revision that was provided.
        revision: String,
        /// The repository that was searched.
        repo_root: Utf8PathBuf,
        /// A human-readable description of the exit status (e.g.,
        /// "exit status: 1" or "killed by signal").
        exit_status: String,
        /// The stderr output from the VCS.
        stderr: String,
    },

    /// The VCS succeeded but did not print a commit id.
    #[error(
        "git returned unexpected output while resolving {revision:?}: \
         {stdout:?}"
    )]
    UnexpectedOutput {
        /// The revision that was provided.
        revision: String,
        /// The stdout content that could not be interpreted.
        stdout: String,
        /// Why the output is not a commit id.
        #[source]
        error: CommitIdParseError,
    },
}

// ---- Export errors ----

/// An error that occurs while creating a workspace.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkspaceError {
    /// Creating the temporary directory failed.
    #[error("failed to create workspace in {parent}")]
    Create {
        /// The directory the workspace was to be created in.
        parent: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },

    /// Removing the workspace failed.
    #[error("failed to remove workspace {path}")]
    Remove {
        /// The workspace directory.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },
}

/// An error that occurs while exporting a tree into a workspace.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// The export directory already exists in the workspace.
    #[error("export directory {path} already exists")]
    AlreadyExported {
        /// The export directory.
        path: Utf8PathBuf,
    },

    /// Failed to spawn the VCS process.
    #[error("failed to run git at {binary_path:?} in {repo_root}")]
    SpawnFailed {
        /// The path to the VCS executable.
        binary_path: String,
        /// The working directory where the command was run.
        repo_root: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Unpacking the archive stream failed.
    #[error("failed to unpack tree of {commit} into {workspace}")]
    Unpack {
        /// The commit being exported.
        commit: CommitId,
        /// The workspace being unpacked into.
        workspace: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },

    /// The VCS archive command failed.
    #[error("git failed to archive {commit} ({exit_status}): {stderr}")]
    VcsFailed {
        /// The commit being exported.
        commit: CommitId,
        /// A human-readable description of the exit status.
        exit_status: String,
        /// The stderr output from the VCS.
        stderr: String,
    },

    /// The archive did not contain the expected top-level directory.
    #[error("archive of {commit} did not produce {path}")]
    MissingTree {
        /// The commit being exported.
        commit: CommitId,
        /// The directory that should have been extracted.
        path: Utf8PathBuf,
    },

    /// Failed to write the commit id marker file.
    #[error("failed to write commit id marker {path}")]
    WriteMarker {
        /// The path where the write failed.
        path: Utf8PathBuf,
        /// The underlying write error.
        #[source]
        error: AtomicWriteError,
    },
}

/// An error that occurred during an atomic file write.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AtomicWriteError {
    /// Writing contents to the temporary file failed.
    #[error("writing file contents failed")]
    Write(#[source] io::Error),

    /// The atomic write infrastructure failed (e.g., creating the
    /// temporary file, or renaming it into place).
    #[error("atomic create or rename failed")]
    Rename(#[source] io::Error),
}
