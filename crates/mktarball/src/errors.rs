// Copyright 2026 Oxide Computer Company

//! Error types for each stage of a release run.

use crate::build::BuildStep;
use camino::Utf8PathBuf;
use mktarball_types::NameError;
use mktarball_vcs::{ExportError, ResolveError, WorkspaceError};
use std::io;
use thiserror::Error;

/// An error in the command-line configuration.
///
/// These are detected before any side effect.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No repository directory was given on the command line or through
    /// `$MKTARBALL_GIT_DIR`.
    #[error("no git directory given (use -g or set MKTARBALL_GIT_DIR)")]
    MissingGitDir,

    /// No revision was given.
    #[error("no revision given (use -r)")]
    MissingRevision,

    /// The output directory is empty.
    #[error("output directory is empty")]
    EmptyOutDir,

    /// The label is not usable in a file name.
    #[error("invalid label")]
    InvalidLabel(#[source] NameError),

    /// The project name is not usable in a file name.
    #[error("invalid project name")]
    InvalidProject(#[source] NameError),

    /// No project name was given and none could be derived from the
    /// repository directory.
    #[error(
        "cannot derive a project name from {git_dir} (use -p or set \
         MKTARBALL_PROJECT)"
    )]
    NoProjectName {
        /// The repository directory.
        git_dir: Utf8PathBuf,
    },
}

/// An error that occurs while building generated artifacts in an exported
/// tree.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// Failed to spawn a build tool.
    #[error("{step}: failed to run {program:?} in {dir}")]
    SpawnFailed {
        /// The step being run.
        step: BuildStep,
        /// The program that could not be started.
        program: String,
        /// The working directory.
        dir: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A build tool exited unsuccessfully.
    #[error("{step}: {program:?} failed in {dir} ({exit_status})")]
    CommandFailed {
        /// The step being run.
        step: BuildStep,
        /// The program that failed.
        program: String,
        /// The working directory.
        dir: Utf8PathBuf,
        /// A human-readable description of the exit status.
        exit_status: String,
    },

    /// A build tool succeeded but did not produce an expected output.
    #[error("{step}: expected output {path} was not produced")]
    MissingOutput {
        /// The step being run.
        step: BuildStep,
        /// The missing output.
        path: Utf8PathBuf,
    },

    /// A filesystem operation failed.
    #[error("{step}: I/O error at {path}")]
    Io {
        /// The step being run.
        step: BuildStep,
        /// The path involved.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },
}

/// An error that occurs while turning the exported tree into the release
/// layout.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssembleError {
    /// Removing the build directory failed.
    #[error("failed to remove build directory {path}")]
    RemoveBuildDir {
        /// The build directory.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },

    /// The release directory already exists.
    #[error("release directory {path} already exists")]
    AlreadyExists {
        /// The release directory.
        path: Utf8PathBuf,
    },

    /// Renaming the tree failed.
    #[error("failed to rename {from} to {to}")]
    Rename {
        /// The exported tree.
        from: Utf8PathBuf,
        /// The release directory.
        to: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },
}

/// An error that occurs while creating archives and checksums.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PackageError {
    /// Writing an archive or checksum file failed.
    #[error("failed to write {path}")]
    Write {
        /// The file being written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },

    /// Reading a file failed.
    #[error("failed to read {path}")]
    Read {
        /// The file being read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },

    /// A checksum file is not in `<hex digest> *<file name>` form.
    #[error("malformed checksum file {path}: {line:?}")]
    MalformedChecksum {
        /// The checksum file.
        path: Utf8PathBuf,
        /// The offending contents.
        line: String,
    },

    /// A checksum does not match the file it describes.
    #[error(
        "checksum mismatch for {path}: recorded {expected}, computed \
         {actual}"
    )]
    ChecksumMismatch {
        /// The archive whose checksum was verified.
        path: Utf8PathBuf,
        /// The digest recorded in the checksum file.
        expected: String,
        /// The digest of the archive's current contents.
        actual: String,
    },
}

/// An error that occurs while moving outputs into the output directory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PublishError {
    /// The output directory does not exist.
    #[error("output directory {path} does not exist")]
    OutDirNotFound {
        /// The output directory.
        path: Utf8PathBuf,
    },

    /// The output directory is not a directory.
    #[error("output directory {path} is not a directory")]
    OutDirNotADirectory {
        /// The output directory.
        path: Utf8PathBuf,
    },

    /// Checking the output directory failed.
    #[error("failed to check output directory {path}")]
    OutDirIo {
        /// The output directory.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },

    /// Moving an output failed.
    #[error("failed to move {from} to {to}")]
    Move {
        /// The file in the workspace.
        from: Utf8PathBuf,
        /// The destination in the output directory.
        to: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        error: io::Error,
    },
}

/// An error from a release run, identifying the stage that failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// Resolving the revision failed. No workspace was created.
    #[error("failed to resolve revision")]
    Resolve(#[from] ResolveError),

    /// Creating or removing the workspace failed.
    #[error("workspace error")]
    Workspace(#[from] WorkspaceError),

    /// Exporting the tree failed.
    #[error("failed to export tree")]
    Export(#[from] ExportError),

    /// Building generated artifacts failed.
    #[error("build failed")]
    Build(#[from] BuildError),

    /// Assembling the release layout failed.
    #[error("failed to assemble release directory")]
    Assemble(#[from] AssembleError),

    /// Creating archives or checksums failed.
    #[error("packaging failed")]
    Package(#[from] PackageError),

    /// Publishing the outputs failed.
    #[error("failed to publish release files")]
    Publish(#[from] PublishError),
}
