// Copyright 2026 Oxide Computer Company

//! Exporting a commit's tree into a workspace.

use crate::{AtomicWriteError, ExportError, Vcs, Workspace};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::{Utf8Path, Utf8PathBuf};
use mktarball_types::CommitId;
use std::io::Write;

/// The directory name every tree is exported under, independent of the
/// release label, so that build logs from different runs are comparable.
pub const EXPORT_DIR_NAME: &str = "mktarball-export";

/// The marker file at the top of an exported tree holding the full commit
/// id, for provenance tracking.
pub const COMMIT_ID_FILE: &str = "git-commit-id";

/// A tree exported into a workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedTree {
    root: Utf8PathBuf,
    commit: CommitId,
}

impl ExportedTree {
    /// Returns the top-level directory of the exported tree.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the commit the tree was exported from.
    pub fn commit(&self) -> CommitId {
        self.commit
    }
}

/// Exports trees from a repository into workspaces.
#[derive(Debug, Clone)]
pub struct Exporter {
    vcs: Vcs,
}

impl Exporter {
    /// Creates an exporter that archives trees with `vcs`.
    pub fn new(vcs: Vcs) -> Self {
        Exporter { vcs }
    }

    /// Exports the tree of `commit` into `workspace`.
    ///
    /// The tree is streamed out of the repository as a tar archive and
    /// unpacked to `<workspace>/mktarball-export`, then the commit id is
    /// written to [`COMMIT_ID_FILE`] at the top of the tree.
    pub fn export(
        &self,
        repo_root: &Utf8Path,
        commit: CommitId,
        workspace: &Workspace,
    ) -> Result<ExportedTree, ExportError> {
        let root = workspace.path().join(EXPORT_DIR_NAME);
        if root.exists() {
            return Err(ExportError::AlreadyExported { path: root });
        }

        let mut child = self
            .vcs
            .spawn_archive(repo_root, commit, EXPORT_DIR_NAME)
            .map_err(|source| ExportError::SpawnFailed {
                binary_path: self.vcs.binary().to_owned(),
                repo_root: repo_root.to_owned(),
                source,
            })?;

        let unpacked = match child.stdout.take() {
            Some(stdout) => {
                let mut archive = tar::Archive::new(stdout);
                archive.set_preserve_permissions(true);
                archive.unpack(workspace.path())
            }
            None => Ok(()),
        };
        if unpacked.is_err() {
            // Don't leave git blocked on a full pipe.
            let _ = child.kill();
        }

        let output = child.wait_with_output().map_err(|source| {
            ExportError::SpawnFailed {
                binary_path: self.vcs.binary().to_owned(),
                repo_root: repo_root.to_owned(),
                source,
            }
        })?;
        unpacked.map_err(|error| ExportError::Unpack {
            commit,
            workspace: workspace.path().to_owned(),
            error,
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::VcsFailed {
                commit,
                exit_status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        // An empty tree produces an archive with no entries at all.
        if !root.is_dir() {
            return Err(ExportError::MissingTree { commit, path: root });
        }

        write_marker(&root.join(COMMIT_ID_FILE), commit)?;
        tracing::info!(%commit, tree = %root, "exported tree");

        Ok(ExportedTree { root, commit })
    }
}

fn write_marker(path: &Utf8Path, commit: CommitId) -> Result<(), ExportError> {
    let contents = commit.to_marker_contents();
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(contents.as_bytes()))
        .map_err(|error| {
            let error = match error {
                atomicwrites::Error::Internal(e) => AtomicWriteError::Rename(e),
                atomicwrites::Error::User(e) => AtomicWriteError::Write(e),
            };
            ExportError::WriteMarker { path: path.to_owned(), error }
        })
}

// Tests are in tests/integration/export.rs.
