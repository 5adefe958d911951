// Copyright 2026 Oxide Computer Company

//! The temporary directory a release is built in.

use crate::WorkspaceError;
use camino::{Utf8Path, Utf8PathBuf};
use camino_tempfile::Utf8TempDir;

const WORKSPACE_PREFIX: &str = "mktarball-";

/// A uniquely-named temporary directory owned by a single run.
///
/// Dropping a `Workspace` removes it. Call [`Workspace::close`] to remove it
/// and observe errors, or [`Workspace::keep`] to leave it on disk.
#[derive(Debug)]
pub struct Workspace {
    dir: Utf8TempDir,
}

impl Workspace {
    /// Creates a new workspace inside `parent`, or inside the system
    /// temporary directory if `parent` is `None`.
    ///
    /// The name is chosen so that it never collides with an existing path,
    /// including workspaces of concurrently running instances.
    pub fn create(parent: Option<&Utf8Path>) -> Result<Self, WorkspaceError> {
        let parent = match parent {
            Some(parent) => parent.to_owned(),
            None => Utf8PathBuf::from(
                std::env::temp_dir().to_string_lossy().into_owned(),
            ),
        };
        // Tools are later run from inside the workspace, so paths into it
        // must not depend on the current directory.
        let parent = std::path::absolute(&parent)
            .map(|path| Utf8PathBuf::from(path.to_string_lossy().into_owned()))
            .map_err(|error| WorkspaceError::Create {
                parent: parent.clone(),
                error,
            })?;
        let dir = camino_tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(&parent)
            .map_err(|error| WorkspaceError::Create { parent, error })?;
        tracing::debug!(path = %dir.path(), "created workspace");
        Ok(Workspace { dir })
    }

    /// Returns the workspace directory.
    pub fn path(&self) -> &Utf8Path {
        self.dir.path()
    }

    /// Recursively removes the workspace and everything in it.
    pub fn close(self) -> Result<(), WorkspaceError> {
        let path = self.dir.path().to_owned();
        self.dir
            .close()
            .map_err(|error| WorkspaceError::Remove { path, error })
    }

    /// Leaves the workspace on disk and returns its path.
    pub fn keep(self) -> Utf8PathBuf {
        self.dir.into_path()
    }
}
