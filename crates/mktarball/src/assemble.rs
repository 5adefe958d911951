// Copyright 2026 Oxide Computer Company

//! Turning a built tree into the release directory layout.

use crate::{AssembleError, BuildLayout};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use mktarball_types::ReleaseName;
use std::io;

/// Removes the build directory from `tree` and renames `tree` to the
/// release's top-level directory, next to it in the workspace.
///
/// Returns the path of the release directory.
pub fn assemble(
    tree: &Utf8Path,
    layout: &BuildLayout,
    name: &ReleaseName,
) -> Result<Utf8PathBuf, AssembleError> {
    let build_dir = tree.join(&layout.build_dir);
    match fs::remove_dir_all(&build_dir) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => {
            return Err(AssembleError::RemoveBuildDir {
                path: build_dir,
                error,
            });
        }
    }

    let release_dir = match tree.parent() {
        Some(parent) => parent.join(name.top_dir()),
        None => Utf8PathBuf::from(name.top_dir()),
    };
    if release_dir.exists() {
        return Err(AssembleError::AlreadyExists { path: release_dir });
    }
    fs::rename(tree, &release_dir).map_err(|error| AssembleError::Rename {
        from: tree.to_owned(),
        to: release_dir.clone(),
        error,
    })?;
    tracing::info!(release_dir = %release_dir, "assembled release directory");

    Ok(release_dir)
}
