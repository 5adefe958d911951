// Copyright 2026 Oxide Computer Company

//! The end-to-end release run.

use crate::{
    BuildLayout, Builder, Config, DocSource, Packaged, RunError, assemble,
    package, publish,
};
use camino::Utf8PathBuf;
use chrono::NaiveDate;
use mktarball_types::{CommitId, ReleaseKind, ReleaseName};
use mktarball_vcs::{Exporter, Vcs, Workspace};

/// The result of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Published {
    /// The commit the release was built from.
    pub commit: CommitId,
    /// The names the release was published under.
    pub release: ReleaseName,
    /// The four files written to the output directory.
    pub files: Vec<Utf8PathBuf>,
    /// The workspace, if it was kept.
    pub kept_workspace: Option<Utf8PathBuf>,
}

/// Runs a release from start to finish.
///
/// Resolves the revision, exports it into a fresh workspace, builds,
/// assembles, packages and publishes, stopping at the first failure. `today`
/// is the date embedded in snapshot names.
///
/// If any stage after workspace creation fails, the workspace is left on
/// disk for inspection and its path is logged. After a successful run it is
/// removed unless [`Config::keep_workspace`] is set.
pub fn run(
    config: &Config,
    layout: &BuildLayout,
    vcs: &Vcs,
    today: NaiveDate,
) -> Result<Published, RunError> {
    tracing::info!(
        revision = %config.revision,
        git_dir = %config.git_dir,
        "resolving revision"
    );
    let commit = vcs.resolve_commit(&config.git_dir, &config.revision)?;

    let workspace = Workspace::create(config.workspace_parent.as_deref())?;
    tracing::info!(workspace = %workspace.path(), "created workspace");

    let kind = if config.snapshot {
        ReleaseKind::Snapshot { date: today }
    } else {
        ReleaseKind::Release
    };
    let release = ReleaseName::new(&config.project, &config.label, kind);

    let files = match build_and_publish(
        config, layout, vcs, commit, &workspace, &release,
    ) {
        Ok(files) => files,
        Err(error) => {
            let path = workspace.keep();
            tracing::warn!(workspace = %path, "leaving workspace in place");
            return Err(error);
        }
    };

    let kept_workspace = if config.keep_workspace {
        let path = workspace.keep();
        tracing::info!(workspace = %path, "keeping workspace");
        Some(path)
    } else {
        workspace.close()?;
        None
    };

    Ok(Published { commit, release, files, kept_workspace })
}

fn build_and_publish(
    config: &Config,
    layout: &BuildLayout,
    vcs: &Vcs,
    commit: CommitId,
    workspace: &Workspace,
    release: &ReleaseName,
) -> Result<Vec<Utf8PathBuf>, RunError> {
    tracing::info!(%commit, "exporting tree");
    let tree =
        Exporter::new(vcs.clone()).export(&config.git_dir, commit, workspace)?;

    let docs = match &config.doc_dir {
        Some(doc_dir) => DocSource::Prebuilt(doc_dir),
        None => DocSource::Build,
    };
    Builder::new(layout, &config.project, &config.make)
        .build(tree.root(), docs)?;

    let release_dir = assemble(tree.root(), layout, release)?;
    tracing::debug!(%release_dir, "release directory ready");

    let packaged: Packaged = package(workspace.path(), release)?;
    let files = publish(&packaged, &config.out_dir)?;
    Ok(files)
}
