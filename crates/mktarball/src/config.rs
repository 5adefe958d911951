// Copyright 2026 Oxide Computer Company

//! Command-line options and the run configuration derived from them.

use crate::ConfigError;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use mktarball_types::{Label, ProjectName};

/// Build distributable source release tarballs from a git repository.
///
/// Exports REV, builds translations and documentation, and writes
/// `<project>-<label>.tar.gz` and `.tar.bz2` (plus `.md5` checksums) to the
/// output directory.
#[derive(Debug, Parser)]
#[command(name = "mktarball", version)]
pub struct Cli {
    /// Git repository to export from
    #[arg(short = 'g', long, env = "MKTARBALL_GIT_DIR", value_name = "DIR")]
    pub git_dir: Option<Utf8PathBuf>,

    /// Revision to export (branch, tag or commit)
    #[arg(short = 'r', long, value_name = "REV")]
    pub revision: Option<String>,

    /// Release label [default: REV]
    #[arg(short = 'l', long, value_name = "LABEL")]
    pub label: Option<String>,

    /// Build a dated snapshot instead of a release
    #[arg(short = 's', long)]
    pub snapshot: bool,

    /// Copy prebuilt HTML documentation from DIR instead of building it
    #[arg(short = 'd', long, value_name = "DIR")]
    pub doc_dir: Option<Utf8PathBuf>,

    /// Directory to write the release files to (must exist)
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    pub out_dir: Utf8PathBuf,

    /// Project name [default: name of the git directory]
    #[arg(short = 'p', long, env = "MKTARBALL_PROJECT", value_name = "NAME")]
    pub project: Option<String>,

    /// Directory to create the temporary workspace in
    #[arg(long, value_name = "DIR")]
    pub tmpdir: Option<Utf8PathBuf>,

    /// Leave the workspace on disk after a successful run
    #[arg(long)]
    pub keep_workspace: bool,

    /// make program to run
    #[arg(long, env = "MAKE", value_name = "PROG", default_value = "make")]
    pub make: String,
}

/// The validated configuration for a run.
///
/// Built once from [`Cli`]; precedence between flags and environment
/// variables has already been resolved, so nothing downstream reads the
/// environment for configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The git repository to export from.
    pub git_dir: Utf8PathBuf,
    /// The revision to export, as given by the user.
    pub revision: String,
    /// The release label.
    pub label: Label,
    /// The project name.
    pub project: ProjectName,
    /// Whether to build a dated snapshot.
    pub snapshot: bool,
    /// Prebuilt documentation to copy instead of building it.
    pub doc_dir: Option<Utf8PathBuf>,
    /// Where the release files go.
    pub out_dir: Utf8PathBuf,
    /// Where to create the workspace (the system temporary directory if
    /// `None`).
    pub workspace_parent: Option<Utf8PathBuf>,
    /// Whether to leave the workspace on disk after success.
    pub keep_workspace: bool,
    /// The make program.
    pub make: String,
}

impl Config {
    /// Validates parsed command-line options.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let git_dir = cli
            .git_dir
            .filter(|dir| !dir.as_str().is_empty())
            .ok_or(ConfigError::MissingGitDir)?;
        let revision = cli
            .revision
            .filter(|rev| !rev.is_empty())
            .ok_or(ConfigError::MissingRevision)?;
        if cli.out_dir.as_str().is_empty() {
            return Err(ConfigError::EmptyOutDir);
        }

        let label = cli
            .label
            .as_deref()
            .unwrap_or(&revision)
            .parse()
            .map_err(ConfigError::InvalidLabel)?;
        let project = match cli.project.filter(|p| !p.is_empty()) {
            Some(project) => project,
            None => default_project_name(&git_dir)?,
        }
        .parse()
        .map_err(ConfigError::InvalidProject)?;

        Ok(Config {
            git_dir,
            revision,
            label,
            project,
            snapshot: cli.snapshot,
            doc_dir: cli.doc_dir.filter(|dir| !dir.as_str().is_empty()),
            out_dir: cli.out_dir,
            workspace_parent: cli.tmpdir,
            keep_workspace: cli.keep_workspace,
            make: cli.make,
        })
    }
}

/// Derives the project name from the repository directory: its file name,
/// with a bare repository's `.git` suffix removed.
fn default_project_name(git_dir: &Utf8Path) -> Result<String, ConfigError> {
    let no_name = || ConfigError::NoProjectName { git_dir: git_dir.to_owned() };

    // `.` and `..` have no file name; look at the real path instead.
    let resolved;
    let dir = if git_dir.file_name().is_some() {
        git_dir
    } else {
        resolved = git_dir.canonicalize_utf8().map_err(|_| no_name())?;
        &resolved
    };
    let name = dir.file_name().ok_or_else(no_name)?;
    let name = name.strip_suffix(".git").unwrap_or(name);
    if name.is_empty() {
        return Err(no_name());
    }
    Ok(name.to_owned())
}
