// Copyright 2026 Oxide Computer Company

//! Building generated artifacts inside an exported tree.
//!
//! The build is a nested all-or-nothing unit: [`Builder::build`] runs the
//! bootstrap script, configure and make in order, and returns at the first
//! failure. Every command runs with an explicit working directory.

use crate::BuildError;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use mktarball_types::ProjectName;
use std::{fmt, io, process::Command};

/// A step of the build, used to label errors and log output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildStep {
    /// Running the bootstrap script.
    Bootstrap,
    /// Running configure in the build directory.
    Configure,
    /// Building compiled translation catalogs.
    Translations,
    /// Relocating the generated packaging spec file.
    PackagingSpec,
    /// Building the whole project.
    Compile,
    /// Building or copying HTML documentation.
    Documentation,
    /// Regenerating the translation template.
    TranslationTemplate,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildStep::Bootstrap => "bootstrap",
            BuildStep::Configure => "configure",
            BuildStep::Translations => "translations",
            BuildStep::PackagingSpec => "packaging spec",
            BuildStep::Compile => "compile",
            BuildStep::Documentation => "documentation",
            BuildStep::TranslationTemplate => "translation template",
        };
        f.write_str(s)
    }
}

/// Where a release's HTML documentation comes from.
#[derive(Clone, Copy, Debug)]
pub enum DocSource<'a> {
    /// Copy a prebuilt documentation tree from this directory.
    Prebuilt(&'a Utf8Path),
    /// Build the project and its documentation from source.
    Build,
}

/// The build conventions of the project tree, as paths relative to the top
/// of the exported tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildLayout {
    /// The bootstrap script at the top of the tree.
    pub bootstrap_script: Utf8PathBuf,
    /// The out-of-tree build directory.
    pub build_dir: Utf8PathBuf,
    /// Flags passed to configure. All optional features are enabled so
    /// that every conditional option shows up in generated documentation.
    pub configure_flags: Vec<String>,
    /// The translation directory, both in the tree and the build directory.
    pub po_dir: Utf8PathBuf,
    /// The documentation directory in the build directory.
    pub doc_dir: Utf8PathBuf,
    /// Where HTML documentation lives in the tree, and where the build
    /// writes it relative to the build directory.
    pub html_dir: Utf8PathBuf,
    /// The directory the packaging spec file is moved into.
    pub packaging_dir: Utf8PathBuf,
    /// A file list written next to the generated HTML, which is not part of
    /// the release.
    pub html_manifest: String,
}

impl Default for BuildLayout {
    fn default() -> Self {
        BuildLayout {
            bootstrap_script: "autogen.sh".into(),
            build_dir: "_build".into(),
            configure_flags: [
                "--enable-nls",
                "--with-openssl",
                "--with-pam",
                "--with-ldap",
                "--with-libxml",
                "--with-systemd",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            po_dir: "po".into(),
            doc_dir: "doc".into(),
            html_dir: Utf8PathBuf::from("doc").join("html"),
            packaging_dir: "contrib".into(),
            html_manifest: "HTML.manifest".to_owned(),
        }
    }
}

/// Runs the project's own build tools in an exported tree.
#[derive(Debug)]
pub struct Builder<'a> {
    layout: &'a BuildLayout,
    project: &'a ProjectName,
    make: &'a str,
}

impl<'a> Builder<'a> {
    /// Creates a builder for `project` that runs `make` as its make program.
    pub fn new(
        layout: &'a BuildLayout,
        project: &'a ProjectName,
        make: &'a str,
    ) -> Self {
        Builder { layout, project, make }
    }

    /// Builds generated artifacts in `tree`.
    ///
    /// In order: bootstrap, configure in a fresh build directory, compiled
    /// translation catalogs into the tree's translation directory, the
    /// packaging spec file into the packaging directory, and then HTML
    /// documentation from `docs`.
    ///
    /// The build directory is left in place for the assembler to remove.
    pub fn build(
        &self,
        tree: &Utf8Path,
        docs: DocSource<'_>,
    ) -> Result<(), BuildError> {
        let build_dir = tree.join(&self.layout.build_dir);

        tracing::info!("running {}", self.layout.bootstrap_script);
        let mut bootstrap =
            Command::new(tree.join(&self.layout.bootstrap_script));
        run(BuildStep::Bootstrap, bootstrap.current_dir(tree))?;

        fs::create_dir(&build_dir).map_err(|error| BuildError::Io {
            step: BuildStep::Configure,
            path: build_dir.clone(),
            error,
        })?;

        tracing::info!("configuring");
        let mut configure = Command::new(tree.join("configure"));
        configure.args(&self.layout.configure_flags).current_dir(&build_dir);
        run(BuildStep::Configure, &mut configure)?;

        tracing::info!("building translations");
        let po_build_dir = build_dir.join(&self.layout.po_dir);
        self.make(
            BuildStep::Translations,
            &build_dir,
            &["-C", self.layout.po_dir.as_str()],
        )?;
        let po_dir = tree.join(&self.layout.po_dir);
        create_dir_all(BuildStep::Translations, &po_dir)?;
        let moved = move_matching(
            BuildStep::Translations,
            &po_build_dir,
            &po_dir,
            |name| name.ends_with(".gmo"),
        )?;
        if moved == 0 {
            return Err(BuildError::MissingOutput {
                step: BuildStep::Translations,
                path: po_build_dir.join("*.gmo"),
            });
        }

        let spec_file = format!("{}.spec", self.project);
        let packaging_dir = tree.join(&self.layout.packaging_dir);
        create_dir_all(BuildStep::PackagingSpec, &packaging_dir)?;
        move_file(
            BuildStep::PackagingSpec,
            &build_dir.join(&spec_file),
            &packaging_dir.join(&spec_file),
        )?;

        match docs {
            DocSource::Prebuilt(doc_dir) => self.copy_docs(tree, doc_dir),
            DocSource::Build => self.build_docs(tree, &build_dir),
        }
    }

    fn copy_docs(
        &self,
        tree: &Utf8Path,
        doc_dir: &Utf8Path,
    ) -> Result<(), BuildError> {
        tracing::info!(%doc_dir, "copying prebuilt documentation");
        let html_dir = tree.join(&self.layout.html_dir);
        copy_dir_all(BuildStep::Documentation, doc_dir, &html_dir)
    }

    fn build_docs(
        &self,
        tree: &Utf8Path,
        build_dir: &Utf8Path,
    ) -> Result<(), BuildError> {
        tracing::info!("building");
        self.make(BuildStep::Compile, build_dir, &[])?;

        tracing::info!("building documentation");
        self.make(
            BuildStep::Documentation,
            build_dir,
            &["-C", self.layout.doc_dir.as_str(), "html"],
        )?;
        let html_dir = tree.join(&self.layout.html_dir);
        create_dir_all(BuildStep::Documentation, &html_dir)?;
        // Single-page HTML lands in the doc directory itself, the chunked
        // rendering in its html subdirectory.
        let doc_build_dir = build_dir.join(&self.layout.doc_dir);
        let pages = move_matching(
            BuildStep::Documentation,
            &doc_build_dir,
            &html_dir,
            |name| name.ends_with(".html"),
        )?;
        let chunked = move_matching(
            BuildStep::Documentation,
            &build_dir.join(&self.layout.html_dir),
            &html_dir,
            |_| true,
        )?;
        if pages + chunked == 0 {
            return Err(BuildError::MissingOutput {
                step: BuildStep::Documentation,
                path: doc_build_dir.join("*.html"),
            });
        }
        let manifest = html_dir.join(&self.layout.html_manifest);
        match fs::remove_file(&manifest) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => {
                return Err(BuildError::Io {
                    step: BuildStep::Documentation,
                    path: manifest,
                    error,
                });
            }
        }

        tracing::info!("regenerating translation template");
        let pot_file = format!("{}.pot", self.project);
        self.make(
            BuildStep::TranslationTemplate,
            build_dir,
            &["-C", self.layout.po_dir.as_str(), &pot_file],
        )?;
        move_file(
            BuildStep::TranslationTemplate,
            &build_dir.join(&self.layout.po_dir).join(&pot_file),
            &tree.join(&self.layout.po_dir).join(&pot_file),
        )
    }

    fn make(
        &self,
        step: BuildStep,
        dir: &Utf8Path,
        args: &[&str],
    ) -> Result<(), BuildError> {
        let mut cmd = Command::new(self.make);
        cmd.args(args).current_dir(dir);
        run(step, &mut cmd)
    }
}

/// Runs `cmd` to completion with inherited stdio, so that build output
/// appears in the run's log.
fn run(step: BuildStep, cmd: &mut Command) -> Result<(), BuildError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let dir = cmd
        .get_current_dir()
        .map(|dir| Utf8PathBuf::from(dir.to_string_lossy().into_owned()))
        .unwrap_or_default();
    tracing::debug!(
        %step,
        %program,
        args = ?cmd.get_args().collect::<Vec<_>>(),
        %dir,
        "running",
    );

    let status = cmd.status().map_err(|source| BuildError::SpawnFailed {
        step,
        program: program.clone(),
        dir: dir.clone(),
        source,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(BuildError::CommandFailed {
            step,
            program,
            dir,
            exit_status: status.to_string(),
        })
    }
}

fn create_dir_all(step: BuildStep, path: &Utf8Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|error| BuildError::Io {
        step,
        path: path.to_owned(),
        error,
    })
}

/// Moves a file produced by a build step, failing with
/// [`BuildError::MissingOutput`] if the step didn't produce it.
fn move_file(
    step: BuildStep,
    from: &Utf8Path,
    to: &Utf8Path,
) -> Result<(), BuildError> {
    if !from.exists() {
        return Err(BuildError::MissingOutput { step, path: from.to_owned() });
    }
    fs::rename(from, to).map_err(|error| BuildError::Io {
        step,
        path: from.to_owned(),
        error,
    })
}

/// Moves every entry of `from` whose name satisfies `matches` into `to`,
/// returning how many were moved.
fn move_matching(
    step: BuildStep,
    from: &Utf8Path,
    to: &Utf8Path,
    matches: impl Fn(&str) -> bool,
) -> Result<usize, BuildError> {
    let io_err = |path: &Utf8Path| {
        let path = path.to_owned();
        move |error| BuildError::Io { step, path, error }
    };
    if !from.is_dir() {
        return Ok(0);
    }

    let mut moved = 0;
    for entry in from.read_dir_utf8().map_err(io_err(from))? {
        let entry = entry.map_err(io_err(from))?;
        if matches(entry.file_name()) {
            let dest = to.join(entry.file_name());
            // Directories can't be renamed over existing ones.
            if entry.path().is_dir() && dest.is_dir() {
                fs::remove_dir_all(&dest).map_err(io_err(&dest))?;
            }
            fs::rename(entry.path(), &dest).map_err(io_err(entry.path()))?;
            moved += 1;
        }
    }
    Ok(moved)
}

/// Recursively copies the contents of `from` into `to`, creating `to` and
/// any missing directories. Symlinks are copied as the files they point to.
fn copy_dir_all(
    step: BuildStep,
    from: &Utf8Path,
    to: &Utf8Path,
) -> Result<(), BuildError> {
    let io_err = |path: &Utf8Path| {
        let path = path.to_owned();
        move |error| BuildError::Io { step, path, error }
    };
    if !from.is_dir() {
        return Err(BuildError::Io {
            step,
            path: from.to_owned(),
            error: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        });
    }

    create_dir_all(step, to)?;
    for entry in from.read_dir_utf8().map_err(io_err(from))? {
        let entry = entry.map_err(io_err(from))?;
        let dest = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir_all(step, entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest).map_err(io_err(entry.path()))?;
        }
    }
    Ok(())
}
