// Copyright 2026 Oxide Computer Company

//! Test repositories and stand-ins for the project's build tools.

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use camino_tempfile::Utf8TempDir;
use mktarball::{BuildLayout, Config};
use std::{
    collections::BTreeMap, fs, io::Read, os::unix::fs::PermissionsExt,
    process::Command,
};

/// A bootstrap script that leaves a marker behind.
const AUTOGEN_SH: &str =
    "#!/bin/sh\nset -e\necho bootstrapped > autogen.stamp\n";

/// A configure script that prepares the build directory and writes the
/// packaging spec file, recording the flags it was given.
const CONFIGURE: &str = "#!/bin/sh
set -e
mkdir -p po doc
printf '%s\\n' \"$@\" > project.spec
";

/// A make stand-in that understands exactly the targets a release build
/// runs, and fails on anything else.
pub const MAKE: &str = "#!/bin/sh
set -e
case \"$*\" in
  '-C po') echo de > po/de.gmo; echo fr > po/fr.gmo ;;
  '') echo built > compiled.stamp ;;
  '-C doc html')
    mkdir -p doc/html/chunked
    echo '<single/>' > doc/manual.html
    echo '<html/>' > doc/html/index.html
    echo '<p/>' > doc/html/chunked/ch01.html
    echo index.html > doc/html/HTML.manifest
    ;;
  '-C po project.pot') echo 'msgid \"\"' > po/project.pot ;;
  *) echo \"unexpected make invocation: $*\" >&2; exit 2 ;;
esac
";

/// Like [`MAKE`], but documentation fails to build.
pub const MAKE_BROKEN_DOCS: &str = "#!/bin/sh
case \"$*\" in
  '-C doc html') echo 'doc build failed' >&2; exit 1 ;;
  '-C po') echo de > po/de.gmo ;;
  *) ;;
esac
";

/// Returns a `Command` for git, respecting the `$GIT` environment variable.
fn git_command() -> Command {
    let bin = std::env::var("GIT").unwrap_or_else(|_| "git".to_string());
    Command::new(bin)
}

/// Runs git in `repo_root`, asserting success, and returns trimmed stdout.
pub fn git(repo_root: &Utf8Path, args: &[&str]) -> Result<String> {
    let output = git_command().args(args).current_dir(repo_root).output()?;
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

/// Writes an executable shell script.
pub fn write_script(path: &Utf8Path, contents: &str) -> Result<()> {
    fs::write(path, contents)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

/// A project repository plus scratch directories for a run.
pub struct Fixture {
    pub temp: Utf8TempDir,
    pub repo: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub tmp_dir: Utf8PathBuf,
    pub make: Utf8PathBuf,
    /// The commit tagged `v1.2`.
    pub tagged: String,
    /// The commit at `HEAD`.
    pub head: String,
}

impl Fixture {
    pub fn new() -> Result<Self> {
        Self::with_make(MAKE)
    }

    pub fn with_make(make_script: &str) -> Result<Self> {
        let temp = Utf8TempDir::with_prefix("mktarball-it-")?;
        let repo = temp.path().join("project");
        let out_dir = temp.path().join("out");
        let tmp_dir = temp.path().join("tmp");
        let make = temp.path().join("fake-make");
        for dir in [&repo, &out_dir, &tmp_dir] {
            fs::create_dir(dir)?;
        }
        write_script(&make, make_script)?;

        git(&repo, &["init", "--initial-branch=main"])?;
        git(&repo, &["config", "user.email", "test@example.com"])?;
        git(&repo, &["config", "user.name", "Test User"])?;

        fs::create_dir_all(repo.join("src"))?;
        fs::create_dir_all(repo.join("po"))?;
        fs::write(repo.join("README"), "release 1.2\n")?;
        fs::write(repo.join("src").join("main.c"), "int main(void);\n")?;
        fs::write(repo.join("po").join("POTFILES.in"), "src/main.c\n")?;
        write_script(&repo.join("autogen.sh"), AUTOGEN_SH)?;
        write_script(&repo.join("configure"), CONFIGURE)?;
        git(&repo, &["add", "."])?;
        git(&repo, &["commit", "-m", "release 1.2"])?;
        git(&repo, &["tag", "-a", "v1.2", "-m", "release 1.2"])?;
        let tagged = git(&repo, &["rev-parse", "HEAD"])?;

        fs::write(repo.join("README"), "development\n")?;
        git(&repo, &["commit", "-am", "start development"])?;
        let head = git(&repo, &["rev-parse", "HEAD"])?;

        Ok(Fixture { temp, repo, out_dir, tmp_dir, make, tagged, head })
    }

    /// Returns a configuration for a release of `revision` labelled `label`.
    pub fn config(&self, revision: &str, label: &str) -> Result<Config> {
        Ok(Config {
            git_dir: self.repo.clone(),
            revision: revision.to_owned(),
            label: label.parse()?,
            project: "project".parse()?,
            snapshot: false,
            doc_dir: None,
            out_dir: self.out_dir.clone(),
            workspace_parent: Some(self.tmp_dir.clone()),
            keep_workspace: false,
            make: self.make.to_string(),
        })
    }

    pub fn layout(&self) -> BuildLayout {
        BuildLayout::default()
    }

    /// Returns the sorted file names in the output directory.
    pub fn out_files(&self) -> Result<Vec<String>> {
        sorted_names(&self.out_dir)
    }

    /// Returns the sorted names of workspaces left behind.
    pub fn leftover_workspaces(&self) -> Result<Vec<String>> {
        sorted_names(&self.tmp_dir)
    }
}

fn sorted_names(dir: &Utf8Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in dir.read_dir_utf8()? {
        names.push(entry?.file_name().to_owned());
    }
    names.sort();
    Ok(names)
}

/// Reads every regular file in a `.tar.gz`, keyed by path.
pub fn read_tar_gz(path: &Utf8Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let decoder = flate2::read::GzDecoder::new(fs::File::open(path)?);
    let mut archive = tar::Archive::new(decoder);
    let mut files = BTreeMap::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path()?.to_string_lossy().into_owned();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        files.insert(path, contents);
    }
    Ok(files)
}
