// Copyright 2026 Oxide Computer Company

//! Revision resolution and export against real git repositories.

use anyhow::Result;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::Utf8Path;
use camino_tempfile::Utf8TempDir;
use mktarball_types::CommitId;
use mktarball_vcs::{
    COMMIT_ID_FILE, EXPORT_DIR_NAME, ExportError, Exporter, ResolveError,
    Vcs, Workspace,
};
use std::{fs, io::Write, process::Command};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Returns a `Command` for git, respecting the `$GIT` environment variable.
fn git_command() -> Command {
    let bin = std::env::var("GIT").unwrap_or_else(|_| "git".to_string());
    Command::new(bin)
}

/// Runs git in `repo_root`, asserting success, and returns trimmed stdout.
fn git(repo_root: &Utf8Path, args: &[&str]) -> Result<String> {
    let output = git_command().args(args).current_dir(repo_root).output()?;
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

/// Writes content to a file atomically.
fn write_file(
    path: impl AsRef<Utf8Path>,
    content: impl AsRef<[u8]>,
) -> std::io::Result<()> {
    let path = path.as_ref();
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(content.as_ref()))
        .map_err(|e| e.into())
}

/// Initializes a git repository and configures the user.
fn init_git_repo(repo_root: &Utf8Path) -> Result<()> {
    git(repo_root, &["init", "--initial-branch=main"])?;
    git(repo_root, &["config", "user.email", "test@example.com"])?;
    git(repo_root, &["config", "user.name", "Test User"])?;
    Ok(())
}

/// Sets up a temporary repository with two commits and a tag on the first.
/// Returns (temp_dir, first_commit, second_commit).
fn setup_git_repo() -> Result<(Utf8TempDir, String, String)> {
    let temp = Utf8TempDir::with_prefix("mktarball-vcs-")?;
    let repo_root = temp.path();
    init_git_repo(repo_root)?;

    fs::create_dir_all(repo_root.join("src"))?;
    write_file(repo_root.join("README"), "version one\n")?;
    write_file(repo_root.join("src").join("main.c"), "int main(void);\n")?;
    git(repo_root, &["add", "."])?;
    git(repo_root, &["commit", "-m", "first"])?;
    git(repo_root, &["tag", "-a", "v1.0", "-m", "release 1.0"])?;
    let first = git(repo_root, &["rev-parse", "HEAD"])?;

    write_file(repo_root.join("README"), "version two\n")?;
    git(repo_root, &["commit", "-am", "second"])?;
    let second = git(repo_root, &["rev-parse", "HEAD"])?;

    Ok((temp, first, second))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_resolve_revision_forms() -> Result<()> {
    let (temp, first, second) = setup_git_repo()?;
    let vcs = Vcs::git()?;

    let cases = [
        ("HEAD", &second),
        ("main", &second),
        ("HEAD~1", &first),
        // Annotated tags are peeled to the commit.
        ("v1.0", &first),
        (&first[..10], &first),
    ];
    for (revision, expected) in cases {
        let commit = vcs.resolve_commit(temp.path(), revision)?;
        assert_eq!(&commit.to_string(), expected, "revision {revision}");
    }

    Ok(())
}

#[test]
fn test_resolve_unknown_revision() -> Result<()> {
    let (temp, _, _) = setup_git_repo()?;
    let vcs = Vcs::git()?;

    let err = vcs.resolve_commit(temp.path(), "no-such-branch").unwrap_err();
    assert!(
        matches!(err, ResolveError::UnknownRevision { .. }),
        "unknown branch should fail to resolve, got {err:?}"
    );

    Ok(())
}

#[test]
fn test_resolve_non_commit_object() -> Result<()> {
    let (temp, _, _) = setup_git_repo()?;
    let vcs = Vcs::git()?;

    // A tree object does not peel to a commit.
    let err = vcs.resolve_commit(temp.path(), "HEAD^{tree}").unwrap_err();
    assert!(
        matches!(err, ResolveError::UnknownRevision { .. }),
        "tree object should not resolve to a commit, got {err:?}"
    );

    Ok(())
}

#[test]
fn test_resolve_not_a_repository() -> Result<()> {
    let temp = Utf8TempDir::with_prefix("mktarball-vcs-")?;
    let vcs = Vcs::git()?;

    let err = vcs.resolve_commit(temp.path(), "HEAD").unwrap_err();
    assert!(
        matches!(err, ResolveError::UnknownRevision { .. }),
        "a directory outside any repository cannot resolve revisions"
    );

    Ok(())
}

#[test]
fn test_export_tree_and_marker() -> Result<()> {
    let (temp, first, _) = setup_git_repo()?;
    let vcs = Vcs::git()?;
    let commit = vcs.resolve_commit(temp.path(), "v1.0")?;

    let parent = Utf8TempDir::with_prefix("mktarball-vcs-ws-")?;
    let workspace = Workspace::create(Some(parent.path()))?;
    let tree = Exporter::new(vcs).export(temp.path(), commit, &workspace)?;

    assert_eq!(tree.root(), workspace.path().join(EXPORT_DIR_NAME));
    assert_eq!(tree.commit(), commit);
    assert_eq!(
        fs::read_to_string(tree.root().join("README"))?,
        "version one\n",
        "tree contents should come from the tagged commit"
    );
    assert!(tree.root().join("src").join("main.c").is_file());

    let marker = fs::read_to_string(tree.root().join(COMMIT_ID_FILE))?;
    assert_eq!(marker, format!("{first}\n"), "marker holds the full id");
    assert!(
        !tree.root().join(".git").exists(),
        "export must not contain repository metadata"
    );

    Ok(())
}

#[test]
fn test_export_marker_independent_of_revision_form() -> Result<()> {
    let (temp, _, second) = setup_git_repo()?;
    let vcs = Vcs::git()?;
    let parent = Utf8TempDir::with_prefix("mktarball-vcs-ws-")?;

    for revision in ["HEAD", "main", &second[..8]] {
        let commit = vcs.resolve_commit(temp.path(), revision)?;
        let workspace = Workspace::create(Some(parent.path()))?;
        let tree =
            Exporter::new(vcs.clone()).export(temp.path(), commit, &workspace)?;
        let marker = fs::read(tree.root().join(COMMIT_ID_FILE))?;
        assert_eq!(marker, format!("{second}\n").into_bytes(), "{revision}");
    }

    Ok(())
}

#[test]
fn test_export_twice_into_same_workspace() -> Result<()> {
    let (temp, _, _) = setup_git_repo()?;
    let vcs = Vcs::git()?;
    let commit = vcs.resolve_commit(temp.path(), "HEAD")?;
    let parent = Utf8TempDir::with_prefix("mktarball-vcs-ws-")?;
    let workspace = Workspace::create(Some(parent.path()))?;
    let exporter = Exporter::new(vcs);

    exporter.export(temp.path(), commit, &workspace)?;
    let err = exporter.export(temp.path(), commit, &workspace).unwrap_err();
    assert!(
        matches!(err, ExportError::AlreadyExported { .. }),
        "second export should not clobber the first"
    );

    Ok(())
}

#[test]
fn test_export_missing_commit() -> Result<()> {
    let (temp, _, _) = setup_git_repo()?;
    let commit: CommitId = "0123456789abcdef0123456789abcdef01234567".parse()?;
    let parent = Utf8TempDir::with_prefix("mktarball-vcs-ws-")?;
    let workspace = Workspace::create(Some(parent.path()))?;

    let err = Exporter::new(Vcs::git()?)
        .export(temp.path(), commit, &workspace)
        .unwrap_err();
    assert!(
        matches!(err, ExportError::VcsFailed { .. }),
        "archiving a commit that isn't in the repository should fail, \
         got {err:?}"
    );

    Ok(())
}
