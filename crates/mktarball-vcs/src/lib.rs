// Copyright 2026 Oxide Computer Company

//! Revision resolution and tree export for source release tarballs.
//!
//! This crate wraps the version control system as an external collaborator:
//!
//! - [`Vcs::resolve_commit`] turns a human-given revision (a branch, tag or
//!   abbreviated hash) into an immutable [`CommitId`].
//! - [`Exporter::export`] materializes the tree at that commit into a fresh
//!   [`Workspace`], under a fixed directory name, and records the commit id
//!   in a marker file at the top of the tree.
//!
//! # Usage
//!
//! ```no_run
//! use mktarball_vcs::{Exporter, Vcs, Workspace};
//!
//! let vcs = Vcs::git().expect("$GIT is valid UTF-8");
//! let commit = vcs
//!     .resolve_commit("/src/project".as_ref(), "v1.2")
//!     .expect("revision resolves");
//!
//! let workspace = Workspace::create(None).expect("created workspace");
//! let tree = Exporter::new(vcs)
//!     .export("/src/project".as_ref(), commit, &workspace)
//!     .expect("exported tree");
//! println!("exported {} into {}", tree.commit(), tree.root());
//! ```
//!
//! [`CommitId`]: mktarball_types::CommitId

#![deny(missing_docs)]

mod errors;
mod export;
mod vcs;
mod workspace;

pub use errors::{
    AtomicWriteError, ExportError, RepoCheckError, ResolveError, VcsEnvError,
    WorkspaceError,
};
pub use export::{COMMIT_ID_FILE, EXPORT_DIR_NAME, ExportedTree, Exporter};
pub use vcs::Vcs;
pub use workspace::Workspace;
