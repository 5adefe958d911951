// Copyright 2026 Oxide Computer Company

//! Value types for building source release tarballs.
//!
//! A release is described by three values:
//!
//! - a [`CommitId`], the immutable object id a human-given revision
//!   (branch, tag, abbreviated hash) resolves to;
//! - a [`Label`] and [`ProjectName`], which become path components of the
//!   release;
//! - a [`ReleaseName`], derived from the above plus a [`ReleaseKind`], which
//!   names both the directory embedded in the archive and the archive files
//!   themselves.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use mktarball_types::{Label, ProjectName, ReleaseKind, ReleaseName};
//!
//! let project: ProjectName = "project".parse().unwrap();
//! let label: Label = "1.2".parse().unwrap();
//!
//! let name = ReleaseName::new(&project, &label, ReleaseKind::Release);
//! assert_eq!(name.top_dir(), "project-1.2");
//! assert_eq!(name.base_name(), "project-1.2");
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let label: Label = "0.12".parse().unwrap();
//! let name =
//!     ReleaseName::new(&project, &label, ReleaseKind::Snapshot { date });
//! assert_eq!(name.top_dir(), "project-0.12-20240301");
//! assert_eq!(name.base_name(), "project-current-0.12");
//! ```

#![deny(missing_docs)]

mod commit_id;
mod errors;
mod release_name;

pub use commit_id::CommitId;
pub use errors::{CommitIdParseError, NameError};
pub use release_name::{Label, ProjectName, ReleaseKind, ReleaseName};
