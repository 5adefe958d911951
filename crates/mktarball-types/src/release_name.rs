// Copyright 2026 Oxide Computer Company

//! Release labels and the names derived from them.

use crate::NameError;
use chrono::NaiveDate;
use std::{fmt, str::FromStr};

/// Validates a name that will be embedded in a file or directory name.
fn validate_component(
    kind: &'static str,
    value: &str,
) -> Result<(), NameError> {
    if value.is_empty() {
        return Err(NameError::Empty { kind });
    }
    if value == "." || value == ".." {
        return Err(NameError::NotPlainName { kind, value: value.to_owned() });
    }
    if let Some(ch) = value
        .chars()
        .find(|&ch| {
            ch == '/' || ch == '\\' || ch.is_whitespace() || ch.is_control()
        })
    {
        return Err(NameError::InvalidChar {
            kind,
            value: value.to_owned(),
            ch,
        });
    }
    Ok(())
}

macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Returns the name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = NameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate_component($kind, s)?;
                Ok($name(s.to_owned()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

name_type!(
    /// A release label, such as `1.2` or `0.12`.
    ///
    /// Labels become part of file and directory names, so they must be
    /// non-empty, must not be `.` or `..`, and must not contain path
    /// separators, whitespace or control characters.
    Label,
    "label"
);

name_type!(
    /// The name of the project being released, used as the prefix of every
    /// release name.
    ///
    /// Subject to the same rules as [`Label`].
    ProjectName,
    "project name"
);

/// Whether a release is a stable numbered release or a dated snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseKind {
    /// A stable release, named only by its label.
    Release,
    /// A snapshot taken on `date`.
    Snapshot {
        /// The build date embedded in the top-level directory name.
        date: NaiveDate,
    },
}

/// The names a release is published under.
///
/// - `top_dir` is the single top-level directory inside the archive.
/// - `base_name` is the archive file stem (`<base_name>.tar.gz` etc).
///
/// For a [`ReleaseKind::Release`] both are `<project>-<label>`. For a
/// [`ReleaseKind::Snapshot`], `top_dir` is `<project>-<label>-<YYYYMMDD>`
/// and `base_name` is `<project>-current-<label>`, so that repeated
/// snapshots of the same label overwrite each other's archives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseName {
    top_dir: String,
    base_name: String,
}

impl ReleaseName {
    /// Computes the release name.
    pub fn new(
        project: &ProjectName,
        label: &Label,
        kind: ReleaseKind,
    ) -> Self {
        match kind {
            ReleaseKind::Release => {
                let name = format!("{project}-{label}");
                ReleaseName { top_dir: name.clone(), base_name: name }
            }
            ReleaseKind::Snapshot { date } => ReleaseName {
                top_dir: format!("{project}-{label}-{}", date.format("%Y%m%d")),
                base_name: format!("{project}-current-{label}"),
            },
        }
    }

    /// Returns the name of the top-level directory inside the archive.
    pub fn top_dir(&self) -> &str {
        &self.top_dir
    }

    /// Returns the archive file stem.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Returns the name of the uncompressed tar file.
    pub fn tar_file(&self) -> String {
        format!("{}.tar", self.base_name)
    }
}
