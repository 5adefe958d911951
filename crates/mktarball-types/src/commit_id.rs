// Copyright 2026 Oxide Computer Company

//! Commit identifiers.

use crate::CommitIdParseError;
use std::{fmt, str::FromStr};

/// The immutable identifier of a commit object.
///
/// This type guarantees the contained value is either:
///
/// - 20 bytes (SHA-1, displayed as 40 lowercase hex characters)
/// - 32 bytes (SHA-256, displayed as 64 lowercase hex characters)
///
/// Abbreviated hashes, branch names and tags are *revisions*, not commit
/// ids; they must be resolved through the VCS first.
///
/// # Parsing
///
/// ```
/// use mktarball_types::CommitId;
///
/// let id: CommitId =
///     "0123456789abcdef0123456789abcdef01234567".parse().unwrap();
/// assert_eq!(
///     id.to_marker_contents(),
///     "0123456789abcdef0123456789abcdef01234567\n",
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommitId {
    /// A SHA-1 object id: the one traditionally used in Git.
    Sha1([u8; 20]),
    /// A SHA-256 object id, supported by newer versions of Git.
    Sha256([u8; 32]),
}

impl CommitId {
    /// Returns the raw object id.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            CommitId::Sha1(bytes) => bytes,
            CommitId::Sha256(bytes) => bytes,
        }
    }

    /// Returns the contents of the commit-id marker file written at the top
    /// of an exported tree: the full id followed by a single newline.
    pub fn to_marker_contents(&self) -> String {
        format!("{self}\n")
    }
}

/// Decodes exactly `N` bytes of hex.
fn decode<const N: usize>(s: &str) -> Result<[u8; N], CommitIdParseError> {
    let mut bytes = [0; N];
    hex::decode_to_slice(s, &mut bytes)
        .map_err(CommitIdParseError::InvalidHex)?;
    Ok(bytes)
}

impl FromStr for CommitId {
    type Err = CommitIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Git prints ids in full; the length alone tells the object format.
        match s.len() {
            40 => decode(s).map(CommitId::Sha1),
            64 => decode(s).map(CommitId::Sha256),
            len => Err(CommitIdParseError::InvalidLength(len)),
        }
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_bytes().iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}
