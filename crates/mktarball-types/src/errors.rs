// Copyright 2026 Oxide Computer Company

//! Error types for release value parsing.

use thiserror::Error;

/// An error that occurs while parsing a [`CommitId`](crate::CommitId).
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum CommitIdParseError {
    /// The commit id has an invalid length.
    #[error(
        "invalid length: expected 40 (SHA-1) or 64 (SHA-256) hex characters, \
         got {0}"
    )]
    InvalidLength(usize),

    /// The commit id is not valid hexadecimal.
    #[error("invalid hexadecimal")]
    InvalidHex(hex::FromHexError),
}

/// An error that occurs while validating a name that becomes a path
/// component of a release, such as a [`Label`](crate::Label) or a
/// [`ProjectName`](crate::ProjectName).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum NameError {
    /// The name was empty.
    #[error("{kind} is empty")]
    Empty {
        /// What kind of name this is (e.g. "label").
        kind: &'static str,
    },

    /// The name contains a character that cannot appear in a file name.
    #[error("{kind} {value:?} contains invalid character {ch:?}")]
    InvalidChar {
        /// What kind of name this is (e.g. "label").
        kind: &'static str,
        /// The rejected name.
        value: String,
        /// The offending character.
        ch: char,
    },

    /// The name is `.` or `..`.
    #[error("{kind} {value:?} is not a plain file name")]
    NotPlainName {
        /// What kind of name this is (e.g. "label").
        kind: &'static str,
        /// The rejected name.
        value: String,
    },
}
