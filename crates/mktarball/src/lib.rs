// Copyright 2026 Oxide Computer Company

//! Build distributable source release tarballs from a git repository.
//!
//! A run is a strictly sequential pipeline, and any failure ends it:
//!
//! 1. [`Config`] is built from command-line flags ([`Cli`]).
//! 2. The revision is resolved to a commit
//!    ([`mktarball_vcs::Vcs::resolve_commit`]).
//! 3. The commit's tree is exported into a fresh workspace
//!    ([`mktarball_vcs::Exporter`]).
//! 4. The project's bootstrap script, configure and make produce
//!    translations, the packaging spec file and HTML documentation
//!    ([`Builder`]).
//! 5. The tree is renamed to the release's top-level directory
//!    ([`assemble()`]).
//! 6. `.tar.gz` and `.tar.bz2` archives and `.md5` checksums are written
//!    ([`package()`]).
//! 7. The four release files are moved to the output directory and the
//!    workspace is removed ([`publish()`], [`run()`]).

#![deny(missing_docs)]

mod assemble;
mod build;
mod config;
mod errors;
mod package;
mod pipeline;
mod publish;

pub use assemble::assemble;
pub use build::{BuildLayout, BuildStep, Builder, DocSource};
pub use config::{Cli, Config};
pub use errors::{
    AssembleError, BuildError, ConfigError, PackageError, PublishError,
    RunError,
};
pub use package::{
    Packaged, checksum_path, package, verify_checksum_file, write_checksum_file,
};
pub use pipeline::{Published, run};
pub use publish::publish;
