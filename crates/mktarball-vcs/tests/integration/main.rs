// Copyright 2026 Oxide Computer Company

//! Integration tests for mktarball-vcs.

mod export;
