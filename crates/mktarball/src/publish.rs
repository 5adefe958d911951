// Copyright 2026 Oxide Computer Company

//! Moving release files into the output directory.

use crate::{Packaged, PublishError};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::io;

/// Moves the release files of `packaged` into `out_dir`, replacing files of
/// the same name.
///
/// `out_dir` must already exist; it is never created. Returns the paths of
/// the published files.
pub fn publish(
    packaged: &Packaged,
    out_dir: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>, PublishError> {
    check_out_dir(out_dir)?;

    let mut published = Vec::with_capacity(4);
    for from in packaged.release_files() {
        let file_name = from.file_name().unwrap_or(from.as_str());
        let to = out_dir.join(file_name);
        move_file(from, &to)?;
        tracing::info!(path = %to, "published");
        published.push(to);
    }
    Ok(published)
}

fn check_out_dir(out_dir: &Utf8Path) -> Result<(), PublishError> {
    match fs::metadata(out_dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => {
            Err(PublishError::OutDirNotADirectory { path: out_dir.to_owned() })
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            Err(PublishError::OutDirNotFound { path: out_dir.to_owned() })
        }
        Err(error) => {
            Err(PublishError::OutDirIo { path: out_dir.to_owned(), error })
        }
    }
}

/// Renames `from` to `to`, falling back to copy and remove when they are on
/// different filesystems.
fn move_file(from: &Utf8Path, to: &Utf8Path) -> Result<(), PublishError> {
    let move_err = |error| PublishError::Move {
        from: from.to_owned(),
        to: to.to_owned(),
        error,
    };
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to).map_err(move_err)?;
            fs::remove_file(from).map_err(move_err)
        }
        Err(error) => Err(move_err(error)),
    }
}
