// Copyright 2026 Oxide Computer Company

//! Creating release archives and their checksums.

use crate::PackageError;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err::File;
use md5::{Digest, Md5};
use mktarball_types::ReleaseName;
use std::io::{self, BufWriter, Write};

/// The files produced by [`package`], all inside the workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packaged {
    /// The uncompressed tar file. Not published.
    pub tar: Utf8PathBuf,
    /// The gzip-compressed archive.
    pub tar_gz: Utf8PathBuf,
    /// The bzip2-compressed archive.
    pub tar_bz2: Utf8PathBuf,
    /// The checksum file for [`Self::tar_gz`].
    pub tar_gz_md5: Utf8PathBuf,
    /// The checksum file for [`Self::tar_bz2`].
    pub tar_bz2_md5: Utf8PathBuf,
}

impl Packaged {
    /// Returns the four files that make up a release, in publishing order.
    pub fn release_files(&self) -> [&Utf8Path; 4] {
        [&self.tar_gz, &self.tar_bz2, &self.tar_gz_md5, &self.tar_bz2_md5]
    }
}

/// Packages `<workspace>/<top_dir>` as `<base_name>.tar.gz` and
/// `<base_name>.tar.bz2` in the workspace, each with a `.md5` checksum
/// file in `md5sum --binary` format.
///
/// The intermediate `<base_name>.tar` is kept next to the archives.
pub fn package(
    workspace: &Utf8Path,
    name: &ReleaseName,
) -> Result<Packaged, PackageError> {
    let tar = workspace.join(name.tar_file());
    let tar_gz = workspace.join(format!("{}.gz", name.tar_file()));
    let tar_bz2 = workspace.join(format!("{}.bz2", name.tar_file()));

    tracing::info!(%tar, "creating tar archive");
    write_tar(&tar, &workspace.join(name.top_dir()), name.top_dir())?;

    tracing::info!(%tar_bz2, "compressing with bzip2");
    compress(
        &tar,
        &tar_bz2,
        |file| bzip2::write::BzEncoder::new(file, bzip2::Compression::best()),
        |encoder: bzip2::write::BzEncoder<_>| encoder.finish(),
    )?;

    tracing::info!(%tar_gz, "compressing with gzip");
    compress(
        &tar,
        &tar_gz,
        |file| flate2::write::GzEncoder::new(file, flate2::Compression::best()),
        |encoder: flate2::write::GzEncoder<_>| encoder.finish(),
    )?;

    let tar_bz2_md5 = write_checksum_file(&tar_bz2)?;
    let tar_gz_md5 = write_checksum_file(&tar_gz)?;

    Ok(Packaged { tar, tar_gz, tar_bz2, tar_gz_md5, tar_bz2_md5 })
}

/// Writes a tar archive at `dest` containing `src` as the top-level
/// directory `top_dir`.
fn write_tar(
    dest: &Utf8Path,
    src: &Utf8Path,
    top_dir: &str,
) -> Result<(), PackageError> {
    let write_err =
        |error| PackageError::Write { path: dest.to_owned(), error };

    let file = File::create(dest).map_err(write_err)?;
    let mut builder = tar::Builder::new(BufWriter::new(file));
    // Symlinks in the source tree are archived as symlinks.
    builder.follow_symlinks(false);
    builder.append_dir_all(top_dir, src).map_err(write_err)?;
    builder
        .into_inner()
        .and_then(|writer| writer.into_inner().map_err(|e| e.into_error()))
        .and_then(|file| file.sync_all())
        .map_err(write_err)
}

/// Compresses `src` into `dest` with the encoder built by `encoder`,
/// leaving `src` in place.
fn compress<E, W>(
    src: &Utf8Path,
    dest: &Utf8Path,
    encoder: impl FnOnce(BufWriter<File>) -> E,
    finish: impl FnOnce(E) -> io::Result<W>,
) -> Result<(), PackageError>
where
    E: Write,
    W: Write,
{
    let mut input = File::open(src)
        .map_err(|error| PackageError::Read { path: src.to_owned(), error })?;
    let write_err =
        |error| PackageError::Write { path: dest.to_owned(), error };

    let output = File::create(dest).map_err(write_err)?;
    let mut encoder = encoder(BufWriter::new(output));
    io::copy(&mut input, &mut encoder).map_err(write_err)?;
    finish(encoder)
        .and_then(|mut writer| writer.flush())
        .map_err(write_err)
}

/// Computes the hex MD5 digest of the file at `path`.
fn md5_hex(path: &Utf8Path) -> Result<String, PackageError> {
    let mut file = File::open(path)
        .map_err(|error| PackageError::Read { path: path.to_owned(), error })?;
    let mut hasher = Md5::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|error| PackageError::Read { path: path.to_owned(), error })?;
    Ok(hex::encode(hasher.finalize()))
}

/// Returns the checksum file path for `archive`.
pub fn checksum_path(archive: &Utf8Path) -> Utf8PathBuf {
    let mut path = archive.as_str().to_owned();
    path.push_str(".md5");
    path.into()
}

/// Writes `<archive>.md5` next to `archive` in the binary-mode format of
/// `md5sum`: `<hex digest> *<file name>`, newline terminated.
///
/// Returns the path of the checksum file.
pub fn write_checksum_file(
    archive: &Utf8Path,
) -> Result<Utf8PathBuf, PackageError> {
    let digest = md5_hex(archive)?;
    let file_name = archive.file_name().unwrap_or(archive.as_str());
    let path = checksum_path(archive);
    fs_err::write(&path, format!("{digest} *{file_name}\n"))
        .map_err(|error| PackageError::Write { path: path.clone(), error })?;
    tracing::debug!(%path, %digest, "wrote checksum");
    Ok(path)
}

/// Checks a checksum file written by [`write_checksum_file`] against the
/// archive it names, which must be in the same directory.
///
/// Returns the path of the verified archive.
pub fn verify_checksum_file(
    path: &Utf8Path,
) -> Result<Utf8PathBuf, PackageError> {
    let contents = fs_err::read_to_string(path)
        .map_err(|error| PackageError::Read { path: path.to_owned(), error })?;
    let malformed = || PackageError::MalformedChecksum {
        path: path.to_owned(),
        line: contents.clone(),
    };

    let line = contents.strip_suffix('\n').ok_or_else(malformed)?;
    if line.contains('\n') {
        return Err(malformed());
    }
    let (expected, file_name) = line.split_once(' ').ok_or_else(malformed)?;
    // Binary mode is marked with '*', text mode with a second space.
    let file_name = file_name
        .strip_prefix('*')
        .or_else(|| file_name.strip_prefix(' '))
        .ok_or_else(malformed)?;
    if expected.len() != 32
        || !expected.bytes().all(|b| b.is_ascii_hexdigit())
        || file_name.is_empty()
        || file_name.contains('/')
    {
        return Err(malformed());
    }

    let archive = match path.parent() {
        Some(parent) => parent.join(file_name),
        None => Utf8PathBuf::from(file_name),
    };
    let actual = md5_hex(&archive)?;
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(PackageError::ChecksumMismatch {
            path: archive,
            expected: expected.to_owned(),
            actual,
        });
    }
    Ok(archive)
}
