//! Filesystem primitives used by the store
//!
//! Writes and directory swaps go through [`FileSink`] so a save can be
//! driven against a sink that fails on demand.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::trace;

use super::encoding;
use super::TextEncoding;

/// Destination for the files of one graph save
pub(crate) trait FileSink {
    fn create_dir(&mut self, path: &Path) -> io::Result<()>;

    /// Create `path`, which must not exist yet, holding `contents`
    fn write_file(&mut self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Writes straight to disk, syncing every file before returning
pub(crate) struct DiskSink;

impl FileSink for DiskSink {
    fn create_dir(&mut self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn write_file(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

/// Recursively copy the directory tree at `from` to `to`
///
/// `to` is created; its parent must exist.
pub(crate) fn copy_dir_all(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    trace!(from = %from.display(), to = %to.display(), "Copied directory");
    Ok(())
}

/// Remove `path` and everything under it, succeeding if it is already gone
pub(crate) fn remove_dir_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Read a whole text file, detecting its encoding
///
/// The outer error is I/O; the inner one describes undecodable bytes.
pub(crate) fn read_text(path: &Path) -> io::Result<Result<String, String>> {
    let bytes = fs::read(path)?;
    Ok(encoding::decode(&bytes))
}

/// Encode `text` and write it through `sink`
pub(crate) fn write_text(
    sink: &mut dyn FileSink,
    path: &Path,
    text: &str,
    encoding: TextEncoding,
) -> io::Result<()> {
    sink.write_file(path, &encoding::encode(text, encoding))
}
