//! Input sources: a file path or `-` for standard input

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Path argument that selects standard input.
pub const STDIN_PATH: &str = "-";

/// Where stream bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Regular file on disk.
    File(PathBuf),
    /// Standard input, read as raw bytes.
    Stdin,
    /// Any other byte stream.
    Reader,
}

/// An opened input stream together with what is known about it up front.
pub struct InputSource {
    kind: SourceKind,
    reader: Box<dyn Read + Send>,
    total_size: Option<u64>,
}

impl InputSource {
    /// Open `path`, or standard input when `path` is `-`.
    ///
    /// Rust's stdin handle is byte-oriented on every platform, so no
    /// text/binary mode switch is needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.as_os_str() == STDIN_PATH {
            return Ok(Self {
                kind: SourceKind::Stdin,
                reader: Box::new(io::stdin()),
                total_size: None,
            });
        }

        let file = File::open(path)?;
        let total_size = file.metadata().ok().map(|m| m.len());

        Ok(Self {
            kind: SourceKind::File(path.to_path_buf()),
            reader: Box::new(file),
            total_size,
        })
    }

    /// Wrap an arbitrary reader, e.g. an in-memory buffer.
    pub fn from_reader(reader: impl Read + Send + 'static, total_size: Option<u64>) -> Self {
        Self {
            kind: SourceKind::Reader,
            reader: Box::new(reader),
            total_size,
        }
    }

    /// What kind of source this is.
    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    /// Size in bytes when the source is a regular file.
    pub fn total_size(&self) -> Option<u64> {
        self.total_size
    }

    /// Whether the source supports random access.
    pub fn is_seekable(&self) -> bool {
        matches!(self.kind, SourceKind::File(_))
    }

    /// Take the byte reader out of the source.
    pub fn into_reader(self) -> Box<dyn Read + Send> {
        self.reader
    }
}

impl std::fmt::Debug for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSource")
            .field("kind", &self.kind)
            .field("total_size", &self.total_size)
            .finish()
    }
}
