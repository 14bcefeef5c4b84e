//! Reading and writing the curated playlist file.
//!
//! Failures here are fatal for a run, so they carry their own error type
//! that the CLI can map to a dedicated exit status.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::domain::Entry;

use super::{parser, serializer};

/// Errors reading or writing the curated playlist
#[derive(Debug, Error)]
pub enum PlaylistFileError {
    #[error("Failed to read playlist {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write playlist {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PlaylistFileError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } => path,
        }
    }
}

/// Read and parse a playlist file
pub async fn load(path: &Path) -> Result<Vec<Entry>, PlaylistFileError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| PlaylistFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let entries = parser::parse(&content);
    debug!(path = %path.display(), entries = entries.len(), "Parsed playlist");
    Ok(entries)
}

/// Serialize entries and replace `path` atomically.
///
/// The text is written to a temporary file next to the destination and
/// renamed over it, so a failed write leaves the original untouched.
pub async fn save(path: &Path, entries: &[Entry]) -> Result<(), PlaylistFileError> {
    let content = serializer::serialize(entries);
    let target = path.to_path_buf();

    tokio::task::spawn_blocking(move || write_atomic(&target, &content))
        .await
        .map_err(|e| PlaylistFileError::Write {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, e),
        })?
        .map_err(|source| PlaylistFileError::Write {
            path: path.to_path_buf(),
            source,
        })
}

fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".iptv-sync")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
