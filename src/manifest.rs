//! File descriptors and the directory scan that produces a manifest.
//!
//! A manifest is the ordered list of top-level regular files in a sync
//! directory, each identified by base name, exact size and SHA-256 digest.

use crate::error::{Result, SyncError};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// One file's identity and content fingerprint.
///
/// Two descriptors are equal only when name, size and hash all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Base name within the sync directory
    pub name: String,
    /// Exact content length at hash time
    pub size: u64,
    /// Lowercase hex SHA-256 of the content
    pub hash: String,
}

/// Ordered list of descriptors describing one side's files.
pub type Manifest = Vec<FileDescriptor>;

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64, hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            hash: hash.into(),
        }
    }

    /// The all-empty descriptor. Never names a real file.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.size == 0 && self.hash.is_empty()
    }
}

impl fmt::Display for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.name, self.hash, self.size)
    }
}

/// Whether `name` may address a file directly inside the sync directory.
///
/// Only separators of the current platform are rejected, so the scan and
/// the wire decoder agree on every name.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.chars().any(|c| c == '\0' || std::path::is_separator(c))
}

/// Hash a file's full content, returning (bytes read, hex digest).
pub fn hash_file(path: &Path) -> Result<(u64, String)> {
    let mut file = File::open(path).map_err(|e| SyncError::local_io(path, e))?;
    let mut hasher = Sha256::new();
    let size = io::copy(&mut file, &mut hasher).map_err(|e| SyncError::local_io(path, e))?;
    Ok((size, hex::encode(hasher.finalize())))
}

/// Scan `root` and describe every top-level file, ordered by name.
///
/// Blocking: reads every file in full.
pub fn build_manifest(root: &Path) -> Result<Manifest> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(true)
        .max_depth(Some(1))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = root.to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("directory walk failed"));
            SyncError::local_io(path, source)
        })?;

        if entry.depth() == 0 {
            continue;
        }
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        // Names travel as UTF-8; anything else cannot be offered
        let Some(name) = entry.file_name().to_str() else {
            tracing::warn!("skipping {}: file name is not valid UTF-8", entry.path().display());
            continue;
        };
        if !is_valid_name(name) {
            return Err(SyncError::local_io(
                entry.path(),
                io::Error::new(io::ErrorKind::InvalidData, "file name cannot be synced"),
            ));
        }
        files.push((name.to_string(), entry.path().to_path_buf()));
    }

    files
        .par_iter()
        .map(|(name, path)| -> Result<FileDescriptor> {
            tracing::debug!("hashing {}", path.display());
            let (size, hash) = hash_file(path)?;
            Ok(FileDescriptor::new(name.clone(), size, hash))
        })
        .collect()
}

/// Async wrapper around [`build_manifest`].
pub async fn scan(root: PathBuf) -> Result<Manifest> {
    let dir = root.clone();
    tokio::task::spawn_blocking(move || build_manifest(&dir))
        .await
        .map_err(|e| SyncError::local_io(root, io::Error::other(e)))?
}
