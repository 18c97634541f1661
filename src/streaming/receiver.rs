//! Receiver side of a sync session.
//!
//! Reads the sender's manifest, requests every file it has no local copy of
//! (by name), writes each one as it arrives, then ends the session.

use crate::diff::{diff, Decision};
use crate::error::{Result, SyncError};
use crate::manifest::{FileDescriptor, Manifest};
use crate::streaming::protocol::{read_manifest, write_request, Request};
use crate::streaming::stats::SyncStats;
use crate::streaming::transfer::{copy_exact, progress_bar};
use std::io;
use std::path::PathBuf;
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Receiver configuration
pub struct ReceiverConfig {
    /// Directory files are written into
    pub root: PathBuf,
    /// Draw a progress bar per file
    pub show_progress: bool,
}

/// Receiver state
pub struct Receiver {
    config: ReceiverConfig,
    local: Manifest,
    stats: SyncStats,
}

impl Receiver {
    pub fn new(config: ReceiverConfig, local: Manifest) -> Self {
        Self {
            config,
            local,
            stats: SyncStats::new(),
        }
    }

    /// Run the session to completion over one stream.
    pub async fn run<R, W>(mut self, reader: &mut R, writer: &mut W) -> Result<SyncStats>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let remote = read_manifest(reader).await?;
        self.stats.files_offered = remote.len() as u64;
        tracing::info!("sender offered {} files", remote.len());

        for (fd, decision) in diff(&remote, &self.local) {
            match decision {
                Decision::AlreadyHave => {
                    tracing::debug!("already have {}", fd.name);
                    self.stats.already_present += 1;
                }
                Decision::HashMismatch => {
                    // Local copy is kept as-is
                    tracing::warn!("sender has file {} with different hash", fd.name);
                    self.stats.hash_mismatches += 1;
                }
                Decision::Need => {
                    tracing::info!("requesting: {}", fd.name);
                    write_request(writer, &Request::File(fd.clone())).await?;
                    self.stats.files_requested += 1;

                    let received = Self::fetch(&self.config, fd, reader).await?;
                    self.stats.record_transfer(received);
                }
            }
        }

        write_request(writer, &Request::End).await?;
        writer.shutdown().await.map_err(SyncError::Stream)?;

        tracing::info!(
            "done: received {} files, {} bytes",
            self.stats.files_transferred,
            self.stats.bytes_transferred
        );
        Ok(self.stats)
    }

    /// Receive one file's raw content into `root/name`.
    ///
    /// A failed transfer leaves whatever was written in place.
    async fn fetch<R>(config: &ReceiverConfig, fd: &FileDescriptor, reader: &mut R) -> Result<u64>
    where
        R: AsyncRead + Unpin,
    {
        let path = config.root.join(&fd.name);
        let mut file = match File::create(&path).await {
            Ok(file) => file,
            Err(e) => {
                // Subdirectories are not in the local manifest, so a
                // same-named one looks like a missing file
                let in_the_way = fs::metadata(&path).await.is_ok_and(|m| m.is_dir());
                let source = if in_the_way {
                    io::Error::new(
                        e.kind(),
                        format!("a directory is in the way of {}: {}", fd.name, e),
                    )
                } else {
                    e
                };
                return Err(SyncError::local_io(&path, source));
            }
        };

        let bar = progress_bar(&fd.name, fd.size, config.show_progress);
        let received = copy_exact(reader, &mut file, &fd.name, fd.size, &bar).await?;
        bar.finish_and_clear();

        file.sync_all()
            .await
            .map_err(|e| SyncError::local_io(&path, e))?;
        tracing::debug!("wrote {} bytes to {}", received, path.display());
        Ok(received)
    }
}
