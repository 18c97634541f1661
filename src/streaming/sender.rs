//! Sender side of a sync session.
//!
//! Offers the local manifest, then serves requests one at a time until the
//! receiver ends the session.

use crate::error::{Result, SyncError};
use crate::manifest::{FileDescriptor, Manifest};
use crate::streaming::protocol::{read_request, write_manifest, Request};
use crate::streaming::stats::SyncStats;
use crate::streaming::transfer::{copy_exact, progress_bar};
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Sender configuration
pub struct SenderConfig {
    /// Directory the manifest was built from
    pub root: PathBuf,
    /// Draw a progress bar per file
    pub show_progress: bool,
}

/// Sender state
pub struct Sender {
    config: SenderConfig,
    manifest: Manifest,
    offered: HashSet<FileDescriptor>,
    stats: SyncStats,
}

impl Sender {
    pub fn new(config: SenderConfig, manifest: Manifest) -> Self {
        let offered = manifest.iter().cloned().collect();
        let stats = SyncStats {
            files_offered: manifest.len() as u64,
            ..SyncStats::default()
        };
        Self {
            config,
            manifest,
            offered,
            stats,
        }
    }

    pub fn manifest(&self) -> &[FileDescriptor] {
        &self.manifest
    }

    /// Run the session to completion over one stream.
    pub async fn run<R, W>(mut self, reader: &mut R, writer: &mut W) -> Result<SyncStats>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        write_manifest(writer, &self.manifest).await?;
        tracing::info!("offered {} files", self.manifest.len());

        loop {
            match read_request(reader).await? {
                Some(Request::File(fd)) => self.serve(fd, writer).await?,
                Some(Request::End) => break,
                None => return Err(SyncError::Disconnected),
            }
        }

        writer.shutdown().await.map_err(SyncError::Stream)?;
        tracing::info!(
            "done: served {} files, {} bytes",
            self.stats.files_transferred,
            self.stats.bytes_transferred
        );
        Ok(self.stats)
    }

    async fn serve<W>(&mut self, fd: FileDescriptor, writer: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        // Only exact (name, size, hash) matches are servable
        if !self.offered.contains(&fd) {
            return Err(SyncError::UnknownRequest(fd));
        }
        self.stats.files_requested += 1;

        tracing::info!("sending: {}", fd.name);
        let path = self.config.root.join(&fd.name);
        let mut file = File::open(&path)
            .await
            .map_err(|e| SyncError::local_io(&path, e))?;

        let bar = progress_bar(&fd.name, fd.size, self.config.show_progress);
        let sent = copy_exact(&mut file, writer, &fd.name, fd.size, &bar).await?;
        bar.finish_and_clear();

        tracing::debug!("sent {} bytes of {}", sent, fd.name);
        self.stats.record_transfer(sent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::build_manifest;
    use crate::streaming::protocol::{read_manifest, write_request};
    use std::fs;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    fn sender_for(tmp: &TempDir) -> Sender {
        let manifest = build_manifest(tmp.path()).unwrap();
        Sender::new(
            SenderConfig {
                root: tmp.path().to_path_buf(),
                show_progress: false,
            },
            manifest,
        )
    }

    #[tokio::test]
    async fn test_sender_serves_request_then_end() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.params"), "hello world").unwrap();
        let sender = sender_for(&tmp);
        let wanted = sender.manifest()[0].clone();

        let mut requests = Vec::new();
        write_request(&mut requests, &Request::File(wanted.clone()))
            .await
            .unwrap();
        write_request(&mut requests, &Request::End).await.unwrap();

        let mut reader: &[u8] = &requests;
        let mut out = Vec::new();
        let stats = sender.run(&mut reader, &mut out).await.unwrap();

        assert_eq!(stats.files_offered, 1);
        assert_eq!(stats.files_requested, 1);
        assert_eq!(stats.bytes_transferred, 11);

        let mut wire: &[u8] = &out;
        assert_eq!(read_manifest(&mut wire).await.unwrap(), vec![wanted]);
        let mut content = String::new();
        wire.read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "hello world");
    }

    #[tokio::test]
    async fn test_sender_rejects_unknown_request() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.params"), "hello world").unwrap();
        let sender = sender_for(&tmp);
        let mut wrong_size = sender.manifest()[0].clone();
        wrong_size.size += 1;

        let mut requests = Vec::new();
        write_request(&mut requests, &Request::File(wrong_size.clone()))
            .await
            .unwrap();

        let mut reader: &[u8] = &requests;
        let mut out = Vec::new();
        let err = sender.run(&mut reader, &mut out).await.unwrap_err();

        match err {
            SyncError::UnknownRequest(fd) => assert_eq!(fd, wrong_size),
            other => panic!("Expected UnknownRequest, got {:?}", other),
        }

        // Nothing but the manifest went out
        let mut wire: &[u8] = &out;
        read_manifest(&mut wire).await.unwrap();
        assert!(wire.is_empty());
    }

    #[tokio::test]
    async fn test_sender_file_shrank_is_short_transfer() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.params"), "hello world").unwrap();
        let sender = sender_for(&tmp);
        let wanted = sender.manifest()[0].clone();
        fs::write(tmp.path().join("a.params"), "hello").unwrap();

        let mut requests = Vec::new();
        write_request(&mut requests, &Request::File(wanted))
            .await
            .unwrap();

        let mut reader: &[u8] = &requests;
        let mut out = Vec::new();
        let err = sender.run(&mut reader, &mut out).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::ShortTransfer {
                expected: 11,
                actual: 5,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_sender_peer_hangup() {
        let tmp = TempDir::new().unwrap();
        let sender = sender_for(&tmp);

        let mut reader: &[u8] = &[];
        let mut out = Vec::new();
        let err = sender.run(&mut reader, &mut out).await.unwrap_err();
        assert!(matches!(err, SyncError::Disconnected));
    }
}
