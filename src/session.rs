//! End-to-end sync over TCP: connection, manifest scan, then the session.

use crate::error::{Result, SyncError};
use crate::manifest::{self, FileDescriptor};
use crate::streaming::{Receiver, ReceiverConfig, Sender, SenderConfig, SyncStats};
use crate::transport::tcp::{Connection, Listener};
use std::path::PathBuf;

/// Listen address used by `recv` when none is given
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:15123";

/// Local side of a session
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Sync directory (files live directly inside it)
    pub root: PathBuf,
    /// Draw per-file progress bars
    pub show_progress: bool,
}

/// Dial a receiver and offer every file in `options.root`.
///
/// `on_manifest` sees the local manifest before the exchange starts.
pub async fn sync_send<F>(addr: &str, options: &SyncOptions, on_manifest: F) -> Result<SyncStats>
where
    F: FnOnce(&[FileDescriptor]),
{
    let conn = Connection::dial(addr).await?;
    tracing::info!("connected to {}", conn.peer_addr());

    tracing::info!("computing file list for {}", options.root.display());
    let manifest = manifest::scan(options.root.clone()).await?;
    on_manifest(&manifest);

    let sender = Sender::new(
        SenderConfig {
            root: options.root.clone(),
            show_progress: options.show_progress,
        },
        manifest,
    );

    let (mut reader, mut writer) = conn.split();
    sender.run(&mut reader, &mut writer).await
}

/// Accept one sender on `listener` and fetch the files missing from
/// `options.root`, creating the directory if needed.
///
/// `on_manifest` sees the local manifest once the peer has connected.
pub async fn sync_recv<F>(
    listener: Listener,
    options: &SyncOptions,
    on_manifest: F,
) -> Result<SyncStats>
where
    F: FnOnce(&[FileDescriptor]),
{
    tokio::fs::create_dir_all(&options.root)
        .await
        .map_err(|e| SyncError::local_io(&options.root, e))?;

    tracing::info!("computing file list for {}", options.root.display());
    let manifest = manifest::scan(options.root.clone()).await?;

    tracing::info!("now waiting for connection from sender...");
    let conn = listener.accept_one().await?;
    tracing::info!("accepted connection from {}", conn.peer_addr());
    on_manifest(&manifest);

    let receiver = Receiver::new(
        ReceiverConfig {
            root: options.root.clone(),
            show_progress: options.show_progress,
        },
        manifest,
    );

    let (mut reader, mut writer) = conn.split();
    receiver.run(&mut reader, &mut writer).await
}
