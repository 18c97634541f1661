//! Raw content transfer: move exactly `size` bytes between stream and file.

use crate::error::{Result, SyncError};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Copy buffer size
pub const TRANSFER_CHUNK_SIZE: usize = 256 * 1024; // 256KB

/// Progress bar for one file, hidden unless `show` and stderr is a terminal.
pub fn progress_bar(name: &str, size: u64, show: bool) -> ProgressBar {
    if !show || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(size);
    let style = ProgressStyle::with_template(
        "{msg:24!} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message(name.to_string());
    bar
}

/// Copy exactly `size` bytes from `reader` to `writer`, then flush.
///
/// Never reads past `size`, so the reader is left positioned at the next
/// frame. Running out of input early, or any read/write failure, is a
/// short transfer.
pub async fn copy_exact<R, W>(
    reader: &mut R,
    writer: &mut W,
    name: &str,
    size: u64,
    progress: &ProgressBar,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let short = |moved: u64, source: Option<std::io::Error>| SyncError::ShortTransfer {
        name: name.to_string(),
        expected: size,
        actual: moved,
        source,
    };

    let mut buf = vec![0u8; (size as usize).clamp(1, TRANSFER_CHUNK_SIZE)];
    let mut moved = 0u64;

    while moved < size {
        let want = (size - moved).min(buf.len() as u64) as usize;
        let n = reader
            .read(&mut buf[..want])
            .await
            .map_err(|e| short(moved, Some(e)))?;
        if n == 0 {
            break;
        }
        writer
            .write_all(&buf[..n])
            .await
            .map_err(|e| short(moved, Some(e)))?;
        moved += n as u64;
        progress.inc(n as u64);
    }

    writer.flush().await.map_err(|e| short(moved, Some(e)))?;

    if moved != size {
        return Err(short(moved, None));
    }
    Ok(moved)
}
