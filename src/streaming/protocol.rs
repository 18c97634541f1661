//! Wire messages for a sync session.
//!
//! Frame format: len:u32 | type:u8 | payload
//! All multi-byte integers are big-endian.
//! Strings are length-prefixed (u16 len + UTF-8).
//!
//! File content is NOT framed: after a REQUEST the sender writes exactly
//! `size` raw bytes, and both sides rely on the descriptor for the count.

use crate::error::{Result, SyncError};
use crate::manifest::{is_valid_name, FileDescriptor, Manifest};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum frame size (64MB) - prevents OOM from malicious/corrupted frames
pub const MAX_FRAME_SIZE: u32 = 64 * 1024 * 1024;

/// Frame header: u32 length + u8 type
const HEADER_LEN: usize = 5;

// =============================================================================
// Message Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Manifest = 0x01,
    Request = 0x02,
    End = 0x03,
}

impl MessageType {
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(Self::Manifest),
            0x02 => Some(Self::Request),
            0x03 => Some(Self::End),
            _ => None,
        }
    }
}

// =============================================================================
// Descriptor encoding
// =============================================================================

fn put_str(buf: &mut BytesMut, field: &str, s: &str) -> Result<()> {
    let len = u16::try_from(s.len())
        .map_err(|_| SyncError::Encode(format!("{} is {} bytes long", field, s.len())))?;
    buf.put_u16(len);
    buf.put_slice(s.as_bytes());
    Ok(())
}

fn get_str(payload: &mut Bytes, field: &str) -> Result<String> {
    if payload.remaining() < 2 {
        return Err(SyncError::decode(format!("{} length truncated", field)));
    }
    let len = payload.get_u16() as usize;
    if payload.remaining() < len {
        return Err(SyncError::decode(format!(
            "{} truncated: expected {} bytes, got {}",
            field,
            len,
            payload.remaining()
        )));
    }
    String::from_utf8(payload.copy_to_bytes(len).to_vec())
        .map_err(|_| SyncError::decode(format!("invalid UTF-8 in {}", field)))
}

/// Append one descriptor: name, size, hash.
pub fn put_descriptor(buf: &mut BytesMut, fd: &FileDescriptor) -> Result<()> {
    put_str(buf, "file name", &fd.name)?;
    buf.put_u64(fd.size);
    put_str(buf, "file hash", &fd.hash)
}

/// Read one descriptor. Accepts the empty descriptor; callers validate names.
pub fn get_descriptor(payload: &mut Bytes) -> Result<FileDescriptor> {
    let name = get_str(payload, "file name")?;
    if payload.remaining() < 8 {
        return Err(SyncError::decode("file size truncated"));
    }
    let size = payload.get_u64();
    let hash = get_str(payload, "file hash")?;
    Ok(FileDescriptor { name, size, hash })
}

fn check_name(fd: &FileDescriptor) -> Result<()> {
    if is_valid_name(&fd.name) {
        Ok(())
    } else {
        Err(SyncError::decode(format!("invalid file name {:?}", fd.name)))
    }
}

fn check_consumed(payload: &Bytes, what: &str) -> Result<()> {
    if payload.has_remaining() {
        return Err(SyncError::decode(format!(
            "{} has {} trailing bytes",
            what,
            payload.remaining()
        )));
    }
    Ok(())
}

fn frame(msg_type: MessageType, payload: BytesMut) -> Result<Bytes> {
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_SIZE)
        .ok_or_else(|| {
            SyncError::Encode(format!(
                "{:?} frame of {} bytes exceeds maximum {}",
                msg_type,
                payload.len(),
                MAX_FRAME_SIZE
            ))
        })?;

    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_u32(len);
    buf.put_u8(msg_type as u8);
    buf.put_slice(&payload);
    Ok(buf.freeze())
}

// =============================================================================
// MANIFEST (0x01)
// =============================================================================

pub fn encode_manifest(manifest: &[FileDescriptor]) -> Result<Bytes> {
    let count = u32::try_from(manifest.len())
        .map_err(|_| SyncError::Encode(format!("{} manifest entries", manifest.len())))?;

    let mut payload = BytesMut::new();
    payload.put_u32(count);
    for fd in manifest {
        put_descriptor(&mut payload, fd)?;
    }
    frame(MessageType::Manifest, payload)
}

pub fn decode_manifest(mut payload: Bytes) -> Result<Manifest> {
    if payload.remaining() < 4 {
        return Err(SyncError::decode("manifest payload too short"));
    }
    let count = payload.get_u32() as usize;

    // Smallest descriptor is 12 bytes; don't trust count for allocation
    let mut manifest = Vec::with_capacity(count.min(payload.remaining() / 12));
    for i in 0..count {
        let fd = get_descriptor(&mut payload)
            .map_err(|e| SyncError::decode(format!("manifest entry {}: {}", i, e)))?;
        check_name(&fd)?;
        manifest.push(fd);
    }
    check_consumed(&payload, "manifest")?;
    Ok(manifest)
}

// =============================================================================
// REQUEST (0x02) / END (0x03)
// =============================================================================

/// What the receiver asks of the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Stream this file's content
    File(FileDescriptor),
    /// No more requests; the session is over
    End,
}

impl Request {
    pub fn encode(&self) -> Result<Bytes> {
        match self {
            Request::File(fd) => {
                let mut payload = BytesMut::new();
                put_descriptor(&mut payload, fd)?;
                frame(MessageType::Request, payload)
            }
            Request::End => frame(MessageType::End, BytesMut::new()),
        }
    }

    pub fn decode(msg_type: MessageType, mut payload: Bytes) -> Result<Self> {
        match msg_type {
            MessageType::Request => {
                let fd = get_descriptor(&mut payload)?;
                check_consumed(&payload, "request")?;
                check_name(&fd)?;
                Ok(Request::File(fd))
            }
            MessageType::End => {
                check_consumed(&payload, "end")?;
                Ok(Request::End)
            }
            MessageType::Manifest => Err(SyncError::decode("expected a request, got a manifest")),
        }
    }
}

// =============================================================================
// Frame reading/writing
// =============================================================================

fn read_failed(e: io::Error) -> SyncError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        SyncError::decode("stream ended inside a frame")
    } else {
        SyncError::Stream(e)
    }
}

/// Read a single frame from the stream.
///
/// Returns `None` when the stream ends cleanly at a frame boundary.
pub async fn read_frame<R: AsyncRead + Unpin>(
    r: &mut R,
) -> Result<Option<(MessageType, Bytes)>> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = r.read(&mut header[filled..]).await.map_err(SyncError::Stream)?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(SyncError::decode("stream ended inside a frame header"));
        }
        filled += n;
    }
    let len = u32::from_be_bytes(header);

    // Validate frame size before allocation
    if len > MAX_FRAME_SIZE {
        return Err(SyncError::decode(format!(
            "frame size {} exceeds maximum allowed size {}",
            len, MAX_FRAME_SIZE
        )));
    }

    let type_byte = r.read_u8().await.map_err(read_failed)?;
    let msg_type = MessageType::from_u8(type_byte)
        .ok_or_else(|| SyncError::decode(format!("unknown message type 0x{:02x}", type_byte)))?;

    let mut payload = vec![0u8; len as usize];
    r.read_exact(&mut payload).await.map_err(read_failed)?;

    Ok(Some((msg_type, Bytes::from(payload))))
}

/// Write a pre-encoded frame and flush it.
pub async fn write_frame<W: AsyncWrite + Unpin>(w: &mut W, frame: &Bytes) -> Result<()> {
    w.write_all(frame).await.map_err(SyncError::Stream)?;
    w.flush().await.map_err(SyncError::Stream)
}

pub async fn write_manifest<W: AsyncWrite + Unpin>(
    w: &mut W,
    manifest: &[FileDescriptor],
) -> Result<()> {
    write_frame(w, &encode_manifest(manifest)?).await
}

/// Read the peer's manifest. A closed stream here is an error.
pub async fn read_manifest<R: AsyncRead + Unpin>(r: &mut R) -> Result<Manifest> {
    match read_frame(r).await? {
        Some((MessageType::Manifest, payload)) => decode_manifest(payload),
        Some((other, _)) => Err(SyncError::decode(format!(
            "expected a manifest, got {:?}",
            other
        ))),
        None => Err(SyncError::Disconnected),
    }
}

pub async fn write_request<W: AsyncWrite + Unpin>(w: &mut W, request: &Request) -> Result<()> {
    write_frame(w, &request.encode()?).await
}

/// Read the next request, or `None` if the stream closed cleanly.
pub async fn read_request<R: AsyncRead + Unpin>(r: &mut R) -> Result<Option<Request>> {
    match read_frame(r).await? {
        Some((msg_type, payload)) => Request::decode(msg_type, payload).map(Some),
        None => Ok(None),
    }
}

// =============================================================================
// Tests
// =============================================================================
