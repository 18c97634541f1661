//! Sync session protocol.
//!
//! One stream, strictly sequential:
//!
//! ```text
//! Sender                         Receiver
//!   | ---------- MANIFEST ---------> |   diff against local manifest
//!   | <--------- REQUEST ----------- |   first missing file
//!   | ======= raw file bytes ======> |   exactly `size` bytes
//!   | <--------- REQUEST ----------- |
//!   | ======= raw file bytes ======> |
//!   | <----------- END ------------- |
//! ```
//!
//! File content is never framed, so a request is only written once the
//! previous file has been fully received.

pub mod protocol;
pub mod receiver;
pub mod sender;
pub mod stats;
pub mod transfer;

pub use protocol::{
    decode_manifest, encode_manifest, read_frame, read_manifest, read_request, write_frame,
    write_manifest, write_request, MessageType, Request, MAX_FRAME_SIZE,
};
pub use receiver::{Receiver, ReceiverConfig};
pub use sender::{Sender, SenderConfig};
pub use stats::SyncStats;
pub use transfer::{copy_exact, progress_bar, TRANSFER_CHUNK_SIZE};
