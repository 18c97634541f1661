//! paramsync - copy the files a peer is missing, by name and SHA-256.
//!
//! A sender offers its directory's manifest over a single TCP stream; the
//! receiver requests each file it has no copy of and the sender streams
//! the raw bytes back, one file at a time.

pub mod cli;
pub mod diff;
pub mod error;
pub mod manifest;
pub mod session;
pub mod streaming;
pub mod transport;

pub use diff::{diff, Decision};
pub use error::{Result, SyncError};
pub use manifest::{build_manifest, FileDescriptor, Manifest};
pub use session::{sync_recv, sync_send, SyncOptions, DEFAULT_LISTEN_ADDR};
pub use streaming::{Receiver, ReceiverConfig, Request, Sender, SenderConfig, SyncStats};
