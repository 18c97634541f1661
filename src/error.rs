use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::manifest::FileDescriptor;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{context}: {source}")]
    Connection {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("peer closed the connection before the session ended")]
    Disconnected,

    #[error("stream error: {0}")]
    Stream(#[source] io::Error),

    #[error("malformed message: {0}")]
    Decode(String),

    #[error("cannot encode message: {0}")]
    Encode(String),

    #[error("requested file was not in our set of files: {} ({} bytes, {})", .0.name, .0.size, .0.hash)]
    UnknownRequest(FileDescriptor),

    #[error("short transfer of {name}: expected {expected} bytes, moved {actual}")]
    ShortTransfer {
        name: String,
        expected: u64,
        actual: u64,
        #[source]
        source: Option<io::Error>,
    },

    #[error("{}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    pub fn connection(context: impl Into<String>, source: io::Error) -> Self {
        Self::Connection {
            context: context.into(),
            source,
        }
    }

    pub fn local_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
