//! TCP connection for one sync session.
//!
//! The sender dials; the receiver binds, accepts exactly one peer, and
//! drops the listener.

use crate::error::{Result, SyncError};
use std::net::SocketAddr;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

/// An established session stream
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    /// Connect to a listening receiver
    pub async fn dial(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| SyncError::connection(format!("failed to connect to {}", addr), e))?;
        Self::from_stream(stream)
    }

    fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer = stream
            .peer_addr()
            .map_err(|e| SyncError::connection("failed to read peer address", e))?;
        // Requests are tiny and latency-bound
        stream
            .set_nodelay(true)
            .map_err(|e| SyncError::connection("failed to set TCP_NODELAY", e))?;
        Ok(Self { stream, peer })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Split into read/write halves for protocol handling
    pub fn split(self) -> (OwnedReadHalf, OwnedWriteHalf) {
        self.stream.into_split()
    }
}

/// Listening endpoint that yields a single connection
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    pub async fn bind(addr: &str) -> Result<Self> {
        let inner = TcpListener::bind(addr)
            .await
            .map_err(|e| SyncError::connection(format!("failed to listen on {}", addr), e))?;
        Ok(Self { inner })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.inner
            .local_addr()
            .map_err(|e| SyncError::connection("failed to read listen address", e))
    }

    /// Accept one peer. The listener is closed afterwards.
    pub async fn accept_one(self) -> Result<Connection> {
        let (stream, _) = self
            .inner
            .accept()
            .await
            .map_err(|e| SyncError::connection("failed to accept connection", e))?;
        Connection::from_stream(stream)
    }
}
