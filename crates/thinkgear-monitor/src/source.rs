//! Byte sources: the only place the monitor blocks waiting for data.
//!
//! A serial device node (`/dev/ttyUSB0`, `/dev/rfcomm0`) is opened like a
//! file; the port's baud rate must already be configured (57600 for most
//! headsets).  A TCP source reads raw bytes from a serial-to-network bridge.
//! Both are handed back as the same boxed [`AsyncRead`], so the decode pump
//! never knows which one it is reading.

use std::path::PathBuf;
use std::pin::Pin;

use thiserror::Error;
use tokio::io::AsyncRead;
use tracing::info;

use crate::config::{SourceConfig, SourceKind};

/// A byte source of any kind.
pub type ByteSource = Pin<Box<dyn AsyncRead + Send>>;

/// Errors that can occur while opening a byte source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file or device node could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TCP connection could not be established.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Opens the byte source described by `cfg`.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened or the TCP connection
/// fails.
pub async fn open_source(cfg: &SourceConfig) -> Result<ByteSource, SourceError> {
    match cfg.kind {
        SourceKind::File => {
            let file = tokio::fs::File::open(&cfg.path)
                .await
                .map_err(|source| SourceError::Open {
                    path: cfg.path.clone(),
                    source,
                })?;
            info!("reading byte stream from {}", cfg.path.display());
            Ok(Box::pin(file))
        }
        SourceKind::Tcp => {
            let stream = tokio::net::TcpStream::connect(&cfg.address)
                .await
                .map_err(|source| SourceError::Connect {
                    address: cfg.address.clone(),
                    source,
                })?;
            info!("reading byte stream from tcp://{}", cfg.address);
            Ok(Box::pin(stream))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
