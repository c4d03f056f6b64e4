//! Decode pump and consumer.
//!
//! # Task layout
//!
//! ```text
//! ByteSource ─▶ run_decoder ──mpsc (bounded)──▶ run_consumer ──watch──▶ reporter
//!               FrameDecoder                    ReadingHistory          (latest
//!               + interpreter                   + JSON lines             snapshot)
//! ```
//!
//! The decoder task is the only owner of the frame state and the consumer task
//! is the only owner of the history.  They share nothing mutable: readings
//! cross over a bounded channel and the history leaves as immutable
//! `Arc<HistorySnapshot>`s.  Stopping is just dropping the decoder task; the
//! channel closes and everything downstream finishes on its own.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use thinkgear_core::{
    interpret_records, Code, DecodeError, DecoderStats, FrameDecoder, FrameEvent, HistorySnapshot,
    Reading, ReadingHistory, Record,
};

/// What the decoder task hands to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// Readings from one good frame, in payload order.
    Frame(Vec<Reading>),
    /// The byte source reached end of input.
    SourceClosed,
}

/// Reads `source` until end of input, decoding frames and sending one
/// [`MonitorEvent::Frame`] per good frame.
///
/// Returns early without error if the consumer hangs up.
///
/// # Errors
///
/// Returns the I/O error that ended the read loop.
pub async fn run_decoder<R>(
    mut source: R,
    read_chunk: usize,
    stats: Arc<DecoderStats>,
    tx: mpsc::Sender<MonitorEvent>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = FrameDecoder::new();
    let mut buf = vec![0u8; read_chunk.max(1)];

    loop {
        let n = match source.read(&mut buf).await {
            Ok(0) => {
                info!("byte source closed");
                let _ = tx.send(MonitorEvent::SourceClosed).await;
                return Ok(());
            }
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("byte source read failed: {e}");
                return Err(e);
            }
        };

        for &byte in &buf[..n] {
            for event in decoder.feed(byte) {
                stats.observe(&event);
                match event {
                    FrameEvent::RecordsDecoded(records) => {
                        let readings = interpret_frame(&records, &stats);
                        if tx.send(MonitorEvent::Frame(readings)).await.is_err() {
                            debug!("consumer gone; stopping decoder");
                            return Ok(());
                        }
                    }
                    FrameEvent::FrameError(e) => debug!("frame rejected: {e}"),
                    FrameEvent::Noise(_) => {}
                }
            }
        }
    }
}

fn interpret_frame(records: &[Record], stats: &DecoderStats) -> Vec<Reading> {
    for record in records {
        if let Code::Unknown(value) = record.code {
            debug!(
                "{} ({} data byte(s)) passed through",
                DecodeError::UnrecognizedCode(value),
                record.data.len()
            );
        }
    }
    let (readings, dropped) = interpret_records(records);
    for _ in 0..dropped {
        stats.record_malformed();
    }
    readings
}

/// Folds readings into `history` and publishes a fresh snapshot after every
/// frame.  When `json_out` is set, each reading is also written to it as one
/// JSON line, flushed once per frame.
///
/// Runs until the source closes or the decoder drops its sender, then returns
/// the history.
pub async fn run_consumer<W>(
    mut rx: mpsc::Receiver<MonitorEvent>,
    mut history: ReadingHistory,
    snapshots: watch::Sender<Arc<HistorySnapshot>>,
    mut json_out: Option<W>,
) -> ReadingHistory
where
    W: AsyncWrite + Unpin + Send,
{
    while let Some(event) = rx.recv().await {
        match event {
            MonitorEvent::Frame(readings) => {
                if let Some(out) = json_out.as_mut() {
                    write_json_lines(out, &readings).await;
                }
                history.push_frame(&readings);
                // send_replace never fails, even with no receivers left.
                snapshots.send_replace(history.snapshot());
            }
            MonitorEvent::SourceClosed => break,
        }
    }
    history
}

async fn write_json_lines<W>(out: &mut W, readings: &[Reading])
where
    W: AsyncWrite + Unpin,
{
    let mut lines = String::new();
    for reading in readings {
        match serde_json::to_string(reading) {
            Ok(line) => {
                lines.push_str(&line);
                lines.push('\n');
            }
            Err(e) => error!("failed to serialize reading: {e}"),
        }
    }
    if lines.is_empty() {
        return;
    }
    let written = async {
        out.write_all(lines.as_bytes()).await?;
        out.flush().await
    };
    if let Err(e) = written.await {
        error!("failed to write readings: {e}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
