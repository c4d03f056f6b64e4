//! Periodic status report.
//!
//! Stands in for a live plot: once per interval it reads the latest history
//! snapshot and the decoder counters and logs one summary line.  It never
//! touches the history itself, only the `Arc` the consumer last published.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use thinkgear_core::protocol::StatsSnapshot;
use thinkgear_core::{DecoderStats, EegBand, HistorySnapshot, Series};

/// Formats one summary line from a history snapshot and decoder counters.
///
/// Series with no samples yet are shown as `-`.
pub fn format_report(history: &HistorySnapshot, stats: &StatsSnapshot) -> String {
    let mut line = format!(
        "frames={} errors={} noise={} malformed={}",
        stats.frames_decoded,
        stats.frame_errors(),
        stats.noise_bytes,
        stats.malformed_records
    );

    for series in [Series::Attention, Series::Meditation] {
        let _ = write!(line, " {}=", series.name());
        push_value(&mut line, history.latest(series), 0);
    }
    for band in EegBand::ALL {
        let _ = write!(line, " {}=", band.name());
        push_value(&mut line, history.latest(Series::Band(band)), 3);
    }
    line
}

fn push_value(line: &mut String, value: Option<f64>, precision: usize) {
    match value {
        Some(v) => {
            let _ = write!(line, "{v:.precision$}");
        }
        None => line.push('-'),
    }
}

/// Logs a report every `interval` until the snapshot sender is dropped.
///
/// A final report is logged on the way out so the last state is never lost.
pub async fn run_reporter(
    mut snapshots: watch::Receiver<Arc<HistorySnapshot>>,
    stats: Arc<DecoderStats>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; skip it so the first report
    // covers a full interval.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let closed = snapshots.has_changed().is_err();
        let history = snapshots.borrow_and_update().clone();
        info!("{}", format_report(&history, &stats.snapshot()));
        if closed {
            break;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
