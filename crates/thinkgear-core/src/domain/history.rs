//! Bounded per-series history of readings, published as immutable snapshots.
//!
//! # Hand-off between decoder and display (for beginners)
//!
//! The decoder produces readings continuously while a display or reporter
//! wants to look at "the last N values" on its own schedule.  Sharing one
//! growable buffer between the two would let the reader see a half-updated
//! series.  Instead, one owner folds readings into a [`ReadingHistory`] and,
//! after each frame, calls [`ReadingHistory::snapshot`] to produce an
//! `Arc<HistorySnapshot>`.  A snapshot never changes after it is created, so
//! any number of readers can hold it while the owner keeps going.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::Serialize;

use crate::domain::reading::{EegBand, Reading, BAND_MAX};

/// Default number of samples kept per series.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// A series tracked by [`ReadingHistory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    Attention,
    Meditation,
    Band(EegBand),
}

impl Series {
    /// Every tracked series, in display order.
    pub fn all() -> impl Iterator<Item = Series> {
        [Series::Attention, Series::Meditation]
            .into_iter()
            .chain(EegBand::ALL.into_iter().map(Series::Band))
    }

    pub fn name(self) -> &'static str {
        match self {
            Series::Attention => "attention",
            Series::Meditation => "meditation",
            Series::Band(band) => band.name(),
        }
    }
}

/// Scales a band magnitude so that half of the 24-bit range maps to 1.0.
pub fn normalize_band(value: u32) -> f64 {
    f64::from(value) / (f64::from(BAND_MAX) * 0.5)
}

/// Mutable history owned by a single consumer.
#[derive(Debug)]
pub struct ReadingHistory {
    capacity: usize,
    series: HashMap<Series, VecDeque<f64>>,
    frames: u64,
}

impl ReadingHistory {
    /// Creates an empty history keeping at most `capacity` samples per series.
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            series: HashMap::new(),
            frames: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Folds one frame's readings into the history.  Readings that have no
    /// series (raw samples, heart rate, unknown codes) are ignored.
    pub fn push_frame(&mut self, readings: &[Reading]) {
        for reading in readings {
            match reading {
                Reading::Attention(v) => self.push(Series::Attention, f64::from(*v)),
                Reading::Meditation(v) => self.push(Series::Meditation, f64::from(*v)),
                Reading::AsicEegPower(power) => {
                    for (band, value) in power.bands() {
                        self.push(Series::Band(band), normalize_band(value));
                    }
                }
                _ => {}
            }
        }
        self.frames += 1;
    }

    /// Returns the samples for `series`, oldest first.
    pub fn values(&self, series: Series) -> Vec<f64> {
        self.series
            .get(&series)
            .map(|q| q.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Produces an immutable copy of the current history.
    pub fn snapshot(&self) -> Arc<HistorySnapshot> {
        let series = Series::all()
            .map(|s| (s, self.values(s)))
            .collect::<Vec<_>>();
        Arc::new(HistorySnapshot {
            frames: self.frames,
            series,
        })
    }

    fn push(&mut self, series: Series, value: f64) {
        let capacity = self.capacity;
        let queue = self
            .series
            .entry(series)
            .or_insert_with(|| VecDeque::with_capacity(capacity));
        if queue.len() == capacity {
            queue.pop_front();
        }
        queue.push_back(value);
    }
}

impl Default for ReadingHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Read-only view of a [`ReadingHistory`] at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySnapshot {
    /// Number of frames folded in when the snapshot was taken.
    pub frames: u64,
    /// Every series in display order, samples oldest first.
    pub series: Vec<(Series, Vec<f64>)>,
}

impl HistorySnapshot {
    /// Samples for `series`, or an empty slice if nothing was recorded.
    pub fn get(&self, series: Series) -> &[f64] {
        self.series
            .iter()
            .find(|(s, _)| *s == series)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// Most recent sample for `series`.
    pub fn latest(&self, series: Series) -> Option<f64> {
        self.get(series).last().copied()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
