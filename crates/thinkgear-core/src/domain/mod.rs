//! Domain layer: typed readings and the bounded history consumers read from.
//!
//! Nothing here touches bytes on the wire.  The protocol layer hands over
//! complete [`crate::protocol::Record`]s; this layer turns them into
//! [`Reading`]s and keeps the recent ones for display.

pub mod history;
pub mod reading;

pub use history::{
    normalize_band, HistorySnapshot, ReadingHistory, Series, DEFAULT_HISTORY_CAPACITY,
};
pub use reading::{interpret, interpret_records, AsicEegPower, EegBand, Reading, BAND_MAX};
