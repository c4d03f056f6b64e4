//! thinkgear-monitor library crate.
//!
//! Runs the `thinkgear-core` decoder over a live byte source and reports what
//! it sees.
//!
//! # Architecture
//!
//! ```text
//! serial device / capture file / TCP bridge
//!         │
//!   source   open the byte source as one AsyncRead
//!         │
//!   pump     decoder task ─mpsc─▶ consumer task (history, JSON lines)
//!         │                               │ watch
//!   report   periodic summary line ◀──────┘
//! ```
//!
//! `config` loads the TOML settings that drive all three.

/// TOML configuration file.
pub mod config;

/// Decoder and consumer tasks.
pub mod pump;

/// Periodic summary reporting.
pub mod report;

/// Byte source selection.
pub mod source;
