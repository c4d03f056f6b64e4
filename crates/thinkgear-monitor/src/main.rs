//! ThinkGear monitor: entry point.
//!
//! Decodes the byte stream of a ThinkGear EEG headset and logs a periodic
//! summary of attention, meditation, and band power.  With `--json`, every
//! decoded reading is also printed to stdout as one JSON line.
//!
//! # Usage
//!
//! ```text
//! thinkgear-monitor [OPTIONS]
//!
//! Options:
//!   --config      <PATH>  Config file [default: platform config dir]
//!   --file        <PATH>  Read from a capture file or serial device node
//!   --tcp         <ADDR>  Read from a TCP byte stream (host:port)
//!   --json                Print every reading as a JSON line
//!   --interval-ms <MS>    Report interval in milliseconds
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                 | Description                     |
//! |--------------------------|---------------------------------|
//! | `THINKGEAR_CONFIG`       | Config file path                |
//! | `THINKGEAR_FILE`         | Capture file or device node     |
//! | `THINKGEAR_TCP`          | TCP source address              |
//! | `THINKGEAR_JSON`         | Print readings as JSON lines    |
//! | `THINKGEAR_INTERVAL_MS`  | Report interval in milliseconds |
//!
//! CLI args win over environment variables, which win over the config file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use thinkgear_core::{DecoderStats, HistorySnapshot, ReadingHistory};
use thinkgear_monitor::config::{default_config_path, load_config, MonitorConfig, SourceKind};
use thinkgear_monitor::pump::{run_consumer, run_decoder};
use thinkgear_monitor::report::{format_report, run_reporter};
use thinkgear_monitor::source::open_source;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// ThinkGear EEG stream monitor.
#[derive(Debug, Parser)]
#[command(
    name = "thinkgear-monitor",
    about = "Decodes a ThinkGear EEG headset byte stream and reports readings",
    version
)]
struct Cli {
    /// Config file to load instead of the platform default.
    #[arg(long, env = "THINKGEAR_CONFIG")]
    config: Option<PathBuf>,

    /// Read from this capture file or serial device node.
    #[arg(long, env = "THINKGEAR_FILE", conflicts_with = "tcp")]
    file: Option<PathBuf>,

    /// Read from this TCP address (`host:port`).
    #[arg(long, env = "THINKGEAR_TCP")]
    tcp: Option<String>,

    /// Print every decoded reading to stdout as one JSON line.
    #[arg(long, env = "THINKGEAR_JSON")]
    json: bool,

    /// Report interval in milliseconds.
    #[arg(long, env = "THINKGEAR_INTERVAL_MS")]
    interval_ms: Option<u64>,
}

impl Cli {
    /// Loads the config file and applies the command-line overrides on top.
    fn into_config(mut self) -> anyhow::Result<MonitorConfig> {
        let path = match self.config.take() {
            Some(path) => path,
            None => default_config_path().context("no --config given")?,
        };
        let mut config = load_config(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(self, config: &mut MonitorConfig) {
        if let Some(path) = self.file {
            config.source.kind = SourceKind::File;
            config.source.path = path;
        }
        if let Some(address) = self.tcp {
            config.source.kind = SourceKind::Tcp;
            config.source.address = address;
        }
        if self.json {
            config.report.json = true;
        }
        if let Some(ms) = self.interval_ms {
            config.report.interval_ms = ms;
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.into_config()?;

    // `RUST_LOG` wins; otherwise use the level from the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.monitor.log_level)),
        )
        // stdout may carry JSON lines, so logs go to stderr.
        .with_writer(std::io::stderr)
        .init();

    info!(
        "ThinkGear monitor starting: source={:?}, history={}, interval={}ms",
        config.source.kind, config.history.capacity, config.report.interval_ms
    );

    let source = open_source(&config.source)
        .await
        .context("failed to open byte source")?;

    // ── Wire up the tasks ─────────────────────────────────────────────────────
    let stats = Arc::new(DecoderStats::new());
    let (tx, rx) = mpsc::channel(config.monitor.channel_capacity.max(1));
    let (snap_tx, snap_rx) = watch::channel(Arc::new(HistorySnapshot::default()));

    let json_out = config.report.json.then(tokio::io::stdout);
    let consumer = tokio::spawn(run_consumer(
        rx,
        ReadingHistory::new(config.history.capacity),
        snap_tx,
        json_out,
    ));
    let reporter = tokio::spawn(run_reporter(
        snap_rx,
        Arc::clone(&stats),
        config.report.interval(),
    ));
    let mut decoder = tokio::spawn(run_decoder(
        source,
        config.source.read_chunk,
        Arc::clone(&stats),
        tx,
    ));

    // ── Run until end of input or Ctrl+C ──────────────────────────────────────
    tokio::select! {
        result = &mut decoder => match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("decoder stopped: {e}"),
            Err(e) => error!("decoder task failed: {e}"),
        },
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("received Ctrl+C, shutting down"),
                Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
            }
            // Dropping the decoder's sender ends the consumer, which in turn
            // ends the reporter.
            decoder.abort();
        }
    }

    let history = consumer.await.context("consumer task failed")?;
    reporter.await.context("reporter task failed")?;

    info!(
        "ThinkGear monitor stopped: {}",
        format_report(&history.snapshot(), &stats.snapshot())
    );
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_without_flags_changes_nothing() {
        // Arrange
        let cli = Cli::parse_from(["thinkgear-monitor"]);
        let mut config = MonitorConfig::default();

        // Act
        cli.apply(&mut config);

        // Assert
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn test_tcp_flag_switches_source_kind() {
        let cli = Cli::parse_from(["thinkgear-monitor", "--tcp", "10.0.0.5:2000"]);
        let mut config = MonitorConfig::default();

        cli.apply(&mut config);

        assert_eq!(config.source.kind, SourceKind::Tcp);
        assert_eq!(config.source.address, "10.0.0.5:2000");
    }

    #[test]
    fn test_file_json_and_interval_flags_override_config() {
        // Arrange
        let cli = Cli::parse_from([
            "thinkgear-monitor",
            "--file",
            "/tmp/capture.bin",
            "--json",
            "--interval-ms",
            "250",
        ]);
        let mut config = MonitorConfig::default();
        config.source.kind = SourceKind::Tcp;

        // Act
        cli.apply(&mut config);

        // Assert
        assert_eq!(config.source.kind, SourceKind::File);
        assert_eq!(config.source.path, PathBuf::from("/tmp/capture.bin"));
        assert!(config.report.json);
        assert_eq!(config.report.interval_ms, 250);
    }

    #[test]
    fn test_into_config_layers_flags_over_config_file() {
        // Arrange
        let path = std::env::temp_dir().join(format!("thinkgear_cli_{}.toml", std::process::id()));
        std::fs::write(&path, "[report]\ninterval_ms = 5000\n\n[history]\ncapacity = 20\n").unwrap();
        let cli = Cli::parse_from([
            "thinkgear-monitor",
            "--config",
            path.to_str().unwrap(),
            "--interval-ms",
            "250",
        ]);

        // Act
        let config = cli.into_config().expect("config");

        // Assert
        assert_eq!(config.report.interval_ms, 250);
        assert_eq!(config.history.capacity, 20);

        // Cleanup
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_and_tcp_together_are_rejected() {
        let result = Cli::try_parse_from([
            "thinkgear-monitor",
            "--file",
            "/tmp/a.bin",
            "--tcp",
            "127.0.0.1:2000",
        ]);
        assert!(result.is_err());
    }
}
