//! Application coordinator that manages the complete lifecycle of sunphases.
//!
//! This module handles resource acquisition, initialization, and
//! orchestration of the daemon:
//! - Configuration loading and validation
//! - Signal handler setup
//! - Position source and publication sink construction
//! - Startup metadata announcements
//! - The sample → engine → sink loop, including one-shot mode
//!
//! The `Sunphases` struct uses a builder pattern to support different
//! startup contexts:
//! - Normal startup: `Sunphases::new(debug_enabled).run()`
//! - One evaluation at startup: `Sunphases::new(debug_enabled).once().run()`

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::config::{self, Config, PositionSourceKind};
use crate::constants::EXIT_FAILURE;
use crate::engine::{RuleEngine, SampleOutcome};
use crate::phases::PhaseCalculator;
use crate::signals::setup_signal_handler;
use crate::sink::{Delta, DeltaSink, JsonDeltaSink, PathMetadata};
use crate::solar::SunCalculator;
use crate::source::{JsonLinesSource, Position, PositionSource, StaticSource, Throttled};

/// Builder for configuring and running the sunphases daemon.
pub struct Sunphases {
    debug_enabled: bool,
    config_dir: Option<PathBuf>,
    force_once: bool,
}

impl Sunphases {
    /// Create a new runner with defaults matching a normal run.
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            config_dir: None,
            force_once: false,
        }
    }

    /// Load configuration from an explicit directory.
    pub fn with_config_dir(mut self, dir: Option<String>) -> Self {
        self.config_dir = dir.map(PathBuf::from);
        self
    }

    /// Evaluate exactly once regardless of the configured heartbeat.
    pub fn once(mut self) -> Self {
        self.force_once = true;
        self
    }

    /// Execute the daemon with the configured settings.
    pub fn run(self) -> Result<()> {
        log_version!();

        let config = match config::load(self.config_dir.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                log_error_exit!("Configuration failed");
                eprintln!("{e:?}");
                std::process::exit(EXIT_FAILURE);
            }
        };
        if self.debug_enabled {
            config.log_config();
        }

        let shutdown = setup_signal_handler()?;
        let heartbeat = if self.force_once { 0 } else { config.heartbeat() };

        // No position stream means nothing to evaluate, ever: fatal.
        let mut source = build_source(&config, heartbeat, &shutdown)
            .context("cannot obtain a position stream")?;

        let mut sink = JsonDeltaSink::stdout();
        let mut engine = RuleEngine::new(
            config.root(),
            config.zone_override(),
            config.notifications.clone(),
        );

        publish_metadata(&config, &mut sink)?;
        log_block_start!(
            "maintaining keys in '{}' (heartbeat {}s)",
            config.root(),
            heartbeat
        );
        if heartbeat == 0 {
            log_decorated!("one-shot mode: exiting after the first evaluation");
        }

        run_loop(
            &mut engine,
            &SunCalculator,
            source.as_mut(),
            &mut sink,
            &config,
            heartbeat,
            &shutdown,
            self.debug_enabled,
        )?;

        log_block_start!("Shutting down sunphases...");
        log_end!();
        Ok(())
    }
}

/// Build the configured position source. Validation already guaranteed the
/// per-kind required fields.
fn build_source(
    config: &Config,
    heartbeat: u64,
    shutdown: &Arc<AtomicBool>,
) -> Result<Box<dyn PositionSource>> {
    let interval = Duration::from_secs(heartbeat);
    let source: Box<dyn PositionSource> = match config.position.source {
        PositionSourceKind::Static => {
            let position = Position {
                latitude: config.position.latitude.unwrap_or_default(),
                longitude: config.position.longitude.unwrap_or_default(),
            };
            Box::new(StaticSource::new(position, interval, Arc::clone(shutdown)))
        }
        PositionSourceKind::Stdin => Box::new(Throttled::new(JsonLinesSource::stdin(), interval)),
        PositionSourceKind::File => {
            let path = config
                .position
                .path
                .as_deref()
                .context("file position source requires a path")?;
            Box::new(Throttled::new(JsonLinesSource::open(path)?, interval))
        }
    };
    Ok(source)
}

/// Announce per-key metadata, once, before the first sample.
fn publish_metadata(config: &Config, sink: &mut dyn DeltaSink) -> Result<()> {
    let root = config.root();
    let mut delta = Delta::new();
    for entry in config.metadata_entries() {
        delta.add_meta(
            format!("{root}{}", entry.key),
            PathMetadata {
                description: entry.description,
                units: entry.units,
            },
        );
    }
    sink.commit(&delta)
}

#[allow(clippy::too_many_arguments)]
fn run_loop(
    engine: &mut RuleEngine,
    calc: &dyn PhaseCalculator,
    source: &mut dyn PositionSource,
    sink: &mut dyn DeltaSink,
    config: &Config,
    heartbeat: u64,
    shutdown: &Arc<AtomicBool>,
    debug_enabled: bool,
) -> Result<()> {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let position = match source.next_position() {
            Ok(Some(position)) => position,
            Ok(None) => break,
            Err(e) => {
                log_pipe!();
                log_error!("position stream failed: {e:#}");
                return Err(e);
            }
        };

        let outcome = engine.on_sample(calc, position, Utc::now());
        if debug_enabled && let Some(times) = &outcome.refreshed {
            log_debug!(
                "recomputed {} sun phase keys for {:.4},{:.4}",
                times.len(),
                position.latitude,
                position.longitude
            );
        }
        publish_outcome(&outcome, config, sink)?;

        if heartbeat == 0 {
            break;
        }
    }
    Ok(())
}

/// Publish one sample's outcome: the refreshed event table (if any) as one
/// delta batch, then each rule transition as clear-then-raise.
fn publish_outcome(outcome: &SampleOutcome, config: &Config, sink: &mut dyn DeltaSink) -> Result<()> {
    if let Some(times) = &outcome.refreshed {
        let root = config.root();
        let mut delta = Delta::new();
        for (key, at) in times.iter() {
            delta.add_value(
                format!("{root}{key}"),
                Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }
        sink.commit(&delta)?;
    }

    for action in &outcome.actions {
        sink.notify(&action.clear_path, None)?;
        sink.notify(&action.raise_path, Some(&action.notification))?;
    }
    Ok(())
}
