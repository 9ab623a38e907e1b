//! Position sampling sources.
//!
//! The run loop pulls `{latitude, longitude}` samples from a
//! [`PositionSource`]. Pacing belongs to the subscription, not the engine:
//! a static source paces itself with a heartbeat sleep, streaming sources
//! are wrapped in [`Throttled`] for debounce-immediate sampling. A source
//! that returns `Ok(None)` has ended and will never yield again.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Deserialize;

/// An observer position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Coarse equivalence used by the refresh trigger: both components
    /// within one degree. A bucketing, not a geodesic distance.
    pub fn within_degree(&self, other: &Position) -> bool {
        (self.latitude - other.latitude).abs() <= 1.0
            && (self.longitude - other.longitude).abs() <= 1.0
    }
}

/// A blocking stream of position samples.
pub trait PositionSource {
    /// The next sample, or `None` when the stream has ended.
    fn next_position(&mut self) -> Result<Option<Position>>;
}

/// Fixed position from configuration.
///
/// Yields the first sample immediately, then one sample per heartbeat. The
/// sleep is sliced so a shutdown request ends the stream promptly instead of
/// waiting out a full interval. A zero interval yields exactly one sample.
pub struct StaticSource {
    position: Position,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    started: bool,
}

impl StaticSource {
    pub fn new(position: Position, interval: Duration, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            position,
            interval,
            shutdown,
            started: false,
        }
    }
}

impl PositionSource for StaticSource {
    fn next_position(&mut self) -> Result<Option<Position>> {
        if !self.started {
            self.started = true;
            return Ok(Some(self.position));
        }
        if self.interval.is_zero() {
            return Ok(None);
        }

        let deadline = Instant::now() + self.interval;
        while Instant::now() < deadline {
            if self.shutdown.load(Ordering::SeqCst) {
                return Ok(None);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            std::thread::sleep(remaining.min(Duration::from_millis(250)));
        }

        if self.shutdown.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(self.position))
    }
}

/// Newline-delimited JSON positions from any reader (stdin, file, FIFO).
///
/// Malformed lines are skipped with a warning rather than ending the
/// stream; EOF ends it.
pub struct JsonLinesSource<R: BufRead> {
    reader: R,
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("cannot open position source '{}'", path.display()))?;
        Ok(Self {
            reader: BufReader::new(file),
        })
    }
}

impl JsonLinesSource<BufReader<io::Stdin>> {
    pub fn stdin() -> Self {
        Self {
            reader: BufReader::new(io::stdin()),
        }
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> PositionSource for JsonLinesSource<R> {
    fn next_position(&mut self) -> Result<Option<Position>> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .context("position stream read failed")?;
            if read == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Position>(trimmed) {
                Ok(position) => return Ok(Some(position)),
                Err(e) => log_warning!("discarding malformed position sample: {e}"),
            }
        }
    }
}

/// Debounce-immediate pacing state: the first sample passes through, later
/// samples are dropped until the interval has elapsed since the last
/// accepted one.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_accepted: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: None,
        }
    }

    pub fn accept(&mut self, now: Instant) -> bool {
        match self.last_accepted {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }
}

/// A streaming source throttled to the configured heartbeat.
pub struct Throttled<S: PositionSource> {
    inner: S,
    throttle: Throttle,
}

impl<S: PositionSource> Throttled<S> {
    pub fn new(inner: S, interval: Duration) -> Self {
        Self {
            inner,
            throttle: Throttle::new(interval),
        }
    }
}

impl<S: PositionSource> PositionSource for Throttled<S> {
    fn next_position(&mut self) -> Result<Option<Position>> {
        loop {
            match self.inner.next_position()? {
                None => return Ok(None),
                Some(position) => {
                    if self.throttle.accept(Instant::now()) {
                        return Ok(Some(position));
                    }
                }
            }
        }
    }
}
