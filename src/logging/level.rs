//! Severity thresholds and verbosity selection
//!
//! Maps the daemon's verbosity/silence flags onto a severity threshold and keeps
//! that threshold in a shared atomic, so every logger built from the same context
//! observes a level change without being rebuilt.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::subscriber::Interest;
use tracing::{Level, Metadata};
use tracing_subscriber::layer::{Context, Filter};

/// Target carried by notice records (see [`notice!`](crate::notice))
pub const NOTICE_TARGET: &str = "notice";

/// Minimum severity a record needs to be emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    Debug,
    Info,
    #[default]
    Notice,
    /// Nothing is emitted, whatever the record's level
    Suppressed,
}

impl Severity {
    /// Get the external name of this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Notice => "notice",
            Severity::Suppressed => "suppressed",
        }
    }

    /// Check whether a record described by `meta` passes this threshold
    pub fn admits(&self, meta: &Metadata<'_>) -> bool {
        *self != Severity::Suppressed && record_rank(meta) >= self.rank()
    }

    fn rank(self) -> u8 {
        match self {
            Severity::Debug => 1,
            Severity::Info => 2,
            Severity::Notice => 3,
            Severity::Suppressed => u8::MAX,
        }
    }

    fn from_index(index: u8) -> Self {
        match index {
            0 => Severity::Debug,
            1 => Severity::Info,
            2 => Severity::Notice,
            _ => Severity::Suppressed,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An externally supplied level name that does not name a level
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown log level {input:?} (expected debug, info or notice)")]
pub struct LevelParseError {
    pub input: String,
}

impl FromStr for Severity {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "notice" => Ok(Severity::Notice),
            _ => Err(LevelParseError {
                input: s.to_string(),
            }),
        }
    }
}

// trace < debug < info < notice < warn < error
fn record_rank(meta: &Metadata<'_>) -> u8 {
    let level = *meta.level();
    if level == Level::ERROR {
        5
    } else if level == Level::WARN {
        4
    } else if level == Level::INFO {
        if meta.target() == NOTICE_TARGET {
            3
        } else {
            2
        }
    } else if level == Level::DEBUG {
        1
    } else {
        0
    }
}

/// Verbosity flags as supplied by the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerbosityState {
    /// Suppress all output; wins over `verbose`
    pub silent: bool,
    /// Number of `-v` flags
    pub verbose: u8,
}

impl VerbosityState {
    /// Flags as parsed from the command line
    pub fn new(silent: bool, verbose: u8) -> Self {
        Self { silent, verbose }
    }
}

/// Map verbosity flags to a threshold
pub fn select_level(state: VerbosityState) -> Severity {
    match state {
        VerbosityState { silent: true, .. } => Severity::Suppressed,
        VerbosityState { verbose: 0, .. } => Severity::Notice,
        VerbosityState { verbose: 1, .. } => Severity::Info,
        _ => Severity::Debug,
    }
}

/// Shared, mutable severity threshold
///
/// Cloning yields another handle onto the same threshold.
#[derive(Debug, Clone)]
pub struct LevelHandle {
    current: Arc<AtomicU8>,
}

impl LevelHandle {
    /// Create a handle starting at `initial`
    pub fn new(initial: Severity) -> Self {
        Self {
            current: Arc::new(AtomicU8::new(initial as u8)),
        }
    }

    /// Current threshold
    pub fn get(&self) -> Severity {
        Severity::from_index(self.current.load(Ordering::Acquire))
    }

    /// Replace the threshold for every clone of this handle
    pub fn set(&self, severity: Severity) {
        self.current.store(severity as u8, Ordering::Release);
    }
}

impl Default for LevelHandle {
    fn default() -> Self {
        Self::new(Severity::default())
    }
}

/// Per-layer filter that consults a [`LevelHandle`] on every record
#[derive(Debug, Clone)]
pub struct SeverityFilter {
    level: LevelHandle,
}

impl SeverityFilter {
    /// Filter against the threshold behind `level`
    pub fn new(level: LevelHandle) -> Self {
        Self { level }
    }
}

impl<S> Filter<S> for SeverityFilter {
    fn enabled(&self, meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        self.level.get().admits(meta)
    }

    // The threshold can change at any time, so callsites must never be cached.
    fn callsite_enabled(&self, _meta: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }
}
