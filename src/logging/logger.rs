//! Immutable logger snapshots
//!
//! A [`Logger`] bundles a tracing dispatcher with the destinations it writes to.
//! Snapshots are never modified after construction; reconfiguration builds a new
//! one and swaps it into a [`LoggerRegistry`](super::LoggerRegistry).

use std::fmt;
use std::path::PathBuf;

use chrono::Local;
use tracing::Dispatch;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

use super::fanout::{FanoutWriter, Sink};
use super::level::{LevelHandle, SeverityFilter};

/// Console-style timestamp with milliseconds, e.g. `Jan  2 15:04:05.000`
pub const TIMESTAMP_FORMAT: &str = "%b %e %H:%M:%S%.3f";

/// Where a logger sends its records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Console,
    File { path: PathBuf, backup: bool },
}

struct StampMilli;

impl FormatTime for StampMilli {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format(TIMESTAMP_FORMAT))
    }
}

/// One logger configuration
pub struct Logger {
    dispatch: Dispatch,
    destinations: Vec<LogDestination>,
    writer: Option<FanoutWriter>,
}

impl Logger {
    /// A logger that drops everything
    pub fn discard() -> Self {
        Self {
            dispatch: Dispatch::none(),
            destinations: Vec::new(),
            writer: None,
        }
    }

    /// Build a logger writing formatted records to `writer`
    ///
    /// Records are filtered through `level` on every call, so threshold
    /// changes apply to this logger without rebuilding it.
    pub fn new(writer: FanoutWriter, level: LevelHandle, destinations: Vec<LogDestination>) -> Self {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer.clone())
            .with_ansi(false)
            .with_target(false)
            .with_timer(StampMilli)
            .with_filter(SeverityFilter::new(level));

        Self {
            dispatch: Dispatch::new(tracing_subscriber::registry().with(layer)),
            destinations,
            writer: Some(writer),
        }
    }

    /// Run `f` with this logger as the thread's default dispatcher
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Destinations in fan-out order (file first, then console)
    pub fn destinations(&self) -> &[LogDestination] {
        &self.destinations
    }

    /// Sinks behind the destinations, for failure and drop counts
    pub fn sinks(&self) -> &[Sink] {
        self.writer.as_ref().map(FanoutWriter::sinks).unwrap_or_default()
    }

    /// Check whether this is the seed logger that drops everything
    pub fn is_discard(&self) -> bool {
        self.destinations.is_empty()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("destinations", &self.destinations)
            .field("sinks", &self.sinks())
            .finish()
    }
}
