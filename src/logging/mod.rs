//! Logging subsystem for the dnswatch daemon
//!
//! Resolves where logs go, rotates the previous log on restart, fans records out
//! to the log file and the console, and maps verbosity flags to a threshold.
//! Loggers are swapped atomically through [`LoggerRegistry`] whenever the
//! daemon changes mode.

mod error;
mod fanout;
mod init;
mod level;
mod log_file;
mod logger;
mod path;
mod registry;

#[cfg(test)]
mod testing;

pub use error::{LogInitError, FATAL_EXIT_CODE};
pub use fanout::{FanoutWriter, Sink, SINK_BUFFERED_LINES};
pub use init::LoggingContext;
pub use level::{
    select_level, LevelHandle, LevelParseError, Severity, SeverityFilter, VerbosityState,
    NOTICE_TARGET,
};
pub use log_file::{backup_path, open_or_rotate, BackupPolicy, OpenOutcome, OpenedLog, BACKUP_SUFFIX};
pub use logger::{LogDestination, Logger, TIMESTAMP_FORMAT};
pub use path::{resolve, resolve_with, ExecutionContext};
pub use registry::LoggerRegistry;
