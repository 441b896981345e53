//! dnswatch logging - runtime logging for the dnswatch daemon
//!
//! This library provides log path resolution, log file rotation, console/file
//! fan-out and verbosity selection for the daemon and its DNS proxy engine.

pub mod config;
pub mod logging;

/// Emit a notice record
///
/// Notices rank between `info` and `warn`; they are what the daemon shows at
/// its default verbosity.
#[macro_export]
macro_rules! notice {
    ($($arg:tt)+) => {
        ::tracing::info!(target: $crate::logging::NOTICE_TARGET, $($arg)+)
    };
}
