//! Fatal logging initialization errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit status used for every fatal logging failure
pub const FATAL_EXIT_CODE: u8 = 1;

/// Errors that leave the daemon without a usable log sink
#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("failed to create log path {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create log file {}: {source}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LogInitError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> u8 {
        FATAL_EXIT_CODE
    }
}
