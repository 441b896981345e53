//! Logging initialization
//!
//! [`LoggingContext`] owns the main and proxy logger registries plus the shared
//! severity threshold. The daemon calls one of the `init_*` methods at startup
//! and again on every switch between interactive and service mode.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use super::error::LogInitError;
use super::fanout::{FanoutWriter, Sink};
use super::level::{select_level, LevelHandle, LevelParseError, Severity, VerbosityState};
use super::log_file::{open_or_rotate, BackupPolicy, OpenOutcome};
use super::logger::{LogDestination, Logger};
use super::path::{self, ExecutionContext};
use super::registry::LoggerRegistry;
use crate::config::LogConfig;

/// Process-wide logging state, threaded through daemon startup
#[derive(Debug)]
pub struct LoggingContext {
    main: LoggerRegistry,
    proxy: LoggerRegistry,
    level: LevelHandle,
    // Its writer thread lives as long as the context and is flushed on drop
    console: Sink,
    // Serializes reconfiguration (and with it file rotation); never taken on
    // the write path.
    reconfigure: Mutex<()>,
}

impl LoggingContext {
    /// Create a context logging to stdout; both registries start out discarding
    pub fn new() -> Self {
        Self::with_console(Sink::stdout())
    }

    /// Create a context with a custom console sink
    pub fn with_console(console: Sink) -> Self {
        Self {
            main: LoggerRegistry::new(),
            proxy: LoggerRegistry::new(),
            level: LevelHandle::default(),
            console,
            reconfigure: Mutex::new(()),
        }
    }

    /// Registry of the daemon's main logger
    pub fn main(&self) -> &LoggerRegistry {
        &self.main
    }

    /// Registry of the logger handed to the DNS proxy engine
    pub fn proxy(&self) -> &LoggerRegistry {
        &self.proxy
    }

    /// Currently active threshold
    pub fn level(&self) -> Severity {
        self.level.get()
    }

    /// Apply the threshold selected by `state` to every logger of this context
    pub fn set_level(&self, state: VerbosityState) -> Severity {
        let severity = select_level(state);
        self.level.set(severity);
        severity
    }

    /// Apply an externally supplied level name
    ///
    /// An unknown name is reported as a warning and the previous threshold stays.
    pub fn apply_level_name(&self, name: &str) -> Result<Severity, LevelParseError> {
        match name.parse::<Severity>() {
            Ok(severity) => {
                self.level.set(severity);
                Ok(severity)
            }
            Err(e) => {
                self.main
                    .load()
                    .in_scope(|| warn!("could not set log level: {}", e));
                Err(e)
            }
        }
    }

    /// Switch the main logger to console-only output
    ///
    /// The proxy engine only gets the console logger when running verbose.
    pub fn init_console(&self, verbosity: VerbosityState) {
        let _guard = self.lock();

        let logger = Arc::new(self.build_logger(
            vec![self.console.clone()],
            vec![LogDestination::Console],
        ));
        self.main.store(Arc::clone(&logger));
        if !verbosity.silent && verbosity.verbose >= 1 {
            self.proxy.store(logger);
        }
        self.set_level(verbosity);
    }

    /// Initialize logging from `config` without rotating the log file
    pub fn init(
        &self,
        config: &LogConfig,
        context: ExecutionContext,
    ) -> Result<Vec<LogDestination>, LogInitError> {
        self.init_with_backup(config, context, false)
    }

    /// Initialize logging from `config`
    ///
    /// When `backup` is true an existing log file is kept as `<path>.1` and a
    /// fresh one is started. Returns the destinations in fan-out order. On
    /// error the previously stored loggers stay in place.
    pub fn init_with_backup(
        &self,
        config: &LogConfig,
        context: ExecutionContext,
        backup: bool,
    ) -> Result<Vec<LogDestination>, LogInitError> {
        let _guard = self.lock();

        let mut sinks = Vec::new();
        let mut destinations = Vec::new();
        let mut rotation_error = None;

        let log_path = path::resolve(
            &config.log_path,
            context.is_interactive(),
            config.home_dir.as_deref(),
        );
        if !log_path.as_os_str().is_empty() {
            let opened = open_or_rotate(&log_path, BackupPolicy { do_backup: backup })?;
            if let OpenOutcome::RotationFailed(e) = opened.outcome {
                rotation_error = Some(e);
            }

            sinks.push(Sink::new("file", opened.file));
            destinations.push(LogDestination::File {
                path: opened.path,
                backup,
            });
        }
        sinks.push(self.console.clone());
        destinations.push(LogDestination::Console);

        let logger = Arc::new(self.build_logger(sinks, destinations.clone()));
        self.main.store(Arc::clone(&logger));
        self.proxy.store(Arc::clone(&logger));

        if let Some(e) = rotation_error {
            logger.in_scope(|| warn!("could not backup old log file: {}", e));
        }

        self.apply_config_level(config);
        Ok(destinations)
    }

    /// Initialize console-only logging for interactive commands
    ///
    /// The configured log file is ignored and the proxy engine is silenced.
    pub fn init_interactive(
        &self,
        config: &LogConfig,
    ) -> Result<Vec<LogDestination>, LogInitError> {
        let console_only = LogConfig {
            log_path: String::new(),
            ..config.clone()
        };
        let destinations =
            self.init_with_backup(&console_only, ExecutionContext::Interactive, false)?;
        self.proxy.store(Arc::new(Logger::discard()));
        Ok(destinations)
    }

    fn apply_config_level(&self, config: &LogConfig) {
        let state = config.verbosity();
        self.set_level(state);
        // Verbosity flags take precedence over a configured level name
        if !state.silent && state.verbose == 0 {
            if let Some(name) = config.log_level.as_deref() {
                let _ = self.apply_level_name(name);
            }
        }
    }

    fn build_logger(&self, sinks: Vec<Sink>, destinations: Vec<LogDestination>) -> Logger {
        Logger::new(FanoutWriter::new(sinks), self.level.clone(), destinations)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.reconfigure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LoggingContext {
    fn default() -> Self {
        Self::new()
    }
}
