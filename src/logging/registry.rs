//! Holder of the current logger
//!
//! Worker threads call [`LoggerRegistry::load`] on every log call, so reads are
//! lock-free. Reconfiguration swaps in a whole new [`Logger`] with
//! [`LoggerRegistry::store`]; readers that already hold the previous snapshot
//! keep using it until they drop it.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::logger::Logger;

pub struct LoggerRegistry {
    current: ArcSwap<Logger>,
}

impl LoggerRegistry {
    /// Create a registry seeded with a discard logger
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Logger::discard()),
        }
    }

    /// Replace the current logger; the last store wins
    pub fn store(&self, logger: Arc<Logger>) {
        self.current.store(logger);
    }

    /// Get the current logger
    pub fn load(&self) -> Arc<Logger> {
        self.current.load_full()
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("current", &*self.current.load())
            .finish()
    }
}
