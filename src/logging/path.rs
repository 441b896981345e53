//! Log file path resolution
//!
//! A relative log path is interpreted against the user's home directory when the
//! daemon runs as a service. Interactive runs keep the path as given.

use std::path::{Path, PathBuf};

/// How the process was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Attached to a console
    Interactive,
    /// Started by a service manager
    Service,
}

impl ExecutionContext {
    /// Detect the execution context of the current process
    ///
    /// On Unix a process whose parent is PID 1 (init, systemd, launchd) is a
    /// service. Elsewhere an attached terminal on stdin means interactive.
    pub fn detect() -> Self {
        #[cfg(unix)]
        {
            if std::os::unix::process::parent_id() == 1 {
                ExecutionContext::Service
            } else {
                ExecutionContext::Interactive
            }
        }
        #[cfg(not(unix))]
        {
            use std::io::IsTerminal;
            if std::io::stdin().is_terminal() {
                ExecutionContext::Interactive
            } else {
                ExecutionContext::Service
            }
        }
    }

    /// Check whether the daemon runs attached to a user session
    pub fn is_interactive(&self) -> bool {
        matches!(self, ExecutionContext::Interactive)
    }
}

/// Resolve a configured log path, looking up the home directory with `dirs`
pub fn resolve(configured: &str, interactive: bool, home_override: Option<&Path>) -> PathBuf {
    resolve_with(configured, interactive, home_override, dirs::home_dir)
}

/// Resolve a configured log path with an explicit home directory lookup
///
/// Never fails: when no home directory can be found the configured path is
/// returned as is.
pub fn resolve_with<F>(
    configured: &str,
    interactive: bool,
    home_override: Option<&Path>,
    home_dir: F,
) -> PathBuf
where
    F: FnOnce() -> Option<PathBuf>,
{
    let path = PathBuf::from(configured);
    if configured.is_empty() || path.is_absolute() || interactive {
        return path;
    }

    if let Some(home) = home_override.filter(|h| !h.as_os_str().is_empty()) {
        return home.join(path);
    }

    match home_dir() {
        Some(home) if !home.as_os_str().is_empty() => home.join(path),
        _ => path,
    }
}
