//! Logging setup: console plus a daily-rolled log file.

use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// File name of the rolling log inside the log directory.
pub const LOG_FILE: &str = "travel-rag.log";

/// How chatty the console should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors only. Used by `query` so the answer is the only output.
    Quiet,
    /// Progress messages.
    Normal,
    /// `-v` count above zero.
    Verbose(u8),
}

impl Verbosity {
    /// Resolve the `-v` count for a command.
    pub fn from_flags(count: u8, quiet_by_default: bool) -> Self {
        match (count, quiet_by_default) {
            (0, true) => Verbosity::Quiet,
            (0, false) => Verbosity::Normal,
            (n, _) => Verbosity::Verbose(n),
        }
    }

    pub fn level(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Verbose(1) => "info",
            Verbosity::Verbose(2) => "debug",
            Verbosity::Verbose(_) => "trace",
        }
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self, Verbosity::Quiet)
    }

    /// Default filter directive when `RUST_LOG` is unset.
    pub fn directive(&self) -> String {
        format!("travel_rag={}", self.level())
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity.
///
/// With a log directory, a second non-ANSI layer writes `travel-rag.log`
/// there, rolled daily.
pub fn init(verbosity: Verbosity, log_dir: Option<&Path>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = log_dir.and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(0, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(1, true), Verbosity::Verbose(1));
    }

    #[test]
    fn test_levels() {
        assert_eq!(Verbosity::Quiet.level(), "error");
        assert_eq!(Verbosity::Normal.level(), "info");
        assert_eq!(Verbosity::Verbose(2).level(), "debug");
        assert_eq!(Verbosity::Verbose(5).level(), "trace");
        assert_eq!(Verbosity::Normal.directive(), "travel_rag=info");
    }
}
