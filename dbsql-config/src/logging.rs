//! Logging bootstrap.
//!
//! The crate emits `tracing` events: DSN parsing logs the parsed endpoint at
//! `debug`, building a full configuration logs it at `info`, and a copy that
//! drops an unresolvable timezone warns. Tokens never appear in these events.
//! Nothing is printed unless a subscriber is installed. Applications without
//! their own subscriber can call [`init`], which is controlled by the
//! environment:
//!
//! - `DBSQL_DEBUG=true` - Enable debug logging
//! - `DBSQL_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `DBSQL_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! [`init`] needs the `tracing-subscriber` feature; without it the call only
//! records that initialisation happened.
//!
//! ```rust,no_run
//! dbsql_config::logging::init();
//! ```

use std::env;
use std::sync::Once;

use tracing::Level;

const DEBUG_VAR: &str = "DBSQL_DEBUG";
const LEVEL_VAR: &str = "DBSQL_LOG_LEVEL";
const FORMAT_VAR: &str = "DBSQL_LOG_FORMAT";

/// Crates whose events the installed filter lets through.
#[cfg_attr(not(feature = "tracing-subscriber"), allow(dead_code))]
const TARGETS: [&str; 2] = ["dbsql", "dbsql_config"];

static INIT: Once = Once::new();

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line, human-oriented output.
    Pretty,
    /// Single-line output.
    Compact,
}

impl LogFormat {
    /// Parse a format name, case-insensitively. Unknown names give `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }

    /// Name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

/// Whether `DBSQL_DEBUG` is "true", "1" or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Level from `DBSQL_LOG_LEVEL`; `debug` under `DBSQL_DEBUG`, else `warn`.
pub fn log_level() -> Level {
    let fallback = if is_debug_enabled() {
        Level::DEBUG
    } else {
        Level::WARN
    };
    env::var(LEVEL_VAR)
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(fallback)
}

/// Format from `DBSQL_LOG_FORMAT`, defaulting to JSON.
pub fn log_format() -> LogFormat {
    env::var(FORMAT_VAR)
        .ok()
        .and_then(|f| LogFormat::from_name(&f))
        .unwrap_or_default()
}

/// Filter directive enabling `level` for this crate family only.
#[cfg_attr(not(feature = "tracing-subscriber"), allow(dead_code))]
fn filter_directive(level: Level) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install a global subscriber. Subsequent calls are no-ops.
///
/// Does nothing unless `DBSQL_DEBUG` or `DBSQL_LOG_LEVEL` is set, so an
/// application that installs its own subscriber is left alone.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = log_level();
            let format = log_format();
            let filter = EnvFilter::try_new(filter_directive(level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match format {
                LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(%level, format = format.as_str(), "dbsql logging initialized");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_disabled_by_default() {
        if env::var(DEBUG_VAR).is_err() {
            assert!(!is_debug_enabled());
        }
    }

    #[test]
    fn test_log_level_default() {
        if env::var(DEBUG_VAR).is_err() && env::var(LEVEL_VAR).is_err() {
            assert_eq!(log_level(), Level::WARN);
        }
    }

    #[test]
    fn test_log_format_names() {
        assert_eq!(LogFormat::from_name("PRETTY"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::from_name("compact"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::from_name("xml"), None);
        assert_eq!(LogFormat::default().as_str(), "json");
    }

    #[test]
    fn test_filter_directive_scoped_to_crates() {
        assert_eq!(
            filter_directive(Level::DEBUG),
            "dbsql=DEBUG,dbsql_config=DEBUG"
        );
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
