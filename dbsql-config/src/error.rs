//! Error types for configuration building.

use std::num::ParseIntError;

use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Stage label used when a DSN fails to parse.
pub(crate) const DSN_STAGE: &str = "invalid DSN";

/// Stage label used when a configuration copy cannot re-resolve its timezone.
pub(crate) const COPY_STAGE: &str = "config copy";

/// Errors that can occur while building a connection configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Malformed DSN: unparsable URL, or missing/invalid port.
    #[error("invalid DSN: {0}")]
    DsnFormat(String),

    /// Disallowed credentials in the DSN user-info.
    #[error("invalid DSN: {0}")]
    AuthFormat(String),

    /// A numeric query parameter did not hold an integer.
    #[error("invalid DSN: {param} param is not an integer")]
    ParamType {
        /// Name of the offending query parameter.
        param: &'static str,
        /// Underlying integer parse failure.
        #[source]
        source: ParseIntError,
    },

    /// A numeric query parameter held an integer outside its allowed range.
    #[error("invalid DSN: {param} param must not be negative: {value}")]
    ParamRange {
        /// Name of the offending query parameter.
        param: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// A timezone name could not be resolved to a named timezone.
    #[error("{stage}: unknown time zone '{name}'")]
    TimezoneResolution {
        /// Stage at which the lookup happened.
        stage: &'static str,
        /// The name that failed to resolve.
        name: String,
    },

    /// Environment variable not found.
    #[error("environment variable not found: {0}")]
    EnvNotFound(String),
}

impl ConfigError {
    /// Create a DSN format error.
    pub fn dsn_format(message: impl Into<String>) -> Self {
        Self::DsnFormat(message.into())
    }

    /// Create an authentication format error.
    pub fn auth_format(message: impl Into<String>) -> Self {
        Self::AuthFormat(message.into())
    }

    /// Create a timezone resolution error.
    pub fn timezone(stage: &'static str, name: impl Into<String>) -> Self {
        Self::TimezoneResolution {
            stage,
            name: name.into(),
        }
    }

    /// Check if this is a DSN format error.
    pub fn is_dsn_format(&self) -> bool {
        matches!(self, Self::DsnFormat(_))
    }

    /// Check if this is an authentication format error.
    pub fn is_auth_format(&self) -> bool {
        matches!(self, Self::AuthFormat(_))
    }

    /// Check if this is a parameter type or range error.
    pub fn is_param_type(&self) -> bool {
        matches!(self, Self::ParamType { .. } | Self::ParamRange { .. })
    }

    /// Check if this is a timezone resolution error.
    pub fn is_timezone(&self) -> bool {
        matches!(self, Self::TimezoneResolution { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_creation() {
        let err = ConfigError::dsn_format("invalid DSN port");
        assert!(err.is_dsn_format());
        assert_eq!(err.to_string(), "invalid DSN: invalid DSN port");

        let err = ConfigError::auth_format("empty token");
        assert!(err.is_auth_format());
        assert_eq!(err.to_string(), "invalid DSN: empty token");

        let err = ConfigError::timezone(DSN_STAGE, "Mars/Olympus");
        assert!(err.is_timezone());
        assert_eq!(err.to_string(), "invalid DSN: unknown time zone 'Mars/Olympus'");
    }

    #[test]
    fn test_param_type_keeps_cause() {
        let source = "abc".parse::<i64>().unwrap_err();
        let err = ConfigError::ParamType {
            param: "maxRows",
            source,
        };
        assert!(err.is_param_type());
        assert_eq!(err.to_string(), "invalid DSN: maxRows param is not an integer");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_param_range_is_param_error() {
        let err = ConfigError::ParamRange {
            param: "timeout",
            value: -5,
        };
        assert!(err.is_param_type());
        assert_eq!(err.to_string(), "invalid DSN: timeout param must not be negative: -5");
    }
}
