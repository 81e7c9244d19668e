//! User-facing connection configuration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::auth::{Authenticator, NoopAuth, PatAuth};
use crate::dsn::parse_dsn;
use crate::error::{COPY_STAGE, ConfigResult};
use crate::timezone::Timezone;

/// Rows fetched per page when no page size is configured.
pub const DEFAULT_MAX_ROWS: usize = 100_000;

/// Protocol used when none is configured.
pub const DEFAULT_PROTOCOL: &str = "https";

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 443;

/// Retry attempts when none are configured.
pub const DEFAULT_RETRY_MAX: u32 = 4;

/// Shortest wait between retries when none is configured.
pub const DEFAULT_RETRY_WAIT_MIN: Duration = Duration::from_secs(1);

/// Longest wait between retries when none is configured.
pub const DEFAULT_RETRY_WAIT_MAX: Duration = Duration::from_secs(30);

/// Configuration exposed to users of the client.
///
/// Zero values (`0`, empty strings, `None`) mean "unset" until
/// [`with_defaults`](Self::with_defaults) fills them in.
#[derive(Clone, Default)]
pub struct UserConfig {
    /// `http` or `https`.
    pub protocol: String,
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// HTTP path of the SQL endpoint.
    pub http_path: String,
    /// Default catalog for the session.
    pub catalog: Option<String>,
    /// Default schema for the session.
    pub schema: Option<String>,
    /// Supplies request credentials.
    pub authenticator: Option<Arc<dyn Authenticator>>,
    /// Personal access token, mirrored from token authentication.
    pub access_token: Option<String>,
    /// Max rows per page.
    pub max_rows: usize,
    /// Server-side query budget; zero means no budget.
    pub query_timeout: Duration,
    /// Suffix appended to the client user agent.
    pub user_agent_entry: Option<String>,
    /// Session timezone.
    pub location: Option<Timezone>,
    /// Free-form parameters forwarded at session start.
    pub session_params: Option<HashMap<String, String>>,
    /// Shortest wait between retries.
    pub retry_wait_min: Duration,
    /// Longest wait between retries.
    pub retry_wait_max: Duration,
    /// Maximum retry attempts.
    pub retry_max: u32,
}

impl UserConfig {
    /// Create an empty configuration with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for configuration.
    pub fn builder() -> UserConfigBuilder {
        UserConfigBuilder::new()
    }

    /// Parse a DSN into a defaulted configuration.
    pub fn from_dsn(dsn: &str) -> ConfigResult<Self> {
        parse_dsn(dsn)
    }

    /// Fill unset fields with defaults. Idempotent.
    pub fn with_defaults(mut self) -> Self {
        if self.max_rows == 0 {
            self.max_rows = DEFAULT_MAX_ROWS;
        }
        if self.protocol.is_empty() {
            self.protocol = DEFAULT_PROTOCOL.to_string();
            self.port = DEFAULT_PORT;
        }
        if self.port == 0 {
            self.port = DEFAULT_PORT;
        }
        if self.authenticator.is_none() {
            self.authenticator = Some(Arc::new(NoopAuth));
        }
        if self.session_params.is_none() {
            self.session_params = Some(HashMap::new());
        }
        if self.retry_max == 0 {
            self.retry_max = DEFAULT_RETRY_MAX;
        }
        if self.retry_wait_min.is_zero() {
            self.retry_wait_min = DEFAULT_RETRY_WAIT_MIN;
        }
        if self.retry_wait_max.is_zero() {
            self.retry_wait_max = DEFAULT_RETRY_WAIT_MAX;
        }
        // min <= max
        if self.retry_wait_max < self.retry_wait_min {
            self.retry_wait_max = self.retry_wait_min;
        }
        self
    }

    /// Copy that shares no mutable state with `self`, re-resolving the
    /// timezone from its name.
    pub fn try_deep_copy(&self) -> ConfigResult<Self> {
        let location = self
            .location
            .as_ref()
            .map(|tz| tz.reload(COPY_STAGE))
            .transpose()?;
        Ok(self.copy_with_location(location))
    }

    /// Like [`try_deep_copy`](Self::try_deep_copy), but never fails: a
    /// timezone that cannot be re-resolved is dropped with a warning.
    pub fn deep_copy(&self) -> Self {
        let location = self.location.as_ref().and_then(|tz| match tz.reload(COPY_STAGE) {
            Ok(copy) => Some(copy),
            Err(e) => {
                warn!(timezone = %tz, error = %e, "could not copy location");
                None
            }
        });
        self.copy_with_location(location)
    }

    fn copy_with_location(&self, location: Option<Timezone>) -> Self {
        Self {
            protocol: self.protocol.clone(),
            host: self.host.clone(),
            port: self.port,
            http_path: self.http_path.clone(),
            catalog: self.catalog.clone(),
            schema: self.schema.clone(),
            authenticator: self.authenticator.clone(),
            access_token: self.access_token.clone(),
            max_rows: self.max_rows,
            query_timeout: self.query_timeout,
            user_agent_entry: self.user_agent_entry.clone(),
            location,
            session_params: self.session_params.clone(),
            retry_wait_min: self.retry_wait_min,
            retry_wait_max: self.retry_wait_max,
            retry_max: self.retry_max,
        }
    }

    /// Look up a session parameter.
    pub fn session_param(&self, key: &str) -> Option<&str> {
        self.session_params
            .as_ref()
            .and_then(|params| params.get(key))
            .map(String::as_str)
    }
}

impl fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserConfig")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("http_path", &self.http_path)
            .field("catalog", &self.catalog)
            .field("schema", &self.schema)
            .field("authenticator", &self.authenticator.as_ref().map(|a| a.name()))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("max_rows", &self.max_rows)
            .field("query_timeout", &self.query_timeout)
            .field("user_agent_entry", &self.user_agent_entry)
            .field("location", &self.location)
            .field("session_params", &self.session_params)
            .field("retry_wait_min", &self.retry_wait_min)
            .field("retry_wait_max", &self.retry_wait_max)
            .field("retry_max", &self.retry_max)
            .finish()
    }
}

/// Authenticators compare by identity.
impl PartialEq for UserConfig {
    fn eq(&self, other: &Self) -> bool {
        let same_auth = match (&self.authenticator, &other.authenticator) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_auth
            && self.protocol == other.protocol
            && self.host == other.host
            && self.port == other.port
            && self.http_path == other.http_path
            && self.catalog == other.catalog
            && self.schema == other.schema
            && self.access_token == other.access_token
            && self.max_rows == other.max_rows
            && self.query_timeout == other.query_timeout
            && self.user_agent_entry == other.user_agent_entry
            && self.location == other.location
            && self.session_params == other.session_params
            && self.retry_wait_min == other.retry_wait_min
            && self.retry_wait_max == other.retry_wait_max
            && self.retry_max == other.retry_max
    }
}

/// Builder for user configuration.
///
/// Explicit values override anything parsed from [`dsn`](Self::dsn).
#[derive(Default)]
pub struct UserConfigBuilder {
    dsn: Option<String>,
    protocol: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    http_path: Option<String>,
    catalog: Option<String>,
    schema: Option<String>,
    authenticator: Option<Arc<dyn Authenticator>>,
    access_token: Option<String>,
    max_rows: Option<usize>,
    query_timeout: Option<Duration>,
    user_agent_entry: Option<String>,
    timezone: Option<String>,
    session_params: HashMap<String, String>,
    retry_wait_min: Option<Duration>,
    retry_wait_max: Option<Duration>,
    retry_max: Option<u32>,
}

impl fmt::Debug for UserConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserConfigBuilder")
            .field("has_dsn", &self.dsn.is_some())
            .field("host", &self.host)
            .field("port", &self.port)
            .field("http_path", &self.http_path)
            .finish_non_exhaustive()
    }
}

impl UserConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a DSN.
    pub fn dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = Some(dsn.into());
        self
    }

    /// Set the protocol (`http` or `https`).
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Set the host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the HTTP path.
    pub fn http_path(mut self, path: impl Into<String>) -> Self {
        self.http_path = Some(path.into());
        self
    }

    /// Set the default catalog.
    pub fn catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Set the default schema.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Use a personal access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Use a custom authenticator. Takes precedence over an access token.
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Set the page size.
    pub fn max_rows(mut self, rows: usize) -> Self {
        self.max_rows = Some(rows);
        self
    }

    /// Set the server-side query timeout.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Set the user agent suffix.
    pub fn user_agent_entry(mut self, entry: impl Into<String>) -> Self {
        self.user_agent_entry = Some(entry.into());
        self
    }

    /// Set the session timezone by name; resolved in [`build`](Self::build).
    pub fn timezone(mut self, name: impl Into<String>) -> Self {
        self.timezone = Some(name.into());
        self
    }

    /// Add a session parameter.
    pub fn session_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.session_params.insert(key.into(), value.into());
        self
    }

    /// Set the retry wait bounds.
    pub fn retry_wait(mut self, min: Duration, max: Duration) -> Self {
        self.retry_wait_min = Some(min);
        self.retry_wait_max = Some(max);
        self
    }

    /// Set the maximum retry attempts.
    pub fn retry_max(mut self, attempts: u32) -> Self {
        self.retry_max = Some(attempts);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ConfigResult<UserConfig> {
        let mut config = match self.dsn {
            Some(ref dsn) => parse_dsn(dsn)?,
            None => UserConfig::new(),
        };

        if let Some(protocol) = self.protocol {
            config.protocol = protocol;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = self.http_path {
            config.http_path = path;
        }
        if let Some(catalog) = self.catalog {
            config.catalog = Some(catalog);
        }
        if let Some(schema) = self.schema {
            config.schema = Some(schema);
        }
        if let Some(token) = self.access_token {
            config.authenticator = Some(Arc::new(PatAuth::new(token.clone())));
            config.access_token = Some(token);
        }
        if let Some(authenticator) = self.authenticator {
            config.authenticator = Some(authenticator);
        }
        if let Some(rows) = self.max_rows {
            config.max_rows = rows;
        }
        if let Some(timeout) = self.query_timeout {
            config.query_timeout = timeout;
        }
        if let Some(entry) = self.user_agent_entry {
            config.user_agent_entry = Some(entry);
        }
        if let Some(name) = self.timezone {
            config.location = Some(Timezone::resolve(&name)?);
        }
        if !self.session_params.is_empty() {
            config
                .session_params
                .get_or_insert_with(HashMap::new)
                .extend(self.session_params);
        }
        if let Some(min) = self.retry_wait_min {
            config.retry_wait_min = min;
        }
        if let Some(max) = self.retry_wait_max {
            config.retry_wait_max = max;
        }
        if let Some(attempts) = self.retry_max {
            config.retry_max = attempts;
        }

        Ok(config.with_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_on_empty() {
        let config = UserConfig::new().with_defaults();
        assert_eq!(config.max_rows, DEFAULT_MAX_ROWS);
        assert_eq!(config.protocol, "https");
        assert_eq!(config.port, 443);
        assert_eq!(config.authenticator.as_ref().map(|a| a.name()), Some("noop"));
        assert_eq!(config.session_params, Some(HashMap::new()));
        assert_eq!(config.retry_max, 4);
        assert_eq!(config.retry_wait_min, Duration::from_secs(1));
        assert_eq!(config.retry_wait_max, Duration::from_secs(30));
    }

    #[test]
    fn test_defaults_keep_set_fields() {
        let config = UserConfig {
            protocol: "http".to_string(),
            port: 8080,
            max_rows: 10,
            retry_max: 1,
            ..UserConfig::default()
        }
        .with_defaults();
        assert_eq!(config.protocol, "http");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_rows, 10);
        assert_eq!(config.retry_max, 1);
    }

    #[test]
    fn test_defaults_port_when_protocol_set() {
        let config = UserConfig {
            protocol: "http".to_string(),
            ..UserConfig::default()
        }
        .with_defaults();
        assert_eq!(config.protocol, "http");
        assert_eq!(config.port, 443);
    }

    #[test]
    fn test_defaults_empty_protocol_resets_port() {
        let config = UserConfig {
            port: 8443,
            ..UserConfig::default()
        }
        .with_defaults();
        assert_eq!(config.port, 443);
    }

    #[test]
    fn test_defaults_idempotent() {
        let inputs = [
            UserConfig::new(),
            UserConfig {
                host: "example.com".to_string(),
                retry_wait_min: Duration::from_secs(60),
                ..UserConfig::default()
            },
            UserConfig {
                protocol: "http".to_string(),
                session_params: Some(HashMap::from([("a".to_string(), "b".to_string())])),
                ..UserConfig::default()
            },
        ];
        for input in inputs {
            let once = input.with_defaults();
            let twice = once.clone().with_defaults();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_defaults_retry_wait_ordered() {
        let config = UserConfig {
            retry_wait_min: Duration::from_secs(60),
            ..UserConfig::default()
        }
        .with_defaults();
        assert!(config.retry_wait_min <= config.retry_wait_max);
    }

    #[test]
    fn test_deep_copy_session_params_independent() {
        let original = UserConfig {
            session_params: Some(HashMap::from([("a".to_string(), "1".to_string())])),
            ..UserConfig::default()
        };
        let mut copy = original.deep_copy();
        copy.session_params
            .as_mut()
            .unwrap()
            .insert("b".to_string(), "2".to_string());
        assert_eq!(original.session_params.as_ref().unwrap().len(), 1);
        assert_eq!(copy.session_params.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_deep_copy_keeps_unset_params_unset() {
        let copy = UserConfig::new().deep_copy();
        assert!(copy.session_params.is_none());

        let empty = UserConfig {
            session_params: Some(HashMap::new()),
            ..UserConfig::default()
        };
        assert_eq!(empty.deep_copy().session_params, Some(HashMap::new()));
    }

    #[test]
    fn test_deep_copy_location() {
        let original = UserConfig {
            location: Some(Timezone::resolve("Europe/Berlin").unwrap()),
            ..UserConfig::default()
        };
        let copy = original.try_deep_copy().unwrap();
        assert_eq!(copy.location.map(|tz| tz.name()), Some("Europe/Berlin"));
        assert_eq!(original.deep_copy(), copy);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = UserConfig::builder().access_token("dapiSECRET").build().unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("dapiSECRET"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_builder_components() {
        let config = UserConfig::builder()
            .host("example.cloud.com")
            .http_path("/sql/1.0/endpoints/abc")
            .access_token("dapi1")
            .catalog("main")
            .timezone("Asia/Kolkata")
            .session_param("ansi_mode", "true")
            .build()
            .unwrap();
        assert_eq!(config.host, "example.cloud.com");
        assert_eq!(config.port, 443);
        assert_eq!(config.access_token.as_deref(), Some("dapi1"));
        assert_eq!(config.authenticator.as_ref().map(|a| a.name()), Some("pat"));
        assert_eq!(config.catalog.as_deref(), Some("main"));
        assert_eq!(config.location.map(|tz| tz.name()), Some("Asia/Kolkata"));
        assert_eq!(config.session_param("ansi_mode"), Some("true"));
    }

    #[test]
    fn test_builder_overrides_dsn() {
        let config = UserConfig::builder()
            .dsn("token:abc@example.com:443/sql?maxRows=50&foo=bar")
            .port(8443)
            .max_rows(10)
            .session_param("baz", "qux")
            .build()
            .unwrap();
        assert_eq!(config.port, 8443);
        assert_eq!(config.max_rows, 10);
        assert_eq!(config.access_token.as_deref(), Some("abc"));
        assert_eq!(config.session_param("foo"), Some("bar"));
        assert_eq!(config.session_param("baz"), Some("qux"));
    }

    #[test]
    fn test_builder_unknown_timezone() {
        let err = UserConfig::builder().timezone("Nowhere/City").build().unwrap_err();
        assert!(err.is_timezone());
    }
}
