//! Full driver configuration.

use std::net::Ipv6Addr;
use std::time::Duration;

use tracing::info;

use crate::error::ConfigResult;
use crate::tls::TlsConfig;
use crate::user::UserConfig;

/// Name the driver reports to the server.
pub const DRIVER_NAME: &str = "dbsql-rs";

/// Version the driver reports to the server.
pub const DRIVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default interval between status polls of an async query.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default upper bound on a single HTTP request.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(900);

/// Default upper bound on a ping.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(60);

/// CLI service protocol version negotiated with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(i32)]
pub enum ProtocolVersion {
    /// Spark CLI service protocol V1.
    SparkV1 = 0xA501,
    /// Spark CLI service protocol V2.
    SparkV2 = 0xA502,
    /// Spark CLI service protocol V3.
    SparkV3 = 0xA503,
    /// Spark CLI service protocol V4.
    SparkV4 = 0xA504,
    /// Spark CLI service protocol V5.
    SparkV5 = 0xA505,
    /// Spark CLI service protocol V6.
    #[default]
    SparkV6 = 0xA506,
    /// Spark CLI service protocol V7.
    SparkV7 = 0xA507,
    /// Spark CLI service protocol V8.
    SparkV8 = 0xA508,
}

impl ProtocolVersion {
    /// Wire value of this version.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Look up a version by wire value.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0xA501 => Some(Self::SparkV1),
            0xA502 => Some(Self::SparkV2),
            0xA503 => Some(Self::SparkV3),
            0xA504 => Some(Self::SparkV4),
            0xA505 => Some(Self::SparkV5),
            0xA506 => Some(Self::SparkV6),
            0xA507 => Some(Self::SparkV7),
            0xA508 => Some(Self::SparkV8),
            _ => None,
        }
    }
}

/// Driver configuration: the user configuration plus process and transport
/// settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// User-facing settings.
    pub user: UserConfig,
    /// TLS policy; `None` disables TLS.
    pub tls: Option<TlsConfig>,
    /// Run queries asynchronously and poll for results.
    pub run_async: bool,
    /// Interval between status polls.
    pub poll_interval: Duration,
    /// Max time an HTTP request can last.
    pub client_timeout: Duration,
    /// Max time allowed for a ping.
    pub ping_timeout: Duration,
    /// Server supports switching catalogs within a session.
    pub can_use_multiple_catalogs: bool,
    /// Driver name sent to the server.
    pub driver_name: String,
    /// Driver version sent to the server.
    pub driver_version: String,
    /// Thrift protocol (`binary`).
    pub thrift_protocol: String,
    /// Thrift transport (`http`).
    pub thrift_transport: String,
    /// CLI service protocol version.
    pub thrift_protocol_version: ProtocolVersion,
    /// Log every protocol call.
    pub thrift_debug_client_protocol: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Config {
    /// Configuration with every process-level default applied.
    pub fn with_defaults() -> Self {
        Self {
            user: UserConfig::new().with_defaults(),
            tls: Some(TlsConfig::default()),
            run_async: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            client_timeout: DEFAULT_CLIENT_TIMEOUT,
            ping_timeout: DEFAULT_PING_TIMEOUT,
            can_use_multiple_catalogs: true,
            driver_name: DRIVER_NAME.to_string(),
            driver_version: DRIVER_VERSION.to_string(),
            thrift_protocol: "binary".to_string(),
            thrift_transport: "http".to_string(),
            thrift_protocol_version: ProtocolVersion::default(),
            thrift_debug_client_protocol: false,
        }
    }

    /// Combine a user configuration with the process defaults.
    pub fn from_user(user: UserConfig) -> Self {
        let config = Self {
            user: user.with_defaults(),
            ..Self::with_defaults()
        };
        info!(
            host = %config.user.host,
            port = config.user.port,
            tls = config.tls.is_some(),
            "Config assembled"
        );
        config
    }

    /// Parse a DSN and combine it with the process defaults.
    pub fn from_dsn(dsn: &str) -> ConfigResult<Self> {
        UserConfig::from_dsn(dsn).map(Self::from_user)
    }

    /// Create a builder for configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Endpoint the transport connects to: `<protocol>://<host>:<port><path>`.
    ///
    /// Credentials are never part of the endpoint.
    pub fn endpoint_url(&self) -> String {
        let user = &self.user;
        // IPv6 literals need their brackets back
        let host = if user.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", user.host)
        } else {
            user.host.clone()
        };
        format!("{}://{}:{}{}", user.protocol, host, user.port, user.http_path)
    }

    /// Copy that shares no mutable state with `self`. Never fails; see
    /// [`UserConfig::deep_copy`].
    pub fn deep_copy(&self) -> Self {
        self.copy_with_user(self.user.deep_copy())
    }

    /// Copy that shares no mutable state with `self`, failing if the
    /// timezone cannot be re-resolved.
    pub fn try_deep_copy(&self) -> ConfigResult<Self> {
        Ok(self.copy_with_user(self.user.try_deep_copy()?))
    }

    fn copy_with_user(&self, user: UserConfig) -> Self {
        Self {
            user,
            tls: self.tls.clone(),
            run_async: self.run_async,
            poll_interval: self.poll_interval,
            client_timeout: self.client_timeout,
            ping_timeout: self.ping_timeout,
            can_use_multiple_catalogs: self.can_use_multiple_catalogs,
            driver_name: self.driver_name.clone(),
            driver_version: self.driver_version.clone(),
            thrift_protocol: self.thrift_protocol.clone(),
            thrift_transport: self.thrift_transport.clone(),
            thrift_protocol_version: self.thrift_protocol_version,
            thrift_debug_client_protocol: self.thrift_debug_client_protocol,
        }
    }
}

/// Deep copy of an optional configuration; no configuration copies to none.
pub fn deep_copy(config: Option<&Config>) -> Option<Config> {
    config.map(Config::deep_copy)
}

/// Builder for driver configuration.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    user: Option<UserConfig>,
    tls: Option<Option<TlsConfig>>,
    run_async: Option<bool>,
    poll_interval: Option<Duration>,
    client_timeout: Option<Duration>,
    ping_timeout: Option<Duration>,
    can_use_multiple_catalogs: Option<bool>,
    protocol_version: Option<ProtocolVersion>,
    debug_protocol: Option<bool>,
}

impl ConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user configuration.
    pub fn user(mut self, user: UserConfig) -> Self {
        self.user = Some(user);
        self
    }

    /// Set the TLS policy.
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(Some(tls));
        self
    }

    /// Connect without TLS.
    pub fn without_tls(mut self) -> Self {
        self.tls = Some(None);
        self
    }

    /// Enable or disable async execution.
    pub fn run_async(mut self, enabled: bool) -> Self {
        self.run_async = Some(enabled);
        self
    }

    /// Set the poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set the HTTP request timeout.
    pub fn client_timeout(mut self, timeout: Duration) -> Self {
        self.client_timeout = Some(timeout);
        self
    }

    /// Set the ping timeout.
    pub fn ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = Some(timeout);
        self
    }

    /// Allow or forbid catalog switching.
    pub fn can_use_multiple_catalogs(mut self, enabled: bool) -> Self {
        self.can_use_multiple_catalogs = Some(enabled);
        self
    }

    /// Set the protocol version.
    pub fn protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.protocol_version = Some(version);
        self
    }

    /// Log every protocol call.
    pub fn debug_protocol(mut self, enabled: bool) -> Self {
        self.debug_protocol = Some(enabled);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Config {
        let mut config = Config::from_user(self.user.unwrap_or_default());

        if let Some(tls) = self.tls {
            config.tls = tls;
        }
        if let Some(enabled) = self.run_async {
            config.run_async = enabled;
        }
        if let Some(interval) = self.poll_interval {
            config.poll_interval = interval;
        }
        if let Some(timeout) = self.client_timeout {
            config.client_timeout = timeout;
        }
        if let Some(timeout) = self.ping_timeout {
            config.ping_timeout = timeout;
        }
        if let Some(enabled) = self.can_use_multiple_catalogs {
            config.can_use_multiple_catalogs = enabled;
        }
        if let Some(version) = self.protocol_version {
            config.thrift_protocol_version = version;
        }
        if let Some(enabled) = self.debug_protocol {
            config.thrift_debug_client_protocol = enabled;
        }

        config
    }
}
