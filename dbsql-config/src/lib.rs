//! # dbsql-config
//!
//! Connection configuration for the dbsql client.
//!
//! This crate provides:
//! - DSN parsing into a [`UserConfig`]
//! - Default values for every optional setting
//! - Deep copies that share no mutable state with their source
//! - Derivation of the endpoint URL handed to the transport layer
//!
//! ## Example
//!
//! ```rust
//! use dbsql_config::{Config, UserConfig};
//!
//! let user = UserConfig::from_dsn(
//!     "token:dapi123@example.cloud.com:443/sql/1.0/warehouses/abc?catalog=main&ansi_mode=true",
//! )
//! .unwrap();
//! assert_eq!(user.session_param("ansi_mode"), Some("true"));
//!
//! let config = Config::from_user(user);
//! assert_eq!(
//!     config.endpoint_url(),
//!     "https://example.cloud.com:443/sql/1.0/warehouses/abc"
//! );
//! ```

pub mod auth;
pub mod config;
pub mod dsn;
pub mod env;
pub mod error;
pub mod logging;
pub mod timezone;
pub mod tls;
pub mod user;

pub use auth::{Authenticator, Headers, NoopAuth, PatAuth};
pub use config::{Config, ConfigBuilder, ProtocolVersion, deep_copy};
pub use dsn::parse_dsn;
pub use env::{EnvSource, MapEnvSource, StdEnvSource};
pub use error::{ConfigError, ConfigResult};
pub use timezone::Timezone;
pub use tls::{TlsConfig, TlsVersion};
pub use user::{UserConfig, UserConfigBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::auth::{Authenticator, NoopAuth, PatAuth};
    pub use crate::config::{Config, ConfigBuilder};
    pub use crate::dsn::parse_dsn;
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::user::{UserConfig, UserConfigBuilder};
}
