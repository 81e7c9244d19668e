//! Loading configuration from the environment.
//!
//! A deployment usually hands the client its endpoint as a DSN in
//! `DBSQL_DSN`. Because the DSN is often logged or stored alongside other
//! settings, the access token can be kept out of it and supplied separately
//! in `DBSQL_TOKEN`:
//!
//! ```text
//! DBSQL_DSN=example.cloud.com:443/sql/1.0/warehouses/abc?catalog=main
//! DBSQL_TOKEN=dapi0123456789
//! ```
//!
//! A token written in the DSN itself always wins over `DBSQL_TOKEN`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::auth::PatAuth;
use crate::error::{ConfigError, ConfigResult};
use crate::user::UserConfig;

/// Environment variable holding the DSN.
pub const DSN_ENV_VAR: &str = "DBSQL_DSN";

/// Environment variable holding an access token for a token-less DSN.
pub const TOKEN_ENV_VAR: &str = "DBSQL_TOKEN";

/// Where DSN and token variables are read from.
pub trait EnvSource: Send + Sync {
    /// Value of `name`, if set.
    fn get(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory variables, for tests and embedded setups.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl UserConfig {
    /// Parse the DSN held in `DBSQL_DSN`, taking the token from
    /// `DBSQL_TOKEN` when the DSN has none.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_env_source(&StdEnvSource, DSN_ENV_VAR)
    }

    /// Parse the DSN held in `var` of the given source, taking the token from
    /// `DBSQL_TOKEN` when the DSN has none.
    pub fn from_env_source<S: EnvSource>(source: &S, var: &str) -> ConfigResult<Self> {
        let dsn = source
            .get(var)
            .ok_or_else(|| ConfigError::EnvNotFound(var.to_string()))?;
        let mut config = Self::from_dsn(&dsn)?;

        if config.access_token.is_none() {
            if let Some(token) = source.get(TOKEN_ENV_VAR).filter(|t| !t.is_empty()) {
                debug!(var = TOKEN_ENV_VAR, "using access token from environment");
                config.authenticator = Some(Arc::new(PatAuth::new(token.clone())));
                config.access_token = Some(token);
            }
        }
        Ok(config)
    }
}
