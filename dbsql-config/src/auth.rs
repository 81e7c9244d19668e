//! Authenticators that attach credentials to outbound requests.
//!
//! The transport layer calls [`Authenticator::authenticate`] once per request
//! with the headers it is about to send. Configurations hold authenticators
//! behind an `Arc` and never mutate them, so copies of a configuration can
//! share one instance.

use std::collections::HashMap;
use std::fmt;

use crate::error::{ConfigError, ConfigResult};

/// Outbound request headers.
pub type Headers = HashMap<String, String>;

/// Header carrying the credential material.
pub const AUTHORIZATION: &str = "Authorization";

/// Produces credential material for a request.
pub trait Authenticator: fmt::Debug + Send + Sync {
    /// Short name of the mechanism, for diagnostics.
    fn name(&self) -> &'static str;

    /// Add credentials to the outgoing request headers.
    fn authenticate(&self, headers: &mut Headers) -> ConfigResult<()>;
}

/// Authenticator that sends no credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopAuth;

impl Authenticator for NoopAuth {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn authenticate(&self, _headers: &mut Headers) -> ConfigResult<()> {
        Ok(())
    }
}

/// Personal access token authenticator.
#[derive(Clone, PartialEq, Eq)]
pub struct PatAuth {
    access_token: String,
}

impl PatAuth {
    /// Create a token authenticator.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// The token sent with each request.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for PatAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatAuth")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl Authenticator for PatAuth {
    fn name(&self) -> &'static str {
        "pat"
    }

    fn authenticate(&self, headers: &mut Headers) -> ConfigResult<()> {
        if self.access_token.is_empty() {
            return Err(ConfigError::auth_format("empty token"));
        }
        headers.insert(
            AUTHORIZATION.to_string(),
            format!("Bearer {}", self.access_token),
        );
        Ok(())
    }
}
