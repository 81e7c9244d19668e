//! TLS policy carried to the transport layer.

use std::path::PathBuf;

/// TLS protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TlsVersion {
    /// TLS 1.0
    Tls10,
    /// TLS 1.1
    Tls11,
    /// TLS 1.2
    Tls12,
    /// TLS 1.3
    Tls13,
}

impl TlsVersion {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "1.0" | "tls1.0" | "tlsv1" => Some(Self::Tls10),
            "1.1" | "tls1.1" | "tlsv1.1" => Some(Self::Tls11),
            "1.2" | "tls1.2" | "tlsv1.2" => Some(Self::Tls12),
            "1.3" | "tls1.3" | "tlsv1.3" => Some(Self::Tls13),
            _ => None,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tls10 => "1.0",
            Self::Tls11 => "1.1",
            Self::Tls12 => "1.2",
            Self::Tls13 => "1.3",
        }
    }
}

/// TLS policy. Opaque to this crate; the transport layer enforces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// Lowest protocol version accepted.
    pub min_version: TlsVersion,
    /// Highest protocol version offered, if capped.
    pub max_version: Option<TlsVersion>,
    /// Server name for SNI and certificate verification.
    pub server_name: Option<String>,
    /// Path to an additional CA certificate bundle.
    pub ca_cert_path: Option<PathBuf>,
    /// Skip server certificate verification.
    pub insecure_skip_verify: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            min_version: TlsVersion::Tls12,
            max_version: None,
            server_name: None,
            ca_cert_path: None,
            insecure_skip_verify: false,
        }
    }
}

impl TlsConfig {
    /// Create a policy with the default minimum version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum protocol version.
    pub fn with_min_version(mut self, version: TlsVersion) -> Self {
        self.min_version = version;
        self
    }

    /// Cap the protocol version.
    pub fn with_max_version(mut self, version: TlsVersion) -> Self {
        self.max_version = Some(version);
        self
    }

    /// Set the server name.
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// Set a CA certificate bundle path.
    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    /// Disable certificate verification. Never use against production servers.
    pub fn insecure(mut self) -> Self {
        self.insecure_skip_verify = true;
        self
    }

    /// Check whether `version` is allowed by this policy.
    pub fn allows(&self, version: TlsVersion) -> bool {
        version >= self.min_version && self.max_version.is_none_or(|max| version <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enforces_tls12() {
        let tls = TlsConfig::default();
        assert_eq!(tls.min_version, TlsVersion::Tls12);
        assert!(!tls.allows(TlsVersion::Tls11));
        assert!(tls.allows(TlsVersion::Tls12));
        assert!(tls.allows(TlsVersion::Tls13));
    }

    #[test]
    fn test_version_cap() {
        let tls = TlsConfig::new().with_max_version(TlsVersion::Tls12);
        assert!(!tls.allows(TlsVersion::Tls13));
    }

    #[test]
    fn test_version_from_str() {
        assert_eq!(TlsVersion::from_str("1.3"), Some(TlsVersion::Tls13));
        assert_eq!(TlsVersion::from_str("TLSv1.2"), Some(TlsVersion::Tls12));
        assert_eq!(TlsVersion::from_str("ssl3"), None);
        assert_eq!(TlsVersion::Tls11.as_str(), "1.1");
    }

    #[test]
    fn test_clone_is_independent() {
        let original = TlsConfig::new().with_server_name("a.example.com");
        let mut copy = original.clone();
        copy.server_name = Some("b.example.com".to_string());
        assert_eq!(original.server_name.as_deref(), Some("a.example.com"));
    }
}
