//! # dbsql
//!
//! Client-side connection configuration for a remote SQL service.
//!
//! dbsql provides:
//! - Connection strings (DSNs) parsed into typed configuration
//! - Programmatic builders with the same defaults
//! - Endpoint URLs that never carry credentials
//!
//! ## Quick Start
//!
//! ```rust
//! use dbsql::prelude::*;
//!
//! let config = Config::from_dsn("token:dapi123@example.cloud.com:443/sql/1.0?maxRows=500")?;
//! assert_eq!(config.user.max_rows, 500);
//! assert_eq!(config.endpoint_url(), "https://example.cloud.com:443/sql/1.0");
//! # Ok::<(), dbsql::ConfigError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Configuration types, DSN parsing and defaults.
pub mod config {
    pub use dbsql_config::*;
}

/// Logging bootstrap.
pub use dbsql_config::logging;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use dbsql_config::prelude::*;
}

// Re-export key types at the crate root
pub use dbsql_config::{Config, ConfigError, ConfigResult, UserConfig, parse_dsn};
