//! Fuzz target for the DSN parser.
//!
//! Feeds arbitrary strings, and DSNs assembled from arbitrary parts, to the
//! parser. It must never panic and must never put the token in the endpoint.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_dsn_parser
//! ```

#![no_main]

use arbitrary::Arbitrary;
use dbsql_config::{Config, parse_dsn};
use libfuzzer_sys::fuzz_target;

/// A structured DSN for fuzzing.
#[derive(Debug, Arbitrary)]
struct FuzzDsn {
    scheme: Option<bool>,
    token: Option<String>,
    host: String,
    port: u16,
    path: String,
    params: Vec<(String, String)>,
}

impl FuzzDsn {
    fn to_dsn(&self) -> String {
        let mut dsn = String::new();
        match self.scheme {
            Some(true) => dsn.push_str("https://"),
            Some(false) => dsn.push_str("http://"),
            None => {}
        }
        if let Some(ref token) = self.token {
            dsn.push_str("token:");
            dsn.push_str(token);
            dsn.push('@');
        }
        dsn.push_str(&self.host);
        dsn.push(':');
        dsn.push_str(&self.port.to_string());
        dsn.push_str(&self.path);
        if !self.params.is_empty() {
            let query: Vec<String> = self
                .params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            dsn.push('?');
            dsn.push_str(&query.join("&"));
        }
        dsn
    }
}

fuzz_target!(|input: (&str, FuzzDsn)| {
    let (raw, structured) = input;

    // The parser should never panic, only return errors
    let _ = parse_dsn(raw);

    if let Ok(user) = parse_dsn(&structured.to_dsn()) {
        let token = user.access_token.clone();
        let path_has_at = user.http_path.contains('@');
        let endpoint = Config::from_user(user).endpoint_url();
        if let Some(token) = token {
            let authority = endpoint
                .split_once("://")
                .map_or(endpoint.as_str(), |(_, rest)| rest)
                .split('/')
                .next()
                .unwrap_or_default();
            assert!(!authority.contains('@'), "{endpoint}");
            assert!(!endpoint.contains(&format!("token:{token}@")), "{endpoint}");
            // only a path written with '@' may carry one
            assert!(path_has_at || !endpoint.contains('@'), "{endpoint}");
        }
    }
});
