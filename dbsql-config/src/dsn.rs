//! DSN parsing.
//!
//! A DSN has the form
//!
//! ```text
//! [http|https://][token:<accessToken>@]<host>:<port>[/<httpPath>][?<query>]
//! ```
//!
//! When the scheme is omitted, `https://` is assumed. The port must always
//! be written out. The only accepted credentials are a personal access token
//! passed as the password of the literal user `token`.
//!
//! # Query parameters
//!
//! | key | effect |
//! |---|---|
//! | `maxRows` | page size; zero or negative keeps the default |
//! | `timeout` | server-side query timeout, in seconds |
//! | `catalog` | default catalog |
//! | `schema` | default schema |
//! | `userAgentEntry` | user agent suffix |
//! | `timezone` (any case) | session timezone, must be a valid IANA name |
//! | anything else | forwarded verbatim as a session parameter |

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use tracing::debug;
use url::Url;

use crate::auth::PatAuth;
use crate::error::{ConfigError, ConfigResult};
use crate::timezone::Timezone;
use crate::user::UserConfig;

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// Username that marks the password as a personal access token.
pub const TOKEN_USER: &str = "token";

const MAX_ROWS: &str = "maxRows";
const TIMEOUT: &str = "timeout";
const CATALOG: &str = "catalog";
const SCHEMA: &str = "schema";
const USER_AGENT_ENTRY: &str = "userAgentEntry";
const TIMEZONE: &str = "timezone";

/// Parse a DSN into a defaulted [`UserConfig`].
///
/// # Examples
///
/// ```rust
/// use dbsql_config::parse_dsn;
///
/// let config = parse_dsn("token:dapi123@example.cloud.com:443/sql/1.0?catalog=main").unwrap();
/// assert_eq!(config.protocol, "https");
/// assert_eq!(config.host, "example.cloud.com");
/// assert_eq!(config.catalog.as_deref(), Some("main"));
/// ```
pub fn parse_dsn(dsn: &str) -> ConfigResult<UserConfig> {
    let full_dsn: Cow<'_, str> = if dsn.starts_with(HTTPS_PREFIX) || dsn.starts_with(HTTP_PREFIX) {
        Cow::Borrowed(dsn)
    } else {
        Cow::Owned(format!("{HTTPS_PREFIX}{dsn}"))
    };

    let parsed = Url::parse(&full_dsn).map_err(|e| match e {
        url::ParseError::InvalidPort => ConfigError::dsn_format("invalid DSN port"),
        other => ConfigError::dsn_format(format!("invalid format: {other}")),
    })?;

    let mut config = UserConfig::new().with_defaults();
    config.protocol = parsed.scheme().to_string();
    config.host = hostname(&full_dsn)?;
    config.port = explicit_port(&full_dsn)?;
    apply_credentials(&mut config, &parsed)?;
    config.http_path = http_path(&full_dsn);

    let mut params: IndexMap<String, String> = IndexMap::new();
    for (key, value) in parsed.query_pairs() {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }

    if let Some(value) = params.shift_remove(MAX_ROWS).filter(|v| !v.is_empty()) {
        let rows: i64 = value.parse().map_err(|source| ConfigError::ParamType {
            param: MAX_ROWS,
            source,
        })?;
        // keep some page size
        if rows > 0 {
            config.max_rows = usize::try_from(rows).unwrap_or(usize::MAX);
        }
    }

    if let Some(value) = params.shift_remove(TIMEOUT).filter(|v| !v.is_empty()) {
        let seconds: i64 = value.parse().map_err(|source| ConfigError::ParamType {
            param: TIMEOUT,
            source,
        })?;
        let seconds = u64::try_from(seconds).map_err(|_| ConfigError::ParamRange {
            param: TIMEOUT,
            value: seconds,
        })?;
        config.query_timeout = Duration::from_secs(seconds);
    }

    if let Some(catalog) = params.shift_remove(CATALOG) {
        config.catalog = Some(catalog);
    }
    if let Some(entry) = params.shift_remove(USER_AGENT_ENTRY) {
        config.user_agent_entry = Some(entry);
    }
    if let Some(schema) = params.shift_remove(SCHEMA) {
        config.schema = Some(schema);
    }

    // Reported after the rest of the DSN has been read.
    let mut timezone_error = None;
    if let Some(name) = params
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(TIMEZONE))
        .map(|(_, value)| value.clone())
    {
        match Timezone::resolve(&name) {
            Ok(tz) => config.location = Some(tz),
            Err(e) => timezone_error = Some(e),
        }
        params.retain(|key, _| !key.eq_ignore_ascii_case(TIMEZONE));
    }

    if !params.is_empty() {
        config.session_params = Some(params.into_iter().collect());
    }

    if let Some(e) = timezone_error {
        return Err(e);
    }

    debug!(
        protocol = %config.protocol,
        host = %config.host,
        port = config.port,
        http_path = %config.http_path,
        session_params = config.session_params.as_ref().map_or(0, |p| p.len()),
        "DSN parsed"
    );

    Ok(config)
}

/// Everything after `://`.
fn after_scheme(full_dsn: &str) -> &str {
    full_dsn
        .split_once("://")
        .map_or(full_dsn, |(_, rest)| rest)
}

/// Authority section of the raw DSN: everything between `://` and the path.
fn authority(full_dsn: &str) -> &str {
    after_scheme(full_dsn)
        .split(['/', '\\', '?', '#'])
        .next()
        .unwrap_or_default()
}

/// `host:port` part of the authority, without user-info.
fn host_port(full_dsn: &str) -> &str {
    let authority = authority(full_dsn);
    authority
        .rsplit_once('@')
        .map_or(authority, |(_, host_port)| host_port)
}

/// Host as written in the DSN. The URL library lowercases and IDNA-encodes
/// domains, so the raw authority is used instead. IPv6 hosts lose their brackets.
fn hostname(full_dsn: &str) -> ConfigResult<String> {
    let host_port = host_port(full_dsn);
    let host = match host_port.strip_prefix('[') {
        Some(bracketed) => bracketed.split_once(']').map(|(host, _)| host),
        None => Some(host_port.rsplit_once(':').map_or(host_port, |(host, _)| host)),
    };
    host.filter(|h| !h.is_empty())
        .map(decode)
        .ok_or_else(|| ConfigError::dsn_format("missing host"))
}

/// The URL library drops ports equal to the scheme default, so the port is
/// read from the raw authority to tell "443" apart from "no port".
fn explicit_port(full_dsn: &str) -> ConfigResult<u16> {
    let host_port = host_port(full_dsn);
    let port = match host_port.rsplit_once(']') {
        Some((_, after)) => after.strip_prefix(':'),
        None => host_port.rsplit_once(':').map(|(_, port)| port),
    };

    port.and_then(|p| p.parse::<u16>().ok())
        .filter(|p| *p != 0)
        .ok_or_else(|| ConfigError::dsn_format("invalid DSN port"))
}

fn apply_credentials(config: &mut UserConfig, parsed: &Url) -> ConfigResult<()> {
    let username = decode(parsed.username());
    if username == TOKEN_USER {
        let token = parsed.password().map(decode).unwrap_or_default();
        if token.is_empty() {
            return Err(ConfigError::auth_format("empty token"));
        }
        config.authenticator = Some(Arc::new(PatAuth::new(token.clone())));
        config.access_token = Some(token);
    } else if !username.is_empty() {
        return Err(ConfigError::auth_format("basic auth not enabled"));
    }
    Ok(())
}

/// Path as written in the DSN, percent-decoded. Dot segments are kept.
fn http_path(full_dsn: &str) -> String {
    let after_authority = &after_scheme(full_dsn)[authority(full_dsn).len()..];
    if !after_authority.starts_with(['/', '\\']) {
        return String::new();
    }
    let path = after_authority
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    decode(path)
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
