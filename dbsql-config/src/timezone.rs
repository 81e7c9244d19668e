//! Named session timezone.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::{ConfigError, ConfigResult, DSN_STAGE};

/// A named timezone, re-derivable from its canonical name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone {
    tz: Tz,
}

impl Timezone {
    /// UTC.
    pub const UTC: Self = Self { tz: Tz::UTC };

    /// Resolve an IANA timezone identifier.
    ///
    /// An empty name and `"UTC"` both resolve to UTC. `"Local"` is rejected:
    /// the session timezone is sent to the server, so it must be a name the
    /// server can resolve independently of the client host.
    pub fn resolve(name: &str) -> ConfigResult<Self> {
        Self::resolve_in(DSN_STAGE, name)
    }

    pub(crate) fn resolve_in(stage: &'static str, name: &str) -> ConfigResult<Self> {
        if name.is_empty() || name == "UTC" {
            return Ok(Self::UTC);
        }
        name.parse::<Tz>()
            .map(|tz| Self { tz })
            .map_err(|_| ConfigError::timezone(stage, name))
    }

    /// Canonical name of this timezone.
    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// The resolved timezone rules.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Resolve a fresh instance from the canonical name.
    pub fn reload(&self, stage: &'static str) -> ConfigResult<Self> {
        Self::resolve_in(stage, self.name())
    }

    /// Convert an instant into this timezone.
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::COPY_STAGE;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_resolve_named() {
        let tz = Timezone::resolve("America/New_York").unwrap();
        assert_eq!(tz.name(), "America/New_York");
        assert_eq!(tz.to_string(), "America/New_York");
    }

    #[test]
    fn test_resolve_utc_aliases() {
        assert_eq!(Timezone::resolve("").unwrap(), Timezone::UTC);
        assert_eq!(Timezone::resolve("UTC").unwrap(), Timezone::UTC);
    }

    #[test]
    fn test_resolve_unknown() {
        let err = Timezone::resolve("Not/AZone").unwrap_err();
        assert!(err.is_timezone());
    }

    #[test]
    fn test_resolve_local_rejected() {
        let err = Timezone::resolve("Local").unwrap_err();
        assert!(err.is_timezone());
        assert_eq!(err.to_string(), "invalid DSN: unknown time zone 'Local'");
    }

    #[test]
    fn test_reload_matches_source() {
        let tz = Timezone::resolve("Asia/Tokyo").unwrap();
        assert_eq!(tz.reload(COPY_STAGE).unwrap(), tz);
    }

    #[test]
    fn test_localize() {
        let tz = Timezone::resolve("Asia/Tokyo").unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(tz.localize(instant).hour(), 9);
    }
}
