use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::error::TypeError;

/// A point in time as written by the legacy repository.
///
/// Legacy serializations write zero-padded ISO-8601 instants, usually in UTC
/// with millisecond precision (`2008-07-02T05:09:43.234Z`). Some older
/// exports omit the zone designator; those are read as UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LegacyTimestamp(DateTime<Utc>);

impl LegacyTimestamp {
    /// Parse a legacy timestamp string.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }
        let naive = value.strip_suffix('Z').unwrap_or(value);
        NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|dt| Self(dt.and_utc()))
            .map_err(|_| TypeError::InvalidTimestamp(value.to_string()))
    }

    /// The current instant.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Milliseconds since the Unix epoch.
    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Canonical rendering: RFC 3339, millisecond precision, `Z` suffix.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for LegacyTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

/// Whether an object property carries a timestamp value.
///
/// The legacy format has exactly two such properties (`model#createdDate`
/// and `view#lastModifiedDate`); extension properties following the same
/// naming are treated alike.
pub fn is_timestamp_property(name: &str) -> bool {
    name.ends_with("#createdDate") || name.ends_with("#lastModifiedDate")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_utc_millis() {
        let ts = LegacyTimestamp::parse("2008-07-02T05:09:43.234Z").unwrap();
        assert_eq!(ts.epoch_millis(), 1_214_975_383_234);
        assert_eq!(ts.to_rfc3339(), "2008-07-02T05:09:43.234Z");
    }

    #[test]
    fn parses_without_fraction() {
        let ts = LegacyTimestamp::parse("2008-07-02T05:09:43Z").unwrap();
        assert_eq!(ts.epoch_millis(), 1_214_975_383_000);
    }

    #[test]
    fn parses_without_zone_as_utc() {
        let with_zone = LegacyTimestamp::parse("2008-07-02T05:09:43.234Z").unwrap();
        let without = LegacyTimestamp::parse("2008-07-02T05:09:43.234").unwrap();
        assert_eq!(with_zone, without);
    }

    #[test]
    fn parses_offsets() {
        let ts = LegacyTimestamp::parse("2008-07-02T07:09:43.234+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2008-07-02T05:09:43.234Z");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            LegacyTimestamp::parse("yesterday"),
            Err(TypeError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn timestamp_properties() {
        assert!(is_timestamp_property(
            "info:fedora/fedora-system:def/model#createdDate"
        ));
        assert!(is_timestamp_property(
            "info:fedora/fedora-system:def/view#lastModifiedDate"
        ));
        assert!(!is_timestamp_property(
            "info:fedora/fedora-system:def/model#label"
        ));
    }
}
