//! Timestamp wire format helpers.
//!
//! Stored timestamps are RFC 3339 UTC strings with millisecond precision and a
//! `Z` suffix, e.g. `2026-01-05T09:30:00.000Z`.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Truncates a timestamp to the precision kept by the wire format.
pub fn truncate_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

/// Formats one timestamp in wire format.
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses one RFC 3339 timestamp (any offset) into UTC.
pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value.trim()).map(|parsed| parsed.with_timezone(&Utc))
}

/// `serde(with = ...)` adapter for nullable timestamps.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&super::format(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            Some(text) if text.trim().is_empty() => Ok(None),
            Some(text) => super::parse(&text)
                .map(|parsed| Some(super::truncate_millis(parsed)))
                .map_err(|err| serde::de::Error::custom(format!("invalid timestamp `{text}`: {err}"))),
            None => Ok(None),
        }
    }
}
