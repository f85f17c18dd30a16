use chrono::{DateTime, FixedOffset, Local, Timelike};

/// Wall-clock instant with the local offset it was taken in
pub type Timestamp = DateTime<FixedOffset>;

/// Current local time, truncated to whole seconds
pub fn now() -> Timestamp {
    let local = Local::now();
    local.with_nanosecond(0).unwrap_or(local).fixed_offset()
}

/// Parse an RFC 3339 timestamp, `None` for blank or malformed input
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value).ok()
}

/// Local wall-clock rendering used in tables and work notes
pub fn display_time(ts: &Timestamp) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Like [`display_time`], with `-` for a missing value
pub fn display_optional(ts: Option<&Timestamp>) -> String {
    ts.map(display_time).unwrap_or_else(|| "-".to_string())
}

/// Serde adapter for optional timestamps stored as `""` when absent
pub mod optional {
    use super::{parse_timestamp, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }
}
