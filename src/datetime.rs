//! Date handling shared by the request DTOs.
//!
//! Clients send either full RFC 3339 timestamps, offset-less local
//! timestamps (`2025-06-01T14:00:00`) or bare dates (`2025-06-01`). All of
//! them are accepted and normalised to UTC.

use serde::{Deserialize, Deserializer};
use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
};

const DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const LOCAL: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const LOCAL_FRACTION: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");

pub fn parse_lenient(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt.to_offset(UtcOffset::UTC));
    }
    for fmt in [LOCAL_FRACTION, LOCAL] {
        if let Ok(dt) = PrimitiveDateTime::parse(raw, fmt) {
            return Some(dt.assume_utc());
        }
    }
    parse_date(raw).map(|d| d.midnight().assume_utc())
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), DATE).ok()
}

/// `yyyy-MM-dd`, the format Open-Meteo and the prediction service expect.
pub fn format_date(d: Date) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
}

pub mod lenient {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_lenient(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date or datetime: {raw}")))
    }
}

pub mod lenient_option {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_lenient(&raw).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid date or datetime: {raw}"))
            }),
        }
    }
}
