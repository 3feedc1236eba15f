use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Numeric cells in the exports are not always clean numbers, e.g.,
///
/// ```text
/// "1,234.50"   -> Some(1234.5)
/// " 512 "      -> Some(512.0)
/// "-" or ""    -> None
/// ```
///
/// `de_opt_num` handles all of the above; anything else is an error.
pub fn de_opt_num<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Deserialize::deserialize(deserializer)?;
    match raw {
        Some(raw) => parse_num(&raw).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub fn parse_num(raw: &str) -> Result<Option<f64>, String> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.as_str() {
        "" | "-" => Ok(None),
        num => num
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("invalid number: {raw:?}")),
    }
}

/// Business dates come through as `2024-09-15`, `2024/09/15`, or with a
/// time attached (`2024-09-15T00:00:00`, `2024-09-15 00:00:00`,
/// `2024-09-15T00:00:00+05:45`). The whole cell has to match one of them.
pub fn de_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: String = Deserialize::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw:?}")))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|stamp| stamp.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|stamp| stamp.date_naive())
        })
}

pub fn de_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: String = Deserialize::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(serde::de::Error::custom("empty value"));
    }
    Ok(trimmed.to_string())
}
