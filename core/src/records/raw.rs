use crate::prelude::{NavResult, NavigatorError};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Normalized row produced by the dataset preparer, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVisit {
    pub agent: String,
    pub client: String,
    pub date: String,
    pub time: String,
    pub latitude: f64,
    pub longitude: f64,
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

const TIME_FORMATS: [&str; 3] = ["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];

/// Parses `YYYY-MM-DD`, ignoring a trailing time part such as `2024-01-01 00:00:00`.
pub fn parse_date(text: &str) -> NavResult<NaiveDate> {
    let trimmed = text.trim();
    let day = trimmed
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|err| NavigatorError::InvalidRecord(format!("date {:?}: {}", text, err)))
}

/// Parses a time of day. A leading date part is skipped.
pub fn parse_time(text: &str) -> NavResult<NaiveTime> {
    let trimmed = text.trim();
    let clock = trimmed
        .rsplit(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(trimmed);
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(clock, format).ok())
        .ok_or_else(|| NavigatorError::InvalidRecord(format!("time of day {:?}", text)))
}
