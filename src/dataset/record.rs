//! Rows of the historical transaction CSV

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::Deserialize;

pub const TIMESTAMP_COLUMN: &str = "trans_date_trans_time";
pub const DOB_COLUMN: &str = "dob";

/// Columns every dataset file must carry
pub const REQUIRED_COLUMNS: [&str; 7] = [
    TIMESTAMP_COLUMN,
    "category",
    "amt",
    "gender",
    "state",
    DOB_COLUMN,
    "is_fraud",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Row as read from the file; empty or unparseable numbers become `None`
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub trans_date_trans_time: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub amt: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub is_fraud: Option<u8>,
}

/// Complete historical transaction with its derived columns
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRecord {
    pub timestamp: NaiveDateTime,
    pub category: String,
    pub amt: f64,
    pub gender: String,
    pub state: String,
    pub dob: NaiveDate,
    pub is_fraud: bool,
    /// Hour of `timestamp`
    pub hour: u32,
    /// Whole years between `dob` and the reference date
    pub age: u32,
    /// Saturday or Sunday
    pub is_weekend: bool,
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(raw).map(|t| t.date()))
}

/// `floor(days / 365.25)`, `None` when `dob` is after `reference`
pub fn age_at(dob: NaiveDate, reference: NaiveDate) -> Option<u32> {
    let days = reference.signed_duration_since(dob).num_days();
    if days < 0 {
        return None;
    }
    Some((days as f64 / 365.25) as u32)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl RawTransaction {
    /// Complete record, or every required column whose value is missing or malformed
    pub fn into_record(self, reference: NaiveDate) -> Result<DatasetRecord, Vec<&'static str>> {
        let mut invalid = Vec::new();

        let timestamp = self.trans_date_trans_time.as_deref().and_then(parse_timestamp);
        if timestamp.is_none() {
            invalid.push(TIMESTAMP_COLUMN);
        }
        let category = non_empty(self.category);
        if category.is_none() {
            invalid.push("category");
        }
        let amt = self.amt.filter(|a| a.is_finite());
        if amt.is_none() {
            invalid.push("amt");
        }
        let gender = non_empty(self.gender);
        if gender.is_none() {
            invalid.push("gender");
        }
        let state = non_empty(self.state);
        if state.is_none() {
            invalid.push("state");
        }
        // a birth date after the reference date has no age
        let birth = self
            .dob
            .as_deref()
            .and_then(parse_date)
            .and_then(|dob| age_at(dob, reference).map(|age| (dob, age)));
        if birth.is_none() {
            invalid.push(DOB_COLUMN);
        }
        let is_fraud = match self.is_fraud {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        };
        if is_fraud.is_none() {
            invalid.push("is_fraud");
        }

        match (timestamp, category, amt, gender, state, birth, is_fraud) {
            (
                Some(timestamp),
                Some(category),
                Some(amt),
                Some(gender),
                Some(state),
                Some((dob, age)),
                Some(is_fraud),
            ) => Ok(DatasetRecord {
                hour: timestamp.hour(),
                age,
                is_weekend: matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun),
                timestamp,
                category,
                amt,
                gender,
                state,
                dob,
                is_fraud,
            }),
            _ => Err(invalid),
        }
    }
}
