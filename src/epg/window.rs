use crate::error::{FilterError, RecordError};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Inclusive range of programme start times to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl DateWindow {
    /// From the start of `anchor - days_past` to the end of
    /// `anchor + days_future`.
    pub fn around(anchor: NaiveDate, days_past: u32, days_future: u32) -> Result<Self, FilterError> {
        let out_of_range = || FilterError::DateOutOfRange(anchor.to_string());
        let first_day = anchor
            .checked_sub_days(Days::new(days_past.into()))
            .ok_or_else(out_of_range)?;
        let last_day = anchor
            .checked_add_days(Days::new(days_future.into()))
            .ok_or_else(out_of_range)?;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).ok_or_else(out_of_range)?;

        Ok(DateWindow {
            start: first_day.and_time(NaiveTime::MIN),
            end: last_day.and_time(end_of_day),
        })
    }

    /// Builds the window from command-line style options.
    ///
    /// Returns `None` when none of the options is set, meaning every date
    /// passes. A missing day count is zero and a missing start is `today`.
    pub fn from_options(
        days_past: Option<u32>,
        days_future: Option<u32>,
        start: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Option<Self>, FilterError> {
        if days_past.is_none() && days_future.is_none() && start.is_none() {
            return Ok(None);
        }
        Self::around(
            start.unwrap_or(today),
            days_past.unwrap_or(0),
            days_future.unwrap_or(0),
        )
        .map(Some)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Parses an XMLTV timestamp (`YYYYMMDDHHMMSS [+-]ZZZZ`).
///
/// Seconds may be omitted. The offset is checked but not applied; the
/// wall-clock time is returned as written.
pub fn parse_xmltv_timestamp(value: &str) -> Result<NaiveDateTime, RecordError> {
    let bad = || RecordError::BadTimestamp(value.to_string());
    let trimmed = value.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, offset) = trimmed.split_at(digits_end);

    let format = match digits.len() {
        14 => "%Y%m%d%H%M%S",
        12 => "%Y%m%d%H%M",
        _ => return Err(bad()),
    };
    let timestamp = NaiveDateTime::parse_from_str(digits, format).map_err(|_| bad())?;

    let offset = offset.trim();
    if !offset.is_empty() && !is_utc_offset(offset) {
        return Err(bad());
    }

    Ok(timestamp)
}

fn is_utc_offset(offset: &str) -> bool {
    let bytes = offset.as_bytes();
    bytes.len() == 5
        && (bytes[0] == b'+' || bytes[0] == b'-')
        && bytes[1..].iter().all(u8::is_ascii_digit)
}
