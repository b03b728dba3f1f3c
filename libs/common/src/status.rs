//! Registration status derivation
//!
//! A session is `Ongoing` while `now` lies inside its registration window
//! (both ends inclusive) and `Closed` otherwise. The status is never stored;
//! callers recompute it whenever they display a session.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DateError;

/// Whether registration for a session is currently open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Ongoing,
    Closed,
}

impl RegistrationStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, RegistrationStatus::Ongoing)
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationStatus::Ongoing => f.write_str("Ongoing"),
            RegistrationStatus::Closed => f.write_str("Closed"),
        }
    }
}

/// Status for an already-parsed registration window
pub fn registration_status(
    now: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> RegistrationStatus {
    if start <= now && now <= end {
        RegistrationStatus::Ongoing
    } else {
        RegistrationStatus::Closed
    }
}

/// Status for a registration window as stored on the wire
pub fn try_registration_status(
    now: DateTime<Utc>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<RegistrationStatus, DateError> {
    let start = parse_date("registrationStart", start)?;
    let end = parse_date("registrationEnd", end)?;
    Ok(registration_status(now, start, end))
}

/// Parse a session date field
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM[:SS[.fff]]` values
/// and plain `YYYY-MM-DD` dates. Values without an offset are read as UTC and
/// plain dates as midnight UTC.
pub fn parse_date(field: &'static str, value: Option<&str>) -> Result<DateTime<Utc>, DateError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(DateError::Missing(field))?;

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DateError::Malformed {
            field,
            value: raw.to_string(),
        })
}
