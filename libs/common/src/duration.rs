//! Free-text session durations
//!
//! Tutors type durations such as "2 hours" or "3 weeks". The text is kept as
//! is on the wire; [`SessionDuration`] is a parsed view used for display and
//! statistics when the text is recognisable.

use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Unit of a parsed session duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl DurationUnit {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            // A bare number is read as hours
            "" | "h" | "hr" | "hrs" | "hour" | "hours" => Some(DurationUnit::Hours),
            "m" | "min" | "mins" | "minute" | "minutes" => Some(DurationUnit::Minutes),
            "d" | "day" | "days" => Some(DurationUnit::Days),
            "w" | "wk" | "wks" | "week" | "weeks" => Some(DurationUnit::Weeks),
            "mo" | "month" | "months" => Some(DurationUnit::Months),
            _ => None,
        }
    }

    fn singular(&self) -> &'static str {
        match self {
            DurationUnit::Minutes => "minute",
            DurationUnit::Hours => "hour",
            DurationUnit::Days => "day",
            DurationUnit::Weeks => "week",
            DurationUnit::Months => "month",
        }
    }

    /// Length of one unit in minutes; a month counts as 30 days
    fn minutes(&self) -> f64 {
        match self {
            DurationUnit::Minutes => 1.0,
            DurationUnit::Hours => 60.0,
            DurationUnit::Days => 60.0 * 24.0,
            DurationUnit::Weeks => 60.0 * 24.0 * 7.0,
            DurationUnit::Months => 60.0 * 24.0 * 30.0,
        }
    }
}

/// Numeric amount plus unit parsed from a duration string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionDuration {
    pub amount: f64,
    pub unit: DurationUnit,
}

impl SessionDuration {
    pub fn as_minutes(&self) -> f64 {
        self.amount * self.unit.minutes()
    }

    pub fn as_hours(&self) -> f64 {
        self.as_minutes() / 60.0
    }
}

impl FromStr for SessionDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static DURATION_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = DURATION_REGEX.get_or_init(|| {
            Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*([A-Za-z]*)\.?\s*$")
                .expect("Failed to compile duration regex")
        });

        let captures = regex
            .captures(s)
            .ok_or_else(|| format!("unrecognised duration: {s:?}"))?;
        let amount: f64 = captures[1]
            .parse()
            .map_err(|_| format!("unrecognised duration: {s:?}"))?;
        let unit = DurationUnit::from_label(&captures[2].to_ascii_lowercase())
            .ok_or_else(|| format!("unknown duration unit in {s:?}"))?;

        Ok(Self { amount, unit })
    }
}

impl fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.amount == 1.0 { "" } else { "s" };
        write!(f, "{} {}{}", self.amount, self.unit.singular(), plural)
    }
}

/// Accept either a JSON string or a JSON number for free-text fields
pub(crate) fn deserialize_free_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Num(serde_json::Number),
        Null(()),
    }

    Ok(match Text::deserialize(deserializer)? {
        Text::Str(s) => s,
        Text::Num(n) => n.to_string(),
        Text::Null(()) => String::new(),
    })
}
