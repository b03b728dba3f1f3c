//! Aggregations behind the public statistics page

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Announcement, Session, User};

/// One bar of the registration fee chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeBar {
    pub name: String,
    pub fee: f64,
    pub duration_hours: f64,
}

/// A labelled count for the pie charts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub name: String,
    pub value: usize,
}

/// Fee chart rows; titles are cut to 12 characters for the axis labels
pub fn fee_chart(sessions: &[Session]) -> Vec<FeeBar> {
    sessions
        .iter()
        .enumerate()
        .map(|(idx, session)| {
            let name = if session.title.is_empty() {
                format!("Session {}", idx + 1)
            } else {
                session.title.chars().take(12).collect()
            };
            FeeBar {
                name,
                fee: session.registration_fee,
                duration_hours: session
                    .parsed_duration()
                    .map(|d| d.as_hours())
                    .unwrap_or(0.0),
            }
        })
        .collect()
}

fn count_by<'a>(labels: impl Iterator<Item = Option<&'a str>>, fallback: &str) -> Vec<Slice> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for label in labels {
        let key = label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(fallback)
            .to_string();
        *counts.entry(key).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, value)| Slice { name, value })
        .collect()
}

/// Announcements per category
pub fn announcements_by_category(announcements: &[Announcement]) -> Vec<Slice> {
    count_by(
        announcements.iter().map(|a| a.category.as_deref()),
        "Uncategorized",
    )
}

/// Tutors per specialty
pub fn tutors_by_specialty(tutors: &[User]) -> Vec<Slice> {
    count_by(tutors.iter().map(|t| t.specialty.as_deref()), "Unknown")
}
