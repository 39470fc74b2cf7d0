use chrono::{DateTime, NaiveDate, Utc};

/// A display-ready projection of one match.
///
/// Never persisted; the event builder regenerates these from the merged
/// match set on every run.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub uid: String,
    pub title: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Set instead of `start` for matches without a published time; rendered
    /// as an all-day event on the generation date.
    pub all_day: Option<NaiveDate>,
    pub description: String,
    pub url: Option<String>,
}
