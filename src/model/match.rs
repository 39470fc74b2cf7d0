use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

use crate::model::League;

/// Sentinel team name for a side that has not been determined yet.
pub const TBD: &str = "TBD";

/// Lifecycle state of a match as far as the feed is concerned.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Completed,
    #[default]
    Unknown,
}

/// Which acquisition path produced a record; kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RawSource {
    Structured,
    Markup,
}

/// The canonical, source-agnostic representation of one match (series).
///
/// `match_id` is stable across runs for the same real-world match: either
/// the upstream id, or a digest derived from the match-up itself. Scores are
/// never one-sided on a completed match; the normalizer enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub match_id: String,
    pub league: League,
    /// UTC instant; `None` when the upstream never published a time.
    pub start_time: Option<DateTime<Utc>>,
    pub team_a: String,
    pub team_b: String,
    pub status: MatchStatus,
    pub score_a: Option<u8>,
    pub score_b: Option<u8>,
    /// Series length (1, 3, 5) when known; drives the event duration.
    pub best_of: Option<u8>,
    pub stage: Option<String>,
    pub match_url: Option<String>,
    pub raw_source: RawSource,
}

impl Match {
    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }
}
