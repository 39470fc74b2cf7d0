use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One schedule record as acquired, before normalization.
///
/// Each variant has its own typed extraction path; the normalizer folds both
/// into the canonical [`Match`](crate::model::Match).
#[derive(Debug, Clone)]
pub enum RawMatch {
    /// From the structured endpoint or a page-embedded schedule payload.
    Structured(StructuredEvent),
    /// Reassembled from `<time datetime>` elements on the rendered page.
    Markup(MarkupMatch),
}

/// Top-level structured schedule payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchedulePayload {
    pub data: Option<ScheduleData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleData {
    pub schedule: Option<Schedule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub events: Vec<StructuredEvent>,
}

/// One schedule entry in the upstream's own camelCase shape.
///
/// Everything is optional; the payload drifts and the normalizer decides
/// what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredEvent {
    pub start_time: Option<String>,
    pub state: Option<String>,
    pub block_name: Option<String>,
    pub league: Option<RawLeague>,
    #[serde(rename = "match")]
    pub series: Option<RawSeries>,
    /// Page-embedded payloads put the teams on the event itself instead of
    /// under `match`.
    pub match_teams: Option<Vec<RawTeam>>,
}

impl StructuredEvent {
    /// Teams regardless of payload shape.
    pub fn teams(&self) -> &[RawTeam] {
        self.series
            .as_ref()
            .and_then(|s| s.teams.as_deref())
            .or(self.match_teams.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLeague {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSeries {
    pub id: Option<String>,
    pub teams: Option<Vec<RawTeam>>,
    pub strategy: Option<RawStrategy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTeam {
    pub name: Option<String>,
    pub code: Option<String>,
    pub result: Option<RawTeamResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTeamResult {
    pub game_wins: Option<u8>,
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStrategy {
    pub count: Option<u8>,
}

/// A match card assembled from the rendered schedule page. The start time
/// is mandatory here; the extractor skips elements without one.
#[derive(Debug, Clone)]
pub struct MarkupMatch {
    pub start_time: DateTime<Utc>,
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub best_of: Option<u8>,
    pub stage: Option<String>,
    pub match_url: Option<String>,
}
