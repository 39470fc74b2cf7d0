//! Folds raw records from either acquisition path into canonical matches.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::error::NormalizationError;
use crate::model::{
    League, MarkupMatch, Match, MatchStatus, RawMatch, RawSource, RawTeam, StructuredEvent, TBD,
};
use crate::utils::sha256_hex;

/// Produce exactly one canonical match for `raw`, or fail for records with
/// no derivable identity at all.
pub fn normalize(raw: RawMatch, league: &League) -> Result<Match, NormalizationError> {
    match raw {
        RawMatch::Structured(event) => normalize_structured(event, league),
        RawMatch::Markup(card) => Ok(normalize_markup(card, league)),
    }
}

fn normalize_structured(
    event: StructuredEvent,
    league: &League,
) -> Result<Match, NormalizationError> {
    let start_time = event.start_time.as_deref().and_then(parse_instant);
    let upstream_id = event.series.as_ref().and_then(|s| s.id.clone());
    let teams = event.teams();

    if upstream_id.is_none() && teams.is_empty() && start_time.is_none() {
        return Err(NormalizationError::MissingIdentity);
    }

    let team_a = teams.first().map(team_name).unwrap_or_else(|| TBD.to_string());
    let team_b = teams.get(1).map(team_name).unwrap_or_else(|| TBD.to_string());

    let score_a = teams.first().and_then(|t| t.result.as_ref()).and_then(|r| r.game_wins);
    let score_b = teams.get(1).and_then(|t| t.result.as_ref()).and_then(|r| r.game_wins);

    let status = infer_status(event.state.as_deref(), score_a, score_b);
    let (score_a, score_b) = reconcile_scores(status, score_a, score_b);

    let best_of = event
        .series
        .as_ref()
        .and_then(|s| s.strategy.as_ref())
        .and_then(|s| s.count);
    let stage = event.block_name.clone().filter(|s| !s.trim().is_empty());

    let (match_id, match_url) = match upstream_id {
        Some(id) => {
            let url = format!("https://lolesports.com/live/{league}/{id}");
            (id, Some(url))
        }
        None => (
            derive_match_id(league, start_time, &team_a, &team_b),
            Some(format!("https://lolesports.com/schedule?leagues={league}")),
        ),
    };

    Ok(Match {
        match_id,
        league: league.clone(),
        start_time,
        team_a,
        team_b,
        status,
        score_a,
        score_b,
        best_of,
        stage,
        match_url,
        raw_source: RawSource::Structured,
    })
}

/// Markup cards carry no state or scores; everything they do carry is
/// best-effort.
fn normalize_markup(card: MarkupMatch, league: &League) -> Match {
    let team_a = clean_name(card.team_a);
    let team_b = clean_name(card.team_b);
    let match_id = derive_match_id(league, Some(card.start_time), &team_a, &team_b);

    Match {
        match_id,
        league: league.clone(),
        start_time: Some(card.start_time),
        team_a,
        team_b,
        status: MatchStatus::Scheduled,
        score_a: None,
        score_b: None,
        best_of: card.best_of,
        stage: card.stage,
        match_url: card.match_url,
        raw_source: RawSource::Markup,
    }
}

fn team_name(team: &RawTeam) -> String {
    team.name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .or(team.code.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty() && !n.eq_ignore_ascii_case(TBD))
        .unwrap_or(TBD)
        .to_string()
}

fn clean_name(name: Option<String>) -> String {
    name.as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(TBD)
        .to_string()
}

/// Explicit upstream state wins; otherwise a full score line implies a
/// finished match, and anything still ambiguous counts as scheduled.
fn infer_status(state: Option<&str>, score_a: Option<u8>, score_b: Option<u8>) -> MatchStatus {
    match state.map(str::trim) {
        Some("completed") => MatchStatus::Completed,
        Some("inProgress") => MatchStatus::Live,
        Some("unstarted") | Some("scheduled") => MatchStatus::Scheduled,
        _ => {
            if score_a.is_some() && score_b.is_some() {
                MatchStatus::Completed
            } else {
                MatchStatus::Scheduled
            }
        }
    }
}

/// A completed match never keeps a one-sided score line. Live matches may:
/// the upstream publishes game wins as they land.
fn reconcile_scores(
    status: MatchStatus,
    score_a: Option<u8>,
    score_b: Option<u8>,
) -> (Option<u8>, Option<u8>) {
    match status {
        MatchStatus::Completed => match (score_a, score_b) {
            (Some(a), Some(b)) => (Some(a), Some(b)),
            _ => (None, None),
        },
        MatchStatus::Live => (score_a, score_b),
        _ => (None, None),
    }
}

/// Parse an upstream timestamp; RFC 3339 first, then a bare date-time taken
/// as UTC. Anything else is an unknown start time, not an error.
pub(crate) fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc()))
}

/// Deterministic identity for records the upstream does not key, so that
/// repeated runs for the same unresolved match converge on the same id.
fn derive_match_id(
    league: &League,
    start: Option<DateTime<Utc>>,
    team_a: &str,
    team_b: &str,
) -> String {
    let start_iso = start
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();
    let base = format!("{league}|{start_iso}|{}|{}", team_a.trim(), team_b.trim());
    sha256_hex(&base)[..32].to_string()
}
