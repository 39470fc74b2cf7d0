//! Projects the merged match set into the events the calendar will carry.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use itertools::Itertools;

use crate::model::{CalendarEvent, Match, MatchStatus};

/// Build the ordered event list for one run.
///
/// Kept: matches starting inside `[now, now + days]`, completed matches
/// regardless of window (history must not vanish with the upstream
/// schedule), and matches without a start time (surfaced, flagged in the
/// title, sorted last). Ordering is ascending by start time with the match
/// id as tie-break, so output bytes are stable.
pub fn build_events(matches: &[Match], days: u32, tz: Tz, now: DateTime<Utc>) -> Vec<CalendarEvent> {
    let horizon = now + Duration::days(i64::from(days));
    matches
        .iter()
        .filter(|m| included(m, now, horizon))
        .sorted_by(|a, b| compare(a, b))
        .map(|m| to_event(m, tz, now))
        .collect()
}

fn included(m: &Match, now: DateTime<Utc>, horizon: DateTime<Utc>) -> bool {
    if m.is_completed() {
        return true;
    }
    match m.start_time {
        Some(start) => start >= now && start <= horizon,
        None => true,
    }
}

fn compare(a: &Match, b: &Match) -> Ordering {
    match (a.start_time, b.start_time) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.match_id.cmp(&b.match_id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.match_id.cmp(&b.match_id),
    }
}

/// Matches without an explicit end get a duration by series format; actual
/// lengths vary too much to do better up front.
fn default_duration(best_of: Option<u8>) -> Duration {
    match best_of {
        Some(5) => Duration::hours(4),
        Some(3) => Duration::minutes(150),
        _ => Duration::minutes(90),
    }
}

fn to_event(m: &Match, tz: Tz, now: DateTime<Utc>) -> CalendarEvent {
    let start = m.start_time;
    let end = start.map(|s| s + default_duration(m.best_of));
    let start_local = start.map(|s| s.with_timezone(&tz));
    let all_day = start.is_none().then(|| now.with_timezone(&tz).date_naive());

    CalendarEvent {
        uid: format!("{}@lolesports", m.match_id),
        title: title(m),
        start,
        end,
        all_day,
        description: description(m, start_local),
        url: m.match_url.clone(),
    }
}

fn title(m: &Match) -> String {
    let league = m.league.display_name();
    match (m.status, m.score_a, m.score_b) {
        (MatchStatus::Completed, Some(a), Some(b)) => {
            format!("{} {a} - {b} {} ({league}) [FINAL]", m.team_a, m.team_b)
        }
        (MatchStatus::Completed, _, _) => {
            format!("{} vs {} ({league}) [FINAL]", m.team_a, m.team_b)
        }
        _ if m.start_time.is_none() => {
            format!("{} vs {} ({league}) [Time TBD]", m.team_a, m.team_b)
        }
        _ => format!("{} vs {} ({league})", m.team_a, m.team_b),
    }
}

fn description(m: &Match, start_local: Option<DateTime<Tz>>) -> String {
    let mut lines = vec![
        format!("League: {}", m.league.display_name()),
        format!("Match: {} vs {}", m.team_a, m.team_b),
    ];
    if let Some(stage) = &m.stage {
        lines.push(format!("Stage: {stage}"));
    }
    if let Some(best_of) = m.best_of {
        lines.push(format!("Format: Bo{best_of}"));
    }
    if let Some(local) = start_local {
        lines.push(format!("Local time: {}", local.format("%Y-%m-%d %H:%M %Z")));
    }
    match m.status {
        MatchStatus::Completed => {
            if let (Some(a), Some(b)) = (m.score_a, m.score_b) {
                lines.push(format!("Result: {} {a} - {b} {}", m.team_a, m.team_b));
                if let Some(winner) = winner(m) {
                    lines.push(format!("Winner: {winner}"));
                }
            }
        }
        MatchStatus::Live => lines.push("Status: LIVE".to_string()),
        _ => {}
    }
    lines.join("\n")
}

fn winner(m: &Match) -> Option<&str> {
    match (m.score_a?, m.score_b?) {
        (a, b) if a > b => Some(m.team_a.as_str()),
        (a, b) if b > a => Some(m.team_b.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{League, RawSource};
    use chrono_tz::Europe::Berlin;

    fn scheduled(id: &str, start: Option<&str>) -> Match {
        Match {
            match_id: id.to_string(),
            league: League::Lec,
            start_time: start.map(|s| s.parse().unwrap()),
            team_a: "G2 Esports".to_string(),
            team_b: "Fnatic".to_string(),
            status: MatchStatus::Scheduled,
            score_a: None,
            score_b: None,
            best_of: Some(3),
            stage: Some("Playoffs".to_string()),
            match_url: Some("https://lolesports.com/live/lec/113475".to_string()),
            raw_source: RawSource::Structured,
        }
    }

    fn now() -> DateTime<Utc> {
        "2026-03-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn unknown_start_sorts_last() {
        let matches = vec![
            scheduled("c", None),
            scheduled("b", Some("2026-03-08T17:00:00Z")),
            scheduled("a", Some("2026-03-07T17:00:00Z")),
        ];
        let events = build_events(&matches, 30, Berlin, now());
        let uids: Vec<&str> = events.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, ["a@lolesports", "b@lolesports", "c@lolesports"]);
        assert!(events[2].title.ends_with("[Time TBD]"));
        assert!(events[2].start.is_none());
        assert_eq!(events[2].all_day, Some("2026-03-01".parse().unwrap()));
    }

    #[test]
    fn window_filtering_keeps_completed_matches() {
        let mut done = scheduled("old", Some("2026-01-10T17:00:00Z"));
        done.status = MatchStatus::Completed;
        done.score_a = Some(2);
        done.score_b = Some(0);

        let matches = vec![
            done,
            scheduled("near", Some("2026-03-05T17:00:00Z")),
            scheduled("far", Some("2026-05-01T17:00:00Z")),
            scheduled("past", Some("2026-02-27T17:00:00Z")),
        ];
        let events = build_events(&matches, 30, Berlin, now());
        let uids: Vec<&str> = events.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, ["old@lolesports", "near@lolesports"]);
    }

    #[test]
    fn completed_title_carries_score_and_final_flag() {
        let mut m = scheduled("a", Some("2026-03-07T17:00:00Z"));
        m.status = MatchStatus::Completed;
        m.score_a = Some(2);
        m.score_b = Some(1);
        let events = build_events(&[m], 30, Berlin, now());
        assert_eq!(events[0].title, "G2 Esports 2 - 1 Fnatic (LEC) [FINAL]");
        assert!(events[0].description.contains("Result: G2 Esports 2 - 1 Fnatic"));
        assert!(events[0].description.contains("Winner: G2 Esports"));
    }

    #[test]
    fn scheduled_title_and_duration() {
        let events = build_events(&[scheduled("a", Some("2026-03-07T17:00:00Z"))], 30, Berlin, now());
        let event = &events[0];
        assert_eq!(event.title, "G2 Esports vs Fnatic (LEC)");
        let (start, end) = (event.start.unwrap(), event.end.unwrap());
        assert_eq!(end - start, Duration::minutes(150));
        assert!(event.description.contains("Local time: 2026-03-07 18:00"));
    }

    #[test]
    fn bo5_runs_longer_than_bo1() {
        let mut bo5 = scheduled("a", Some("2026-03-07T17:00:00Z"));
        bo5.best_of = Some(5);
        let mut bo1 = scheduled("b", Some("2026-03-07T17:00:00Z"));
        bo1.best_of = Some(1);
        let events = build_events(&[bo5, bo1], 30, Berlin, now());
        assert_eq!(events[0].end.unwrap() - events[0].start.unwrap(), Duration::hours(4));
        assert_eq!(events[1].end.unwrap() - events[1].start.unwrap(), Duration::minutes(90));
    }
}
