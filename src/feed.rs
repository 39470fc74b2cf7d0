//! One feed-generation run, end to end.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::event_builder::build_events;
use crate::history::HistoryStore;
use crate::ical;
use crate::model::{CalendarEvent, Match};
use crate::normalize::normalize;
use crate::LolEsportsClient;

/// What a run did, for the caller's closing log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedSummary {
    pub leagues_ok: usize,
    pub leagues_failed: usize,
    pub records_skipped: usize,
    pub matches: usize,
    pub events: usize,
}

/// Fetch, normalize, merge and write the feed described by `config`.
///
/// Per-league and per-record failures degrade the output and are logged;
/// the run itself only fails when nothing at all can be produced, or when
/// the output cannot be written.
#[instrument(skip(client, config))]
pub async fn generate_feed(client: &LolEsportsClient, config: &FeedConfig) -> Result<FeedSummary> {
    let now = Utc::now();
    let state_path = config.state_file();

    let history = HistoryStore::load(&state_path).unwrap_or_else(|e| {
        warn!(error = %e, "starting from an empty history");
        HistoryStore::new()
    });

    let fetches = join_all(config.leagues.iter().map(|league| async move {
        let outcome = client
            .get_schedule(league, config.prefer_structured)
            .await;
        (league, outcome)
    }))
    .await;

    let mut summary = FeedSummary::default();
    let mut fresh = Vec::new();
    for (league, outcome) in fetches {
        match outcome {
            Ok(raw_records) => {
                summary.leagues_ok += 1;
                for raw in raw_records {
                    match normalize(raw, league) {
                        Ok(m) => fresh.push(m),
                        Err(e) => {
                            summary.records_skipped += 1;
                            warn!(league = %league, error = %e, "skipping unusable record");
                        }
                    }
                }
            }
            Err(e) => {
                summary.leagues_failed += 1;
                warn!(league = %league, error = %e, "league yields no matches this run");
            }
        }
    }

    if summary.leagues_ok == 0 && summary.leagues_failed > 0 && history.is_empty() {
        return Err(FeedError::NoData {
            leagues: summary.leagues_failed,
        });
    }

    let (feed, merged, events) = assemble(fresh, &history, config.days, config.timezone, now);
    summary.matches = merged.len();
    summary.events = events.len();

    ical::write_feed(&config.output_path, &feed)?;
    merged.save(&state_path)?;

    info!(
        matches = summary.matches,
        events = summary.events,
        leagues_ok = summary.leagues_ok,
        leagues_failed = summary.leagues_failed,
        out = %config.output_path.display(),
        "feed written"
    );
    Ok(summary)
}

/// The pure tail of the pipeline: merge, build, render. Split from the
/// network and filesystem so whole-run behavior is checkable with canned
/// records.
pub fn assemble(
    fresh: Vec<Match>,
    history: &HistoryStore,
    days: u32,
    tz: Tz,
    now: DateTime<Utc>,
) -> (String, HistoryStore, Vec<CalendarEvent>) {
    let merged = history.merge(fresh);
    let combined: Vec<Match> = merged.matches().cloned().collect();
    let events = build_events(&combined, days, tz, now);
    let feed = ical::render_ical(&events, now);
    (feed, merged, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{League, MatchStatus, RawMatch, RawSeries, RawTeam, StructuredEvent};
    use chrono_tz::Europe::Berlin;

    fn raw_scheduled() -> RawMatch {
        RawMatch::Structured(StructuredEvent {
            start_time: Some("2024-08-01T18:00:00Z".to_string()),
            state: Some("unstarted".to_string()),
            series: Some(RawSeries {
                id: Some("m1".to_string()),
                teams: Some(vec![
                    RawTeam {
                        name: Some("T1".to_string()),
                        ..Default::default()
                    },
                    RawTeam {
                        name: Some("T2".to_string()),
                        ..Default::default()
                    },
                ]),
                strategy: None,
            }),
            ..Default::default()
        })
    }

    #[test]
    fn scheduled_match_becomes_one_event() {
        let now: DateTime<Utc> = "2024-07-30T00:00:00Z".parse().unwrap();
        let m = normalize(raw_scheduled(), &League::Lec).unwrap();

        let (feed, merged, events) = assemble(vec![m], &HistoryStore::new(), 30, Berlin, now);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.title, "T1 vs T2 (LEC)");
        assert_eq!(event.start.unwrap().to_rfc3339(), "2024-08-01T18:00:00+00:00");
        // 18:00 UTC is 20:00 in Berlin in summer
        assert!(event.description.contains("Local time: 2024-08-01 20:00"));
        assert!(feed.contains("SUMMARY:T1 vs T2 (LEC)"));
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn completed_match_survives_disappearing_upstream() {
        let now: DateTime<Utc> = "2024-07-30T00:00:00Z".parse().unwrap();
        let m = normalize(raw_scheduled(), &League::Lec).unwrap();
        let (_, first_store, _) = assemble(vec![m], &HistoryStore::new(), 30, Berlin, now);

        // the match finishes 2-1 on a later run
        let mut finished = first_store.get("m1").unwrap().clone();
        finished.status = MatchStatus::Completed;
        finished.score_a = Some(2);
        finished.score_b = Some(1);
        let (_, second_store, _) = assemble(vec![finished], &first_store, 30, Berlin, now);

        // the next fetch no longer lists it at all
        let later: DateTime<Utc> = "2024-09-15T00:00:00Z".parse().unwrap();
        let (feed, third_store, events) = assemble(vec![], &second_store, 30, Berlin, later);

        assert_eq!(third_store.get("m1").unwrap().score_a, Some(2));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "T1 2 - 1 T2 (LEC) [FINAL]");
        let unfolded = feed.replace("\r\n ", "");
        assert!(unfolded.contains("SUMMARY:T1 2 - 1 T2 (LEC) [FINAL]"));
        assert!(unfolded.contains("Result: T1 2 - 1 T2"));
    }

    #[test]
    fn vanished_scheduled_match_leaves_the_feed() {
        let now: DateTime<Utc> = "2024-07-30T00:00:00Z".parse().unwrap();
        let m = normalize(raw_scheduled(), &League::Lec).unwrap();
        let (_, store, _) = assemble(vec![m], &HistoryStore::new(), 30, Berlin, now);

        let (_, next_store, events) = assemble(vec![], &store, 30, Berlin, now);
        assert!(next_store.is_empty());
        assert!(events.is_empty());
    }
}
