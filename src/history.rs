//! Cross-run persistence of match state.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MergeError, SerializationError};
use crate::model::Match;

/// Last-known snapshot of every match the feed has published, keyed by
/// `match_id`. Ordered map, so feed output stays byte-stable across runs.
///
/// Read once at the start of a run, written once at the end; the merger is
/// the only writer in between.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStore {
    matches: BTreeMap<String, Match>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, match_id: &str) -> Option<&Match> {
        self.matches.get(match_id)
    }

    /// Read the side-car state file. A missing file is an empty store; an
    /// unreadable or undecodable one is a [`MergeError`] the caller recovers
    /// from by starting fresh.
    pub fn load(path: &Path) -> Result<Self, MergeError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let text = std::fs::read_to_string(path).map_err(|source| MergeError::ReadState {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| MergeError::CorruptState {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SerializationError> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|source| SerializationError::EncodeState { source })?;
        std::fs::write(path, text).map_err(|source| SerializationError::WriteState {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fold this run's freshly normalized matches into the store.
    ///
    /// Per `match_id`: fresh records supersede their previous snapshot;
    /// history-only entries survive when completed (the upstream window has
    /// moved past them) and are dropped as stale otherwise. Applying the
    /// same fresh set twice yields the same store.
    pub fn merge(&self, fresh: Vec<Match>) -> HistoryStore {
        let mut merged: BTreeMap<String, Match> = BTreeMap::new();
        for m in fresh {
            merged.insert(m.match_id.clone(), m);
        }

        let mut dropped = 0usize;
        for (id, old) in &self.matches {
            if merged.contains_key(id) {
                continue;
            }
            if old.is_completed() {
                merged.insert(id.clone(), old.clone());
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!(dropped, "dropped stale matches no longer listed upstream");
        }

        HistoryStore { matches: merged }
    }

    /// All matches in stable id order.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    pub fn into_matches(self) -> Vec<Match> {
        self.matches.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{League, MatchStatus, RawSource};

    fn sample(id: &str, status: MatchStatus) -> Match {
        Match {
            match_id: id.to_string(),
            league: League::Lec,
            start_time: Some("2026-03-07T17:00:00Z".parse().unwrap()),
            team_a: "G2 Esports".to_string(),
            team_b: "Fnatic".to_string(),
            status,
            score_a: (status == MatchStatus::Completed).then_some(2),
            score_b: (status == MatchStatus::Completed).then_some(1),
            best_of: Some(3),
            stage: None,
            match_url: None,
            raw_source: RawSource::Structured,
        }
    }

    fn store_of(matches: Vec<Match>) -> HistoryStore {
        HistoryStore::new().merge(matches)
    }

    #[test]
    fn merge_is_idempotent() {
        let history = store_of(vec![
            sample("a", MatchStatus::Completed),
            sample("b", MatchStatus::Scheduled),
        ]);
        let fresh = vec![sample("b", MatchStatus::Completed), sample("c", MatchStatus::Scheduled)];

        let once = history.merge(fresh.clone());
        let twice = once.merge(fresh);
        assert_eq!(once, twice);
    }

    #[test]
    fn completed_match_persists_after_dropping_out_of_window() {
        let history = store_of(vec![sample("a", MatchStatus::Completed)]);
        let merged = history.merge(vec![]);
        let kept = merged.get("a").expect("completed match retained");
        assert_eq!(kept.status, MatchStatus::Completed);
        assert_eq!((kept.score_a, kept.score_b), (Some(2), Some(1)));
    }

    #[test]
    fn stale_scheduled_match_is_dropped() {
        let history = store_of(vec![sample("a", MatchStatus::Scheduled)]);
        let merged = history.merge(vec![]);
        assert!(merged.is_empty());
    }

    #[test]
    fn fresh_record_supersedes_history() {
        let history = store_of(vec![sample("a", MatchStatus::Scheduled)]);
        let merged = history.merge(vec![sample("a", MatchStatus::Completed)]);
        assert_eq!(merged.get("a").unwrap().status, MatchStatus::Completed);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn missing_state_file_is_an_empty_store() {
        let store = HistoryStore::load(Path::new("/nonexistent/feed.ics.state.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_state_file_errors() {
        let path = std::env::temp_dir().join(format!("lolesports-ical-{}.state.json", std::process::id()));
        std::fs::write(&path, "{not json").unwrap();
        let result = HistoryStore::load(&path);
        assert!(matches!(result, Err(MergeError::CorruptState { .. })));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn state_round_trips_all_merge_fields() {
        let store = store_of(vec![sample("a", MatchStatus::Completed)]);
        let text = serde_json::to_string(&store).unwrap();
        let back: HistoryStore = serde_json::from_str(&text).unwrap();
        assert_eq!(store, back);
    }
}
