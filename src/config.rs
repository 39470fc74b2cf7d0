use std::path::PathBuf;

use chrono_tz::Tz;

use crate::model::League;

/// Everything one feed-generation run needs to know.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub leagues: Vec<League>,
    /// How many days ahead of `now` the feed covers.
    pub days: u32,
    /// Display timezone for event descriptions.
    pub timezone: Tz,
    /// Sent as `x-api-key` on structured requests when present; its absence
    /// never blocks the markup path.
    pub api_key: Option<String>,
    pub output_path: PathBuf,
    /// Side-car state file; derived from `output_path` when unset.
    pub state_path: Option<PathBuf>,
    /// Turned off by `--no-api` to force markup parsing.
    pub prefer_structured: bool,
}

impl FeedConfig {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            leagues: League::defaults(),
            days: 30,
            timezone: chrono_tz::Europe::Berlin,
            api_key: None,
            output_path: output_path.into(),
            state_path: None,
            prefer_structured: true,
        }
    }

    /// Where history state lives: explicit path, or `<output>.state.json`.
    pub fn state_file(&self) -> PathBuf {
        self.state_path.clone().unwrap_or_else(|| {
            let mut os = self.output_path.clone().into_os_string();
            os.push(".state.json");
            PathBuf::from(os)
        })
    }
}
