pub use config::FeedConfig;
pub use error::{
    FeedError, FetchError, MergeError, NormalizationError, Result, SerializationError,
};
pub use feed::{assemble, generate_feed, FeedSummary};
pub use history::HistoryStore;

pub mod config;
pub mod error;
pub mod event_builder;
pub mod feed;
pub mod history;
pub mod ical;
pub mod model;
pub mod normalize;
pub(crate) mod source;
pub(crate) mod utils;

use tracing::instrument;

use crate::model::{League, RawMatch};

/// The entry point for talking to lolesports.com.
///
/// Wraps a [`reqwest::Client`] (shared user agent, per-request timeout)
/// together with the optional structured-endpoint API key. Construct one
/// per run and pass it into the pipeline; nothing here outlives the run.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> Result<(), lolesports_ical::FetchError> {
/// use lolesports_ical::model::League;
/// use lolesports_ical::LolEsportsClient;
///
/// let client = LolEsportsClient::new(None);
/// let records = client.get_schedule(&League::Lec, true).await?;
/// println!("Fetched {} raw records", records.len());
/// # Ok(())
/// # }
/// ```
pub struct LolEsportsClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl LolEsportsClient {
    /// Create a new client with default settings.
    pub fn new(api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(source::USER_AGENT)
            .timeout(source::REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, api_key }
    }

    /// Create a new client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure timeouts, proxies, headers, etc.
    pub fn with_client(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http: client,
            api_key,
        }
    }

    /// Fetch raw schedule records for one league: the structured endpoint
    /// first (unless disabled), the rendered schedule page as fallback.
    #[instrument(skip(self))]
    pub async fn get_schedule(
        &self,
        league: &League,
        prefer_structured: bool,
    ) -> std::result::Result<Vec<RawMatch>, FetchError> {
        source::fetch_schedule(&self.http, self.api_key.as_deref(), league, prefer_structured).await
    }
}

impl Default for LolEsportsClient {
    fn default() -> Self {
        Self::new(None)
    }
}
