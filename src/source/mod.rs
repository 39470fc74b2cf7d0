//! Schedule acquisition: an ordered list of strategies per league.

pub(crate) mod markup;
pub(crate) mod structured;

use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::error::FetchError;
use crate::model::{League, RawMatch};

pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36 lolesports-ical/0.2";
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(800);

/// The acquisition paths, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcquisitionPath {
    Structured,
    Markup,
}

/// Fetch raw schedule records for one league, walking the strategy list and
/// short-circuiting on the first path that yields records.
#[instrument(skip(client, api_key), fields(league = %league))]
pub(crate) async fn fetch_schedule(
    client: &reqwest::Client,
    api_key: Option<&str>,
    league: &League,
    prefer_structured: bool,
) -> Result<Vec<RawMatch>, FetchError> {
    let paths: &[AcquisitionPath] = if prefer_structured {
        &[AcquisitionPath::Structured, AcquisitionPath::Markup]
    } else {
        &[AcquisitionPath::Markup]
    };

    let mut reasons = Vec::new();
    for path in paths {
        let attempt = match path {
            AcquisitionPath::Structured => structured::fetch(client, api_key, league).await,
            AcquisitionPath::Markup => markup::fetch(client, league).await,
        };
        match attempt {
            Ok(records) if !records.is_empty() => {
                debug!(count = records.len(), ?path, "acquired raw schedule");
                return Ok(records);
            }
            Ok(_) => {
                warn!(?path, "acquisition path returned no records");
                reasons.push(format!("{path:?}: no records"));
            }
            Err(e) => {
                warn!(?path, error = %e, "acquisition path failed");
                reasons.push(format!("{path:?}: {e}"));
            }
        }
    }

    Err(FetchError::Exhausted {
        league: league.to_string(),
        reasons: reasons.join("; "),
    })
}

/// GET a URL as text, retrying transport errors, 429 and 5xx a bounded
/// number of times with exponential backoff.
pub(crate) async fn get_text(
    client: &reqwest::Client,
    url: &str,
    api_key: Option<&str>,
) -> Result<String, FetchError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let mut request = client.get(url);
        if let Some(key) = api_key {
            request = request.header("x-api-key", key);
        }
        let result = request.send().await;

        let retriable = match &result {
            Ok(response) => {
                let status = response.status();
                status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Err(_) => true,
        };
        if retriable && attempt < MAX_ATTEMPTS {
            let backoff = BASE_BACKOFF * 2u32.pow(attempt - 1);
            debug!(url, attempt, backoff_ms = backoff.as_millis() as u64, "retrying fetch");
            tokio::time::sleep(backoff).await;
            continue;
        }

        let response = result.map_err(|source| FetchError::Http {
            url: url.to_owned(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                url: url.to_owned(),
                status,
            });
        }
        return response.text().await.map_err(|source| FetchError::ResponseBody {
            url: url.to_owned(),
            source,
        });
    }
}
