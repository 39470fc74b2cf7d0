//! Primary acquisition path: the persisted schedule endpoint.

use tracing::{debug, instrument};

use crate::error::FetchError;
use crate::model::{League, RawMatch, SchedulePayload, StructuredEvent};
use crate::source;

const API_BASE: &str = "https://esports-api.lolesports.com/persisted/gw";
const LOCALE: &str = "en-US";

#[instrument(skip(client, api_key), fields(league = %league))]
pub(crate) async fn fetch(
    client: &reqwest::Client,
    api_key: Option<&str>,
    league: &League,
) -> Result<Vec<RawMatch>, FetchError> {
    let url = format!("{API_BASE}/getSchedule?hl={LOCALE}&leagueSlug={league}");
    let body = source::get_text(client, &url, api_key).await?;
    let events = parse_schedule(&body, &url)?;
    debug!(count = events.len(), "structured schedule decoded");
    Ok(events.into_iter().map(RawMatch::Structured).collect())
}

/// Decode the payload and keep the usable events.
///
/// What counts as malformed enough to hand over to the markup path (the
/// upstream never documents this, and its shape drifts): a body that does
/// not decode, a decoded body without `data.schedule.events`, or an event
/// list in which nothing carries both a teams array and a start time.
pub(crate) fn parse_schedule(body: &str, url: &str) -> Result<Vec<StructuredEvent>, FetchError> {
    let payload: SchedulePayload =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedPayload {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

    let events = payload
        .data
        .and_then(|d| d.schedule)
        .map(|s| s.events)
        .ok_or_else(|| FetchError::MalformedPayload {
            url: url.to_owned(),
            reason: "missing data.schedule.events".to_string(),
        })?;

    let usable: Vec<StructuredEvent> = events.into_iter().filter(is_usable).collect();
    if usable.is_empty() {
        return Err(FetchError::EmptySchedule {
            url: url.to_owned(),
        });
    }
    Ok(usable)
}

fn is_usable(event: &StructuredEvent) -> bool {
    !event.teams().is_empty() && event.start_time.is_some()
}
