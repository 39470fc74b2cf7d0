//! Fallback acquisition path: the rendered schedule page.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::FetchError;
use crate::model::{League, MarkupMatch, RawMatch, StructuredEvent};
use crate::normalize::parse_instant;
use crate::source;

const PAGE_BASE: &str = "https://lolesports.com";
/// How far up from a `<time>` element a match card may sit.
const MAX_ANCESTOR_DEPTH: usize = 12;

const STAGE_LABELS: [&str; 7] = [
    "playoffs",
    "swiss",
    "groups",
    "group stage",
    "final",
    "semifinal",
    "quarterfinal",
];

#[instrument(skip(client), fields(league = %league))]
pub(crate) async fn fetch(
    client: &reqwest::Client,
    league: &League,
) -> Result<Vec<RawMatch>, FetchError> {
    let url = format!("{PAGE_BASE}/schedule?leagues={league}");
    let body = source::get_text(client, &url, None).await?;
    let records = parse_schedule_page(&body, league)?;
    debug!(count = records.len(), "markup schedule extracted");
    Ok(records)
}

/// Parse the schedule page. Server-rendered structured payloads are
/// preferred when the page embeds them; otherwise match cards are
/// reassembled around `<time datetime>` elements.
pub(crate) fn parse_schedule_page(html: &str, league: &League) -> Result<Vec<RawMatch>, FetchError> {
    let embedded = parse_embedded_payloads(html, league);
    if !embedded.is_empty() {
        return Ok(embedded.into_iter().map(RawMatch::Structured).collect());
    }
    let cards = parse_time_elements(html, league)?;
    Ok(cards.into_iter().map(RawMatch::Markup).collect())
}

/// Extract `(window[Symbol.for("ApolloSSRDataTransport")] ??= []).push({...})`
/// payloads from the page's script blocks. The pushed argument is
/// almost-JSON: bare `undefined` tokens have to be rewritten to `null`
/// before decoding.
fn parse_embedded_payloads(html: &str, league: &League) -> Vec<StructuredEvent> {
    let Ok(push_re) = Regex::new(r"ApolloSSRDataTransport[\s\S]{0,2000}?\.push\(") else {
        return Vec::new();
    };
    let Ok(undefined_re) = Regex::new(r"\bundefined\b") else {
        return Vec::new();
    };

    let league_slug = league.to_string();
    let mut events = Vec::new();
    for found in push_re.find_iter(html) {
        let start = found.end();
        let Some(script_end) = html[start..].find("</script>").map(|i| start + i) else {
            continue;
        };
        let Some(close) = html[start..script_end].rfind(')').map(|i| start + i) else {
            continue;
        };
        let normalized = undefined_re.replace_all(&html[start..close], "null");
        let Ok(payload) = serde_json::from_str::<Value>(&normalized) else {
            warn!("skipping undecodable embedded schedule payload");
            continue;
        };
        collect_event_matches(&payload, &league_slug, &mut events);
    }
    events
}

/// Depth-first walk for `__typename == "EventMatch"` objects belonging to
/// the requested league.
fn collect_event_matches(value: &Value, league_slug: &str, out: &mut Vec<StructuredEvent>) {
    match value {
        Value::Object(map) => {
            if map.get("__typename").and_then(Value::as_str) == Some("EventMatch")
                && value.pointer("/league/slug").and_then(Value::as_str) == Some(league_slug)
            {
                if let Ok(event) = serde_json::from_value::<StructuredEvent>(value.clone()) {
                    out.push(event);
                }
            }
            for nested in map.values() {
                collect_event_matches(nested, league_slug, out);
            }
        }
        Value::Array(items) => {
            for nested in items {
                collect_event_matches(nested, league_slug, out);
            }
        }
        _ => {}
    }
}

fn parse_time_elements(html: &str, league: &League) -> Result<Vec<MarkupMatch>, FetchError> {
    let document = Html::parse_document(html);
    let time_selector = Selector::parse("time[datetime]")?;
    let team_selector = Selector::parse(".teams .team, .team")?;
    let link_selector = Selector::parse("a[href]")?;
    let league_href = format!("/leagues/{league}");

    let mut cards = Vec::new();
    for time_el in document.select(&time_selector) {
        let Some(raw) = time_el.value().attr("datetime") else {
            continue;
        };
        let Some(start_time) = parse_instant(raw) else {
            warn!(raw, "skipping time element with unparseable datetime");
            continue;
        };
        let Some(card) = find_card(&time_el, &link_selector, &team_selector, &league_href) else {
            continue;
        };
        cards.push(parse_card(&card, &team_selector, &link_selector, start_time));
    }
    Ok(cards)
}

/// Walk up from the `<time>` element to the nearest container that looks
/// like a match card: it links to some league and mentions two teams. The
/// card only counts when that nearest container links the requested league;
/// stopping there keeps a card from binding to a sibling league's time
/// element through a shared ancestor.
fn find_card<'a>(
    time_el: &ElementRef<'a>,
    link_selector: &Selector,
    team_selector: &Selector,
    league_href: &str,
) -> Option<ElementRef<'a>> {
    let card = time_el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(MAX_ANCESTOR_DEPTH)
        .find(|el| {
            let has_league_link = el
                .select(link_selector)
                .any(|a| a.value().attr("href").is_some_and(|h| h.contains("/leagues/")));
            if !has_league_link {
                return false;
            }
            el.select(team_selector).next().is_some()
                || card_text(el).to_lowercase().contains(" vs ")
        })?;

    card.select(link_selector)
        .any(|a| a.value().attr("href").is_some_and(|h| h.contains(league_href)))
        .then_some(card)
}

fn parse_card(
    card: &ElementRef,
    team_selector: &Selector,
    link_selector: &Selector,
    start_time: DateTime<Utc>,
) -> MarkupMatch {
    let team_texts: Vec<String> = card
        .select(team_selector)
        .map(|el| card_text(&el))
        .filter(|t| !t.is_empty())
        .collect();
    let (team_a, team_b) = if team_texts.len() >= 2 {
        (Some(team_texts[0].clone()), Some(team_texts[1].clone()))
    } else {
        teams_around_vs(card)
    };

    let text = card_text(card);
    let best_of = if text.contains("Bo5") {
        Some(5)
    } else if text.contains("Bo3") {
        Some(3)
    } else if text.contains("Bo1") {
        Some(1)
    } else {
        None
    };

    let stage = card
        .text()
        .map(str::trim)
        .find(|t| STAGE_LABELS.contains(&t.to_lowercase().as_str()))
        .map(|t| t.to_string());

    let match_url = card.select(link_selector).find_map(|a| {
        let href = a.value().attr("href")?;
        if href.contains("/match/") || href.contains("/matches/") || href.contains("/live/") {
            Some(if href.starts_with("http") {
                href.to_string()
            } else {
                format!("{PAGE_BASE}{href}")
            })
        } else {
            None
        }
    });

    MarkupMatch {
        start_time,
        team_a,
        team_b,
        best_of,
        stage,
        match_url,
    }
}

/// Cards without explicit team elements usually still read "A vs B".
fn teams_around_vs(card: &ElementRef) -> (Option<String>, Option<String>) {
    let tokens: Vec<String> = card
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect();
    let Some(idx) = tokens.iter().position(|t| {
        let t = t.to_lowercase();
        t == "vs" || t == "v"
    }) else {
        return (None, None);
    };
    let team_a = idx.checked_sub(1).and_then(|i| tokens.get(i)).cloned();
    let team_b = tokens.get(idx + 1).cloned();
    (team_a, team_b)
}

fn card_text(el: &ElementRef) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD_FIXTURE: &str = r#"<html><body>
      <section class="schedule">
        <article class="match-card">
          <a href="/leagues/lec">LEC</a>
          <time datetime="2026-03-07T17:00:00Z">18:00</time>
          <div class="teams">
            <div class="team">G2 Esports</div>
            <div class="team">Fnatic</div>
          </div>
          <span>Playoffs</span>
          <span>Bo3</span>
          <a href="/live/lec/113475">watch</a>
        </article>
        <article class="match-card">
          <a href="/leagues/lck">LCK</a>
          <time datetime="2026-03-08T08:00:00Z">17:00</time>
          <div class="teams">
            <div class="team">T1</div>
            <div class="team">Gen.G</div>
          </div>
        </article>
      </section>
    </body></html>"#;

    #[test]
    fn extracts_cards_for_the_requested_league() {
        let records = parse_schedule_page(CARD_FIXTURE, &League::Lec).unwrap();
        assert_eq!(records.len(), 1);
        let RawMatch::Markup(card) = &records[0] else {
            panic!("expected a markup record");
        };
        assert_eq!(card.team_a.as_deref(), Some("G2 Esports"));
        assert_eq!(card.team_b.as_deref(), Some("Fnatic"));
        assert_eq!(card.best_of, Some(3));
        assert_eq!(card.stage.as_deref(), Some("Playoffs"));
        assert_eq!(
            card.match_url.as_deref(),
            Some("https://lolesports.com/live/lec/113475")
        );
        assert_eq!(card.start_time.to_rfc3339(), "2026-03-07T17:00:00+00:00");
    }

    #[test]
    fn falls_back_to_vs_tokens_without_team_elements() {
        let html = r#"<div>
          <a href="/leagues/lec">LEC</a>
          <time datetime="2026-03-07T17:00:00Z"></time>
          <span>G2 Esports</span> <span>vs</span> <span>Fnatic</span>
        </div>"#;
        let records = parse_schedule_page(html, &League::Lec).unwrap();
        assert_eq!(records.len(), 1);
        let RawMatch::Markup(card) = &records[0] else {
            panic!("expected a markup record");
        };
        assert_eq!(card.team_a.as_deref(), Some("G2 Esports"));
        assert_eq!(card.team_b.as_deref(), Some("Fnatic"));
    }

    #[test]
    fn unparseable_datetime_is_skipped() {
        let html = r#"<div>
          <a href="/leagues/lec">LEC</a>
          <time datetime="soon"></time>
          <div class="team">G2 Esports</div>
          <div class="team">Fnatic</div>
        </div>"#;
        let records = parse_schedule_page(html, &League::Lec).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn embedded_payload_wins_over_card_extraction() {
        let html = r#"<html><head><script>
          (window[Symbol.for("ApolloSSRDataTransport")] ??= []).push({"data":{"results":[
            {"__typename":"EventMatch",
             "league":{"slug":"lec","name":"LEC"},
             "startTime":"2026-03-07T17:00:00Z",
             "state":"unstarted",
             "blockName":"Playoffs",
             "matchTeams":[{"name":"Team One","code":"ONE","result":undefined},
                           {"name":"Team Two","code":"TWO","result":undefined}],
             "match":{"id":"111","strategy":{"count":3}}}
          ]}})</script></head>
          <body>
            <a href="/leagues/lec">LEC</a>
            <time datetime="2026-03-08T17:00:00Z"></time>
            <div class="team">Ignored</div>
            <div class="team">Cards</div>
          </body></html>"#;
        let records = parse_schedule_page(html, &League::Lec).unwrap();
        assert_eq!(records.len(), 1);
        let RawMatch::Structured(event) = &records[0] else {
            panic!("expected a structured record");
        };
        assert_eq!(event.start_time.as_deref(), Some("2026-03-07T17:00:00Z"));
        assert_eq!(event.teams().len(), 2);
        assert_eq!(event.teams()[0].name.as_deref(), Some("Team One"));
        assert_eq!(event.block_name.as_deref(), Some("Playoffs"));
    }

    #[test]
    fn embedded_payload_for_other_leagues_is_ignored() {
        let html = r#"<script>
          (window[Symbol.for("ApolloSSRDataTransport")] ??= []).push({"data":[
            {"__typename":"EventMatch","league":{"slug":"lck"},
             "startTime":"2026-03-08T08:00:00Z",
             "matchTeams":[{"name":"T1"},{"name":"Gen.G"}]}
          ]})</script>"#;
        let records = parse_schedule_page(html, &League::Lec).unwrap();
        assert!(records.is_empty());
    }
}
