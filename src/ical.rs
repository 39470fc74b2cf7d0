//! RFC 5545 rendering of the event list.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::SerializationError;
use crate::model::CalendarEvent;

const PRODID: &str = "-//lolesports-ical//EN";
const CALENDAR_NAME: &str = "LoL Esports";
/// RFC 5545 §3.1: content lines should not exceed 75 octets.
const FOLD_LIMIT: usize = 75;

/// Render the calendar. `now` feeds `DTSTAMP` and is passed in rather than
/// read from the clock, so the same events and the same instant produce the
/// same bytes.
pub fn render_ical(events: &[CalendarEvent], now: DateTime<Utc>) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        format!("PRODID:{}", escape(PRODID)),
        format!("X-WR-CALNAME:{CALENDAR_NAME}"),
    ];

    let stamp = format_utc(now);
    for event in events {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(fold(&format!("UID:{}", escape(&event.uid))));
        lines.push(format!("DTSTAMP:{stamp}"));
        match (event.start, event.all_day) {
            (Some(start), _) => {
                lines.push(format!("DTSTART:{}", format_utc(start)));
                if let Some(end) = event.end {
                    lines.push(format!("DTEND:{}", format_utc(end)));
                }
            }
            (None, Some(date)) => {
                lines.push(format!("DTSTART;VALUE=DATE:{}", date.format("%Y%m%d")));
            }
            (None, None) => lines.push(format!("DTSTART:{stamp}")),
        }
        lines.push(fold(&format!("SUMMARY:{}", escape(&event.title))));
        lines.push(fold(&format!("DESCRIPTION:{}", escape(&event.description))));
        if let Some(url) = &event.url {
            lines.push(fold(&format!("URL:{url}")));
        }
        lines.push("END:VEVENT".to_string());
    }
    lines.push("END:VCALENDAR".to_string());

    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

pub fn write_feed(path: &Path, contents: &str) -> Result<(), SerializationError> {
    std::fs::write(path, contents).map_err(|source| SerializationError::WriteFeed {
        path: path.to_path_buf(),
        source,
    })
}

/// Escape text per RFC 5545 §3.3.11.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// Fold one content line: CRLF plus a single-space continuation.
fn fold(line: &str) -> String {
    if line.len() <= FOLD_LIMIT {
        return line.to_string();
    }
    let mut parts = Vec::new();
    let mut rest = line.to_string();
    while rest.len() > FOLD_LIMIT {
        let mut cut = FOLD_LIMIT;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        parts.push(rest[..cut].to_string());
        rest = format!(" {}", &rest[cut..]);
    }
    parts.push(rest);
    parts.join("\r\n")
}

fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}
