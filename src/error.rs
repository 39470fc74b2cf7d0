use std::path::PathBuf;

use ::scraper::error::SelectorErrorKind;

/// Failures while acquiring raw schedule data.
///
/// Recoverable: the source client falls back to the next acquisition path,
/// and a league whose paths are all exhausted degrades to zero matches for
/// the run.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// The response arrived but did not hold a decodable schedule.
    #[error("malformed schedule payload from {url}: {reason}")]
    MalformedPayload { url: String, reason: String },

    /// The response decoded but carried no usable match records.
    #[error("no usable match records from {url}")]
    EmptySchedule { url: String },

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// Every acquisition path failed for a league.
    #[error("all acquisition paths failed for {league}: {reasons}")]
    Exhausted { league: String, reasons: String },
}

impl<'a> From<SelectorErrorKind<'a>> for FetchError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        FetchError::Selector(err.to_string())
    }
}

/// A single raw record could not become a canonical match.
///
/// Recoverable: the record is logged and skipped.
#[derive(thiserror::Error, Debug)]
pub enum NormalizationError {
    /// Nothing to key the record on: no upstream id, no teams, no time.
    #[error("record has no derivable identity")]
    MissingIdentity,
}

/// The persisted history state could not be read back.
///
/// Recoverable: the run continues from an empty history, with a warning.
#[derive(thiserror::Error, Debug)]
pub enum MergeError {
    #[error("failed to read history state {}: {source}", path.display())]
    ReadState {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corrupted history state {}: {source}", path.display())]
    CorruptState {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Output could not be produced. Fatal: the run aborts, since a partial or
/// missing feed cannot be trusted by subscribers.
#[derive(thiserror::Error, Debug)]
pub enum SerializationError {
    #[error("failed to write calendar file {}: {source}", path.display())]
    WriteFeed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode history state: {source}")]
    EncodeState { source: serde_json::Error },

    #[error("failed to write history state {}: {source}", path.display())]
    WriteState {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Run-level errors surfaced to the binary.
#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// Every league fetch failed and there is no prior history to fall back
    /// on, so no output at all can be produced.
    #[error("no schedule data: all {leagues} league fetches failed and no prior history exists")]
    NoData { leagues: usize },
}

pub type Result<T> = std::result::Result<T, FeedError>;
