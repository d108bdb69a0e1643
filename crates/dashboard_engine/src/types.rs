use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

pub type PollLoopId = u64;
pub type RequestToken = u64;
pub type UserId = u64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureKind {
    #[error("invalid url")]
    InvalidUrl,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("network error")]
    Network,
    #[error("unexpected response body")]
    Decode,
}

/// `GET /scraping/status`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub total_sources: Option<u32>,
    #[serde(default)]
    pub completed_sources: Option<u32>,
    #[serde(default)]
    pub current_source: Option<String>,
    #[serde(default)]
    pub results: Vec<SourceReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceReport {
    #[serde(alias = "source", deserialize_with = "string_or_number")]
    pub source_id: String,
    pub status: ReportStatus,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Error,
}

/// Query string of `GET /items`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemQueryParams {
    pub search: String,
    pub country: Option<String>,
    pub source_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub use_keywords: bool,
    pub skip: u64,
    pub limit: u32,
    pub user_id: UserId,
}

impl ItemQueryParams {
    /// Name/value pairs in a stable order; absent filters are omitted.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("search", self.search.clone())];
        if let Some(country) = &self.country {
            pairs.push(("country", country.clone()));
        }
        if let Some(source_type) = &self.source_type {
            pairs.push(("source_type", source_type.clone()));
        }
        if let Some(start) = &self.start_date {
            pairs.push(("start_date", start.clone()));
        }
        if let Some(end) = &self.end_date {
            pairs.push(("end_date", end.clone()));
        }
        pairs.push(("use_keywords", self.use_keywords.to_string()));
        pairs.push(("skip", self.skip.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("user_id", self.user_id.to_string()));
        pairs
    }
}

/// `GET /items` response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ItemPage {
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemRecord {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, alias = "source_type")]
    pub source_name: Option<String>,
    #[serde(default, alias = "url")]
    pub source_url: Option<String>,
    #[serde(default, alias = "date")]
    pub presentation_date: Option<String>,
}

impl ItemRecord {
    /// Calendar day of `presentation_date`, whether sent as a date or a date-time.
    pub fn presentation_day(&self) -> Option<NaiveDate> {
        let raw = self.presentation_date.as_deref()?.trim();
        let day = raw.get(..10)?;
        let rest = &raw[10..];
        if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
            return None;
        }
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// `GET /sources` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceEntry {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub scraper_type: String,
}

/// `GET /users/{id}/keywords` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub id: u64,
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct NewKeyword<'a> {
    pub word: &'a str,
}

/// `POST /cleanup` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CleanupReport {
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
}

/// Results reported back by the engine thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ScrapeStarted(Result<(), ApiError>),
    StatusPolled {
        loop_id: PollLoopId,
        result: Result<JobStatus, ApiError>,
    },
    ItemsLoaded {
        token: RequestToken,
        result: Result<ItemPage, ApiError>,
    },
    SourcesLoaded(Result<Vec<SourceEntry>, ApiError>),
    KeywordsLoaded(Result<Vec<KeywordEntry>, ApiError>),
    KeywordCreated {
        word: String,
        result: Result<KeywordEntry, ApiError>,
    },
    KeywordDeleted {
        id: u64,
        word: String,
        result: Result<(), ApiError>,
    },
    CleanupFinished(Result<CleanupReport, ApiError>),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
