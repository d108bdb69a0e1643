use crate::{
    FilterPatch, JobStatus, Keyword, KeywordId, PollLoopId, QueryResult, RemoteError,
    RequestToken, SourceRef,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Load the catalogs and issue the first query.
    SessionStarted,
    /// Filters persisted by a previous session.
    FiltersRestored(FilterPatch),
    /// User edited one or more filters.
    FiltersChanged(FilterPatch),
    /// User picked a result page (1-based).
    PageSelected(u32),
    /// User asked for fresh data.
    ScrapeClicked,
    /// User asked the server to drop duplicate records.
    CleanupClicked,
    KeywordAddRequested(String),
    KeywordRemoveRequested(String),
    KeywordsToggled,
    /// The start-job call returned.
    ScrapeStartFinished(Result<(), RemoteError>),
    /// A status check of poll loop `loop_id` returned.
    ScrapeStatusReceived {
        loop_id: PollLoopId,
        result: Result<JobStatus, RemoteError>,
    },
    /// Item query `token` returned.
    ItemsLoaded {
        token: RequestToken,
        result: Result<QueryResult, RemoteError>,
    },
    SourcesLoaded(Result<Vec<SourceRef>, RemoteError>),
    KeywordsLoaded(Result<Vec<Keyword>, RemoteError>),
    KeywordCreated {
        word: String,
        result: Result<Keyword, RemoteError>,
    },
    KeywordDeleted {
        id: KeywordId,
        word: String,
        result: Result<(), RemoteError>,
    },
    /// Server message describing how many duplicates were removed.
    CleanupFinished(Result<String, RemoteError>),
    /// The owner is going away; stop any polling.
    Shutdown,
}
