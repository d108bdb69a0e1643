//! Dashboard core: pure state machine and view-model helpers.
mod effect;
mod error;
mod filters;
mod keywords;
mod msg;
mod retrieval;
mod scrape;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Notification, Severity};
pub use error::RemoteError;
pub use filters::{
    Applied, Country, DateRange, FilterPatch, FilterSet, FilterStore, SourceId, SourceRef,
    UnknownCountry,
};
pub use keywords::{Keyword, KeywordBook, KeywordId, KeywordRejection};
pub use msg::Msg;
pub use retrieval::{
    page_count, Delivery, ItemQuery, LoadState, PageRejection, PaginationCursor, QueryResult,
    Record, RecordId, RequestToken, Retrieval, PAGE_SIZE,
};
pub use scrape::{
    JobStatus, PollHandover, PollLoopId, RunSummary, ScrapeController, ScrapePhase,
    ScrapeProgress, SourceOutcome, SourceResult, Tally, DEFAULT_POLL_INTERVAL,
};
pub use state::{AppState, Principal, UserId};
pub use update::update;
pub use view_model::{AppViewModel, PaginationView, ResultsStatus, ResultsView, ScrapeView};
