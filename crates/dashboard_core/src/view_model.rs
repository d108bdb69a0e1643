use crate::{FilterSet, Record, RunSummary, ScrapePhase, ScrapeProgress, SourceRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub filters: FilterSet,
    pub scrape: ScrapeView,
    pub results: ResultsView,
    pub keywords: Vec<String>,
    pub sources: Vec<SourceRef>,
    pub cleanup_running: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeView {
    pub phase: ScrapePhase,
    /// The scrape action should be disabled.
    pub busy: bool,
    pub progress: Option<ScrapeProgress>,
    pub last_run: Option<RunSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsStatus {
    Idle,
    Loading,
    /// The last query succeeded with zero matches.
    Empty,
    Ready,
    /// The last query failed; `records` still holds the previous page.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub status: ResultsStatus,
    pub records: Vec<Record>,
    pub total: u64,
    /// Absent when there is nothing to page through.
    pub pagination: Option<PaginationView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationView {
    pub page: u32,
    pub page_count: u32,
}
