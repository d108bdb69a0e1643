use std::sync::Arc;
use std::time::Duration;

use crate::view_model::{AppViewModel, PaginationView, ResultsStatus, ResultsView, ScrapeView};
use crate::{
    FilterSet, FilterStore, KeywordBook, LoadState, Retrieval, ScrapeController, SourceRef,
    DEFAULT_POLL_INTERVAL,
};

pub type UserId = u64;

/// The identity every query and keyword mutation is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Principal {
    pub user_id: UserId,
}

impl Principal {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    principal: Principal,
    pub(crate) filters: FilterStore,
    pub(crate) retrieval: Retrieval,
    pub(crate) scrape: ScrapeController,
    pub(crate) keywords: KeywordBook,
    pub(crate) sources: Vec<SourceRef>,
    pub(crate) cleanup_running: bool,
    pub(crate) session_started: bool,
    dirty: bool,
}

impl AppState {
    pub fn new(principal: Principal) -> Self {
        Self::with_poll_interval(principal, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(principal: Principal, poll_interval: Duration) -> Self {
        Self {
            principal,
            filters: FilterStore::new(),
            retrieval: Retrieval::new(),
            scrape: ScrapeController::new(poll_interval),
            keywords: KeywordBook::new(),
            sources: Vec::new(),
            cleanup_running: false,
            session_started: false,
            dirty: false,
        }
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    /// Current filter snapshot.
    pub fn filters(&self) -> Arc<FilterSet> {
        self.filters.current()
    }

    pub fn retrieval(&self) -> &Retrieval {
        &self.retrieval
    }

    pub fn scrape(&self) -> &ScrapeController {
        &self.scrape
    }

    pub fn view(&self) -> AppViewModel {
        let total = self.retrieval.total();
        let status = match self.retrieval.load_state() {
            LoadState::Idle => ResultsStatus::Idle,
            LoadState::Loading => ResultsStatus::Loading,
            LoadState::Failed(err) => ResultsStatus::Failed(err.message().to_string()),
            LoadState::Ready if total == 0 => ResultsStatus::Empty,
            LoadState::Ready => ResultsStatus::Ready,
        };
        let pagination = (total > 0).then(|| PaginationView {
            page: self.retrieval.cursor().page(),
            page_count: self.retrieval.page_count(),
        });

        AppViewModel {
            filters: self.filters().as_ref().clone(),
            scrape: ScrapeView {
                phase: self.scrape.phase(),
                busy: self.scrape.phase().is_active(),
                progress: self.scrape.progress().cloned(),
                last_run: self.scrape.last_run().cloned(),
            },
            results: ResultsView {
                status,
                records: self.retrieval.records().to_vec(),
                total,
                pagination,
            },
            keywords: self.keywords.words(),
            sources: self.sources.clone(),
            cleanup_running: self.cleanup_running,
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
