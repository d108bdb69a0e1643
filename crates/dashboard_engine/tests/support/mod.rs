#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashboard_engine::{
    ApiError, CleanupReport, DashboardApi, EngineEvent, EventSink, ItemPage, ItemQueryParams,
    JobStatus, KeywordEntry, SourceEntry, UserId,
};

#[derive(Default)]
pub struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Answers every call immediately and counts status checks.
#[derive(Default)]
pub struct FakeApi {
    pub status_calls: AtomicUsize,
    pub running: Mutex<bool>,
}

impl FakeApi {
    pub fn running() -> Arc<Self> {
        let api = Self::default();
        *api.running.lock().unwrap() = true;
        Arc::new(api)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn start_scrape(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn job_status(&self) -> Result<JobStatus, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(JobStatus {
            is_running: *self.running.lock().unwrap(),
            ..JobStatus::default()
        })
    }

    async fn query_items(&self, params: &ItemQueryParams) -> Result<ItemPage, ApiError> {
        Ok(ItemPage {
            items: Vec::new(),
            total: params.skip,
        })
    }

    async fn list_sources(&self) -> Result<Vec<SourceEntry>, ApiError> {
        Ok(vec![SourceEntry {
            id: 1,
            name: "Sernageomin".into(),
            scraper_type: "SERNAGEOMIN".into(),
        }])
    }

    async fn list_keywords(&self, _user_id: UserId) -> Result<Vec<KeywordEntry>, ApiError> {
        Ok(Vec::new())
    }

    async fn create_keyword(
        &self,
        _user_id: UserId,
        word: &str,
    ) -> Result<KeywordEntry, ApiError> {
        Ok(KeywordEntry {
            id: 42,
            word: word.to_string(),
        })
    }

    async fn delete_keyword(&self, _user_id: UserId, _keyword_id: u64) -> Result<(), ApiError> {
        Ok(())
    }

    async fn cleanup_duplicates(&self) -> Result<CleanupReport, ApiError> {
        Ok(CleanupReport {
            message: "0 duplicates removed".into(),
            details: None,
        })
    }
}
