use std::time::Duration;

use crate::{ItemQuery, KeywordId, PollLoopId, Principal, RequestToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartScrape,
    /// Begin the recurring status check. Any previous loop has already been
    /// stopped by an earlier `StopPolling` in the same batch.
    StartPolling {
        loop_id: PollLoopId,
        interval: Duration,
    },
    StopPolling {
        loop_id: PollLoopId,
    },
    QueryItems {
        token: RequestToken,
        query: ItemQuery,
    },
    LoadSources,
    LoadKeywords {
        principal: Principal,
    },
    CreateKeyword {
        principal: Principal,
        word: String,
    },
    DeleteKeyword {
        principal: Principal,
        id: KeywordId,
        word: String,
    },
    CleanupDuplicates,
    Notify(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}
