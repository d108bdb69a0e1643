//! Dashboard engine: remote API gateway, poll timer and effect execution.
mod client;
mod engine;
mod persist;
mod poll;
mod sink;
mod types;

pub use client::{ApiSettings, DashboardApi, ReqwestApi};
pub use engine::EngineHandle;
pub use persist::{ensure_state_dir, read_state, write_atomic, PersistError};
pub use poll::PollTimer;
pub use sink::{ChannelEventSink, EventSink};
pub use types::{
    ApiError, CleanupReport, EngineEvent, FailureKind, ItemPage, ItemQueryParams, ItemRecord,
    JobStatus, KeywordEntry, PollLoopId, ReportStatus, RequestToken, SourceEntry, SourceReport,
    UserId,
};
