//! Scraping Job Controller state.
//!
//! The controller never owns a timer itself. It hands out a fresh
//! [`PollLoopId`] each time polling starts and only honours status results
//! that carry the active id, so results from a cancelled loop are inert.
use std::time::Duration;

/// Cadence between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

pub type PollLoopId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrapePhase {
    #[default]
    Idle,
    Starting,
    Polling { loop_id: PollLoopId },
}

impl ScrapePhase {
    pub fn is_active(self) -> bool {
        !matches!(self, ScrapePhase::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResult {
    pub source_id: String,
    pub outcome: SourceOutcome,
    pub message: Option<String>,
}

/// Snapshot reported by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobStatus {
    pub is_running: bool,
    pub total_sources: Option<u32>,
    pub completed_sources: Option<u32>,
    pub current_source: Option<String>,
    pub results: Vec<SourceResult>,
}

impl JobStatus {
    pub fn tally(&self) -> Tally {
        self.results
            .iter()
            .fold(Tally::default(), |mut tally, result| {
                match result.outcome {
                    SourceOutcome::Success => tally.success += 1,
                    SourceOutcome::Error => tally.errors += 1,
                }
                tally
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub success: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeProgress {
    pub completed: Option<u32>,
    pub total: Option<u32>,
    pub current_source: Option<String>,
}

/// How the most recent job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSummary {
    Completed(Tally),
    /// The start call or a status check failed.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeController {
    phase: ScrapePhase,
    next_loop_id: PollLoopId,
    poll_interval: Duration,
    progress: Option<ScrapeProgress>,
    last_run: Option<RunSummary>,
}

impl Default for ScrapeController {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl ScrapeController {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            phase: ScrapePhase::Idle,
            next_loop_id: 0,
            poll_interval,
            progress: None,
            last_run: None,
        }
    }

    pub fn phase(&self) -> ScrapePhase {
        self.phase
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn progress(&self) -> Option<&ScrapeProgress> {
        self.progress.as_ref()
    }

    pub fn last_run(&self) -> Option<&RunSummary> {
        self.last_run.as_ref()
    }

    /// Idle -> Starting. `false` when a job is already starting or being polled.
    pub fn begin_start(&mut self) -> bool {
        if self.phase.is_active() {
            return false;
        }
        self.phase = ScrapePhase::Starting;
        self.progress = None;
        true
    }

    /// Starting -> Polling. Returns the new loop id and any loop that must be
    /// cancelled first. `None` if the controller was not starting.
    pub fn start_accepted(&mut self) -> Option<PollHandover> {
        let stale = match self.phase {
            ScrapePhase::Starting => None,
            ScrapePhase::Polling { loop_id } => Some(loop_id),
            ScrapePhase::Idle => return None,
        };
        self.next_loop_id += 1;
        let loop_id = self.next_loop_id;
        self.phase = ScrapePhase::Polling { loop_id };
        Some(PollHandover { stale, loop_id })
    }

    /// Starting -> Idle after a rejected start.
    pub fn start_failed(&mut self, message: impl Into<String>) -> bool {
        if self.phase != ScrapePhase::Starting {
            return false;
        }
        self.phase = ScrapePhase::Idle;
        self.last_run = Some(RunSummary::Failed(message.into()));
        true
    }

    /// Whether a status result for `loop_id` belongs to the active loop.
    pub fn is_current_loop(&self, loop_id: PollLoopId) -> bool {
        self.phase == ScrapePhase::Polling { loop_id }
    }

    pub fn observe_progress(&mut self, status: &JobStatus) {
        self.progress = Some(ScrapeProgress {
            completed: status.completed_sources,
            total: status.total_sources,
            current_source: status.current_source.clone(),
        });
    }

    /// Polling -> Idle. Returns the loop to cancel, or `None` if nothing was polling.
    pub fn finish(&mut self, summary: RunSummary) -> Option<PollLoopId> {
        let ScrapePhase::Polling { loop_id } = self.phase else {
            return None;
        };
        self.phase = ScrapePhase::Idle;
        self.progress = None;
        self.last_run = Some(summary);
        Some(loop_id)
    }

    /// Drops back to Idle regardless of phase. Returns the loop to cancel, if any.
    pub fn dispose(&mut self) -> Option<PollLoopId> {
        let active = match self.phase {
            ScrapePhase::Polling { loop_id } => Some(loop_id),
            ScrapePhase::Idle | ScrapePhase::Starting => None,
        };
        self.phase = ScrapePhase::Idle;
        self.progress = None;
        active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollHandover {
    /// Loop that must be cancelled before the new one starts.
    pub stale: Option<PollLoopId>,
    pub loop_id: PollLoopId,
}
