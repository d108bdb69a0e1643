use std::sync::Arc;
use std::time::Duration;

use dashboard_logging::{dash_debug, dash_trace};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{DashboardApi, EngineEvent, EventSink, PollLoopId};

/// The one recurring task of the engine: a status check every `interval`.
///
/// The first check happens one full interval after start. A check that takes
/// longer than the interval delays the next tick instead of overlapping it.
/// Cancelling is idempotent and also happens on drop, so a timer can never
/// outlive its owner.
pub struct PollTimer {
    loop_id: PollLoopId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollTimer {
    pub fn start(
        runtime: &Handle,
        api: Arc<dyn DashboardApi>,
        loop_id: PollLoopId,
        interval: Duration,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let stopped = cancel.clone();

        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = stopped.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                dash_trace!("poll loop {} checking status", loop_id);
                let result = tokio::select! {
                    _ = stopped.cancelled() => break,
                    result = api.job_status() => result,
                };
                sink.emit(EngineEvent::StatusPolled { loop_id, result });
            }
            dash_debug!("poll loop {} stopped", loop_id);
        });

        Self {
            loop_id,
            cancel,
            task,
        }
    }

    pub fn loop_id(&self) -> PollLoopId {
        self.loop_id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stops future ticks. Safe to call any number of times.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
