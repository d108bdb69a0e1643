use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use dashboard_logging::{dash_debug, dash_error, dash_info};
use tokio::runtime::{Handle, Runtime};

use crate::poll::PollTimer;
use crate::sink::{ChannelEventSink, EventSink};
use crate::{DashboardApi, EngineEvent, ItemQueryParams, PollLoopId, RequestToken, UserId};

#[derive(Debug)]
enum EngineCommand {
    StartScrape,
    StartPolling {
        loop_id: PollLoopId,
        interval: Duration,
    },
    StopPolling {
        loop_id: PollLoopId,
    },
    QueryItems {
        token: RequestToken,
        params: ItemQueryParams,
    },
    LoadSources,
    LoadKeywords {
        user_id: UserId,
    },
    CreateKeyword {
        user_id: UserId,
        word: String,
    },
    DeleteKeyword {
        user_id: UserId,
        id: u64,
        word: String,
    },
    CleanupDuplicates,
}

/// Runs remote calls on a background tokio runtime and reports results as
/// [`EngineEvent`]s. Dropping the last handle stops the worker and any poll loop.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn spawn(api: Arc<dyn DashboardApi>) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        thread::spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    dash_error!("Could not start engine runtime: {}", err);
                    return;
                }
            };
            let mut worker = Worker::new(runtime.handle().clone(), api, sink);
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(command);
            }
            worker.shutdown();
            dash_info!("Engine worker stopped");
        });

        (Self { cmd_tx }, event_rx)
    }

    pub fn start_scrape(&self) {
        self.send(EngineCommand::StartScrape);
    }

    pub fn start_polling(&self, loop_id: PollLoopId, interval: Duration) {
        self.send(EngineCommand::StartPolling { loop_id, interval });
    }

    pub fn stop_polling(&self, loop_id: PollLoopId) {
        self.send(EngineCommand::StopPolling { loop_id });
    }

    pub fn query_items(&self, token: RequestToken, params: ItemQueryParams) {
        self.send(EngineCommand::QueryItems { token, params });
    }

    pub fn load_sources(&self) {
        self.send(EngineCommand::LoadSources);
    }

    pub fn load_keywords(&self, user_id: UserId) {
        self.send(EngineCommand::LoadKeywords { user_id });
    }

    pub fn create_keyword(&self, user_id: UserId, word: impl Into<String>) {
        self.send(EngineCommand::CreateKeyword {
            user_id,
            word: word.into(),
        });
    }

    pub fn delete_keyword(&self, user_id: UserId, id: u64, word: impl Into<String>) {
        self.send(EngineCommand::DeleteKeyword {
            user_id,
            id,
            word: word.into(),
        });
    }

    pub fn cleanup_duplicates(&self) {
        self.send(EngineCommand::CleanupDuplicates);
    }

    fn send(&self, command: EngineCommand) {
        if let Err(err) = self.cmd_tx.send(command) {
            dash_error!("Engine worker is gone, dropping {:?}", err.0);
        }
    }
}

/// Owns the poll timer and dispatches one-shot calls onto the runtime.
struct Worker {
    runtime: Handle,
    api: Arc<dyn DashboardApi>,
    sink: Arc<dyn EventSink>,
    timer: Option<PollTimer>,
}

impl Worker {
    fn new(runtime: Handle, api: Arc<dyn DashboardApi>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            runtime,
            api,
            sink,
            timer: None,
        }
    }

    fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::StartPolling { loop_id, interval } => {
                // At most one timer: the previous one is cancelled before the next starts.
                self.cancel_timer();
                dash_info!("Starting poll loop {} every {:?}", loop_id, interval);
                self.timer = Some(PollTimer::start(
                    &self.runtime,
                    self.api.clone(),
                    loop_id,
                    interval,
                    self.sink.clone(),
                ));
            }
            EngineCommand::StopPolling { loop_id } => {
                if self.timer.as_ref().map(PollTimer::loop_id) == Some(loop_id) {
                    self.cancel_timer();
                } else {
                    dash_debug!("Poll loop {} already stopped", loop_id);
                }
            }
            other => {
                let api = self.api.clone();
                let sink = self.sink.clone();
                self.runtime.spawn(async move {
                    let event = run_call(api.as_ref(), other).await;
                    if let Some(event) = event {
                        sink.emit(event);
                    }
                });
            }
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
            dash_info!("Poll loop {} cancelled", timer.loop_id());
        }
    }

    fn shutdown(&mut self) {
        self.cancel_timer();
    }
}

async fn run_call(api: &dyn DashboardApi, command: EngineCommand) -> Option<EngineEvent> {
    let event = match command {
        EngineCommand::StartScrape => EngineEvent::ScrapeStarted(api.start_scrape().await),
        EngineCommand::QueryItems { token, params } => EngineEvent::ItemsLoaded {
            token,
            result: api.query_items(&params).await,
        },
        EngineCommand::LoadSources => EngineEvent::SourcesLoaded(api.list_sources().await),
        EngineCommand::LoadKeywords { user_id } => {
            EngineEvent::KeywordsLoaded(api.list_keywords(user_id).await)
        }
        EngineCommand::CreateKeyword { user_id, word } => {
            let result = api.create_keyword(user_id, &word).await;
            EngineEvent::KeywordCreated { word, result }
        }
        EngineCommand::DeleteKeyword { user_id, id, word } => EngineEvent::KeywordDeleted {
            id,
            word,
            result: api.delete_keyword(user_id, id).await,
        },
        EngineCommand::CleanupDuplicates => {
            EngineEvent::CleanupFinished(api.cleanup_duplicates().await)
        }
        EngineCommand::StartPolling { .. } | EngineCommand::StopPolling { .. } => return None,
    };
    Some(event)
}
