use std::sync::{mpsc, Arc};
use std::thread;

use dashboard_core::{
    Effect, ItemQuery, JobStatus, Keyword, Msg, QueryResult, Record, RemoteError, SourceOutcome,
    SourceRef, SourceResult,
};
use dashboard_engine::{
    ApiError, DashboardApi, EngineEvent, EngineHandle, ItemPage, ItemQueryParams, ItemRecord,
    ReportStatus,
};
use dashboard_logging::{dash_debug, dash_error, dash_info, dash_warn};

use super::app::Inbox;
use super::render;

/// Turns core effects into engine calls and engine results back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(api: Arc<dyn DashboardApi>, inbox: mpsc::Sender<Inbox>) -> Self {
        let (engine, events) = EngineHandle::spawn(api);
        thread::spawn(move || {
            for event in events {
                if inbox.send(Inbox::Msg(map_event(event))).is_err() {
                    break;
                }
            }
            dash_debug!("Engine event relay stopped");
        });
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartScrape => {
                    dash_info!("StartScrape");
                    self.engine.start_scrape();
                }
                Effect::StartPolling { loop_id, interval } => {
                    self.engine.start_polling(loop_id, interval);
                }
                Effect::StopPolling { loop_id } => self.engine.stop_polling(loop_id),
                Effect::QueryItems { token, query } => {
                    dash_debug!("QueryItems token={} skip={}", token, query.skip);
                    self.engine.query_items(token, to_params(query));
                }
                Effect::LoadSources => self.engine.load_sources(),
                Effect::LoadKeywords { principal } => self.engine.load_keywords(principal.user_id),
                Effect::CreateKeyword { principal, word } => {
                    self.engine.create_keyword(principal.user_id, word);
                }
                Effect::DeleteKeyword {
                    principal,
                    id,
                    word,
                } => self.engine.delete_keyword(principal.user_id, id, word),
                Effect::CleanupDuplicates => self.engine.cleanup_duplicates(),
                Effect::Notify(notification) => render::notify(&notification),
            }
        }
    }
}

fn to_params(query: ItemQuery) -> ItemQueryParams {
    ItemQueryParams {
        search: query.search,
        country: query.country,
        source_type: query.source_type,
        start_date: query.start_date,
        end_date: query.end_date,
        use_keywords: query.use_keywords,
        skip: query.skip,
        limit: query.limit,
        user_id: query.user_id,
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ScrapeStarted(result) => Msg::ScrapeStartFinished(result.map_err(|err| {
            dash_error!("Starting the scrape failed: {}", err);
            remote(err)
        })),
        EngineEvent::StatusPolled { loop_id, result } => Msg::ScrapeStatusReceived {
            loop_id,
            result: result.map(map_status).map_err(|err| {
                dash_warn!("Status check of loop {} failed: {}", loop_id, err);
                remote(err)
            }),
        },
        EngineEvent::ItemsLoaded { token, result } => Msg::ItemsLoaded {
            token,
            result: result.map(map_page).map_err(|err| {
                dash_warn!("Item query {} failed: {}", token, err);
                remote(err)
            }),
        },
        EngineEvent::SourcesLoaded(result) => Msg::SourcesLoaded(
            result
                .map(|sources| {
                    sources
                        .into_iter()
                        .map(|source| SourceRef {
                            id: source.id,
                            name: source.name,
                            scraper_type: source.scraper_type,
                        })
                        .collect()
                })
                .map_err(|err| {
                    dash_warn!("Loading sources failed: {}", err);
                    remote(err)
                }),
        ),
        EngineEvent::KeywordsLoaded(result) => Msg::KeywordsLoaded(
            result
                .map(|entries| {
                    entries
                        .into_iter()
                        .map(|entry| Keyword {
                            id: entry.id,
                            word: entry.word,
                        })
                        .collect()
                })
                .map_err(|err| {
                    dash_warn!("Loading keywords failed: {}", err);
                    remote(err)
                }),
        ),
        EngineEvent::KeywordCreated { word, result } => {
            let result = result
                .map(|entry| Keyword {
                    id: entry.id,
                    word: entry.word,
                })
                .map_err(|err| {
                    dash_warn!("Creating keyword {:?} failed: {}", word, err);
                    remote(err)
                });
            Msg::KeywordCreated { word, result }
        }
        EngineEvent::KeywordDeleted { id, word, result } => {
            let result = result.map_err(|err| {
                dash_warn!("Deleting keyword {:?} failed: {}", word, err);
                remote(err)
            });
            Msg::KeywordDeleted { id, word, result }
        }
        EngineEvent::CleanupFinished(result) => Msg::CleanupFinished(
            result
                .map(|report| match report.details {
                    Some(details) => format!("{} ({})", report.message, details),
                    None => report.message,
                })
                .map_err(|err| {
                    dash_warn!("Duplicate cleanup failed: {}", err);
                    remote(err)
                }),
        ),
    }
}

fn remote(err: ApiError) -> RemoteError {
    RemoteError::new(err.to_string())
}

fn map_status(status: dashboard_engine::JobStatus) -> JobStatus {
    JobStatus {
        is_running: status.is_running,
        total_sources: status.total_sources,
        completed_sources: status.completed_sources,
        current_source: status.current_source,
        results: status
            .results
            .into_iter()
            .map(|report| SourceResult {
                source_id: report.source_id,
                outcome: match report.status {
                    ReportStatus::Success => SourceOutcome::Success,
                    ReportStatus::Error => SourceOutcome::Error,
                },
                message: report.message,
            })
            .collect(),
    }
}

fn map_page(page: ItemPage) -> QueryResult {
    QueryResult {
        records: page.items.into_iter().map(map_record).collect(),
        total_count: page.total,
    }
}

fn map_record(item: ItemRecord) -> Record {
    let presentation_date = item.presentation_day();
    Record {
        id: item.id,
        title: item.title,
        description: item.description.unwrap_or_default(),
        country: item.country,
        source_name: item.source_name,
        source_url: item.source_url,
        presentation_date,
    }
}
