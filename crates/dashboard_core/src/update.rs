use crate::{
    AppState, Delivery, Effect, FilterPatch, JobStatus, Msg, Notification, RemoteError,
    RunSummary,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SessionStarted => {
            if state.session_started {
                return (state, Vec::new());
            }
            state.session_started = true;
            state.mark_dirty();
            vec![
                Effect::LoadSources,
                Effect::LoadKeywords {
                    principal: state.principal(),
                },
                query_current(&mut state),
            ]
        }
        Msg::FiltersRestored(patch) => {
            if state.session_started {
                apply_filters(&mut state, patch)
            } else {
                // The first query goes out with SessionStarted.
                state.filters.apply(patch);
                state.retrieval.reset_cursor();
                state.mark_dirty();
                Vec::new()
            }
        }
        Msg::FiltersChanged(patch) => apply_filters(&mut state, patch),
        Msg::PageSelected(page) => match state.retrieval.select_page(page) {
            Ok(()) => {
                state.mark_dirty();
                vec![query_current(&mut state)]
            }
            Err(rejection) => vec![Effect::Notify(Notification::info(rejection.to_string()))],
        },
        Msg::ScrapeClicked => {
            if state.scrape.begin_start() {
                state.mark_dirty();
                vec![Effect::StartScrape]
            } else {
                Vec::new()
            }
        }
        Msg::ScrapeStartFinished(Ok(())) => match state.scrape.start_accepted() {
            Some(handover) => {
                state.mark_dirty();
                let mut effects = Vec::with_capacity(3);
                if let Some(loop_id) = handover.stale {
                    effects.push(Effect::StopPolling { loop_id });
                }
                effects.push(Effect::StartPolling {
                    loop_id: handover.loop_id,
                    interval: state.scrape.poll_interval(),
                });
                effects.push(Effect::Notify(Notification::info(
                    "Scraping started, please wait...",
                )));
                effects
            }
            None => Vec::new(),
        },
        Msg::ScrapeStartFinished(Err(err)) => {
            if state.scrape.start_failed(err.message()) {
                state.mark_dirty();
                vec![Effect::Notify(Notification::error(format!(
                    "Could not start scraping: {err}. Please try again."
                )))]
            } else {
                Vec::new()
            }
        }
        Msg::ScrapeStatusReceived { loop_id, result } => {
            if !state.scrape.is_current_loop(loop_id) {
                return (state, Vec::new());
            }
            state.mark_dirty();
            match result {
                Ok(status) if status.is_running => {
                    state.scrape.observe_progress(&status);
                    Vec::new()
                }
                Ok(status) => finish_scrape(&mut state, &status),
                Err(err) => fail_scrape(&mut state, &err),
            }
        }
        Msg::ItemsLoaded { token, result } => {
            match state.retrieval.deliver(token, result) {
                Delivery::Applied => {
                    state.mark_dirty();
                    Vec::new()
                }
                Delivery::Clamped { .. } => {
                    // The total shrank below the cursor; fetch the last page that exists.
                    state.mark_dirty();
                    vec![query_current(&mut state)]
                }
                Delivery::Superseded => Vec::new(),
                Delivery::Failed(err) => {
                    state.mark_dirty();
                    vec![Effect::Notify(Notification::error(format!(
                        "Could not load items: {err}"
                    )))]
                }
            }
        }
        Msg::SourcesLoaded(Ok(sources)) => {
            state.sources = sources;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SourcesLoaded(Err(err)) => vec![Effect::Notify(Notification::error(format!(
            "Could not load sources: {err}"
        )))],
        Msg::KeywordsLoaded(Ok(keywords)) => {
            state.keywords.replace_all(keywords);
            state.mark_dirty();
            Vec::new()
        }
        Msg::KeywordsLoaded(Err(err)) => vec![Effect::Notify(Notification::error(format!(
            "Could not load keywords: {err}"
        )))],
        Msg::KeywordAddRequested(raw) => match state.keywords.begin_add(&raw) {
            Ok(word) => vec![Effect::CreateKeyword {
                principal: state.principal(),
                word,
            }],
            Err(_) => Vec::new(),
        },
        Msg::KeywordCreated { word, result } => match result {
            Ok(keyword) => {
                if state.keywords.complete_add(keyword) {
                    sync_keywords(&mut state)
                } else {
                    Vec::new()
                }
            }
            Err(err) => {
                state.keywords.abort_add(&word);
                vec![Effect::Notify(Notification::error(format!(
                    "Could not add keyword {word:?}: {err}"
                )))]
            }
        },
        Msg::KeywordRemoveRequested(word) => match state.keywords.begin_remove(&word) {
            Ok(id) => vec![Effect::DeleteKeyword {
                principal: state.principal(),
                id,
                word,
            }],
            Err(_) => Vec::new(),
        },
        Msg::KeywordDeleted { id, word, result } => match result {
            Ok(()) => {
                if state.keywords.complete_remove(id) {
                    sync_keywords(&mut state)
                } else {
                    Vec::new()
                }
            }
            Err(err) => {
                state.keywords.abort_remove(id);
                vec![Effect::Notify(Notification::error(format!(
                    "Could not remove keyword {word:?}: {err}"
                )))]
            }
        },
        Msg::KeywordsToggled => {
            let use_keywords = !state.filters().use_keywords;
            let patch = FilterPatch::default()
                .use_keywords(use_keywords)
                .keywords(state.keywords.words());
            apply_filters(&mut state, patch)
        }
        Msg::CleanupClicked => {
            if state.cleanup_running {
                Vec::new()
            } else {
                state.cleanup_running = true;
                state.mark_dirty();
                vec![Effect::CleanupDuplicates]
            }
        }
        Msg::CleanupFinished(result) => {
            state.cleanup_running = false;
            state.mark_dirty();
            match result {
                Ok(message) => vec![
                    Effect::Notify(Notification::success(message)),
                    query_current(&mut state),
                ],
                Err(err) => vec![Effect::Notify(Notification::error(format!(
                    "Could not remove duplicates: {err}"
                )))],
            }
        }
        Msg::Shutdown => match state.scrape.dispose() {
            Some(loop_id) => {
                state.mark_dirty();
                vec![Effect::StopPolling { loop_id }]
            }
            None => Vec::new(),
        },
    };

    (state, effects)
}

/// Merge, go back to page 1, and re-query if anything the query depends on moved.
fn apply_filters(state: &mut AppState, patch: FilterPatch) -> Vec<Effect> {
    let applied = state.filters.apply(patch);
    let moved = state.retrieval.reset_cursor();
    if !applied.changed && !moved {
        return Vec::new();
    }
    state.mark_dirty();
    vec![query_current(state)]
}

fn query_current(state: &mut AppState) -> Effect {
    let filters = state.filters();
    let principal = state.principal();
    let (token, query) = state.retrieval.issue(&filters, &principal);
    Effect::QueryItems { token, query }
}

/// Propagates the keyword list together with the current flag.
fn sync_keywords(state: &mut AppState) -> Vec<Effect> {
    let patch = FilterPatch::default()
        .use_keywords(state.filters().use_keywords)
        .keywords(state.keywords.words());
    let effects = apply_filters(state, patch);
    state.mark_dirty();
    effects
}

fn finish_scrape(state: &mut AppState, status: &JobStatus) -> Vec<Effect> {
    let tally = status.tally();
    let Some(loop_id) = state.scrape.finish(RunSummary::Completed(tally)) else {
        return Vec::new();
    };
    vec![
        Effect::StopPolling { loop_id },
        Effect::Notify(Notification::success(format!(
            "Scraping finished: {} sources succeeded, {} with errors.",
            tally.success, tally.errors
        ))),
        // Re-query once with whatever filters are current now.
        query_current(state),
    ]
}

fn fail_scrape(state: &mut AppState, err: &RemoteError) -> Vec<Effect> {
    let Some(loop_id) = state.scrape.finish(RunSummary::Failed(err.message().to_string())) else {
        return Vec::new();
    };
    vec![
        Effect::StopPolling { loop_id },
        Effect::Notify(Notification::error(format!(
            "Could not check scraping status: {err}"
        ))),
    ]
}
