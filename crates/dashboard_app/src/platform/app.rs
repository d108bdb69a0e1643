use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use dashboard_core::{
    update, AppState, AppViewModel, FilterPatch, Msg, Principal, ResultsView, SourceRef,
};
use dashboard_engine::ReqwestApi;
use dashboard_logging::{dash_debug, dash_info, dash_warn};
use log::LevelFilter;

use super::commands::{self, Command, SourceSelection};
use super::config::DashboardConfig;
use super::effects::EffectRunner;
use super::{persistence, render};

#[derive(Debug)]
pub struct LaunchOptions {
    pub config_path: PathBuf,
    pub api_url: Option<String>,
    pub user_id: Option<u64>,
}

/// Everything the message loop waits on.
#[derive(Debug)]
pub enum Inbox {
    Msg(Msg),
    Line(String),
    InputClosed,
}

pub fn run_app(options: LaunchOptions) -> anyhow::Result<()> {
    let (mut config, config_error) = match DashboardConfig::load(&options.config_path) {
        Ok(config) => (config, None),
        Err(err) => (DashboardConfig::default(), Some(err)),
    };
    if let Some(url) = options.api_url {
        config.api_base_url = url;
    }
    if let Some(user_id) = options.user_id {
        config.user_id = user_id;
    }

    dashboard_logging::initialize(config.log_destination, &config.state_dir, LevelFilter::Info);
    if let Some(err) = config_error {
        dash_warn!("Using default configuration: {}", err);
    }
    dash_info!(
        "Dashboard starting against {} as user {}",
        config.api_base_url,
        config.user_id
    );

    let api = ReqwestApi::new(config.api_settings())
        .with_context(|| format!("invalid API base url {:?}", config.api_base_url))?;

    let (inbox_tx, inbox_rx) = mpsc::channel::<Inbox>();
    let runner = EffectRunner::new(Arc::new(api), inbox_tx.clone());
    spawn_stdin_reader(inbox_tx);

    let state = AppState::with_poll_interval(Principal::new(config.user_id), config.poll_interval());
    let mut app = App::new(state, runner);

    println!("{}", commands::HELP);
    if let Some(patch) = persistence::load_filters(&config.state_dir) {
        app.dispatch(Msg::FiltersRestored(patch));
    }
    app.dispatch(Msg::SessionStarted);

    while let Ok(item) = inbox_rx.recv() {
        match item {
            Inbox::Msg(msg) => app.dispatch(msg),
            Inbox::Line(line) => {
                if !app.handle_line(&line) {
                    break;
                }
            }
            Inbox::InputClosed => break,
        }
    }

    app.dispatch(Msg::Shutdown);
    persistence::save_filters(&config.state_dir, &app.state.filters());
    dash_info!("Dashboard stopped");
    Ok(())
}

fn spawn_stdin_reader(inbox: mpsc::Sender<Inbox>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if inbox.send(Inbox::Line(line)).is_err() {
                return;
            }
        }
        let _ = inbox.send(Inbox::InputClosed);
    });
}

struct App {
    state: AppState,
    runner: EffectRunner,
    shown_results: Option<ResultsView>,
}

impl App {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            shown_results: None,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        if let Msg::ItemsLoaded { token, .. } = &msg {
            if *token != self.state.retrieval().latest_token() {
                dash_debug!("Discarding superseded item response {}", token);
            }
        }

        let placeholder = AppState::new(self.state.principal());
        let state = std::mem::replace(&mut self.state, placeholder);
        let (mut state, effects) = update(state, msg);
        let dirty = state.consume_dirty();
        self.state = state;

        self.runner.enqueue(effects);
        if dirty {
            let view = self.state.view();
            self.print_changes(&view);
        }
    }

    /// Status line on every change; the record list only when it changed.
    fn print_changes(&mut self, view: &AppViewModel) {
        println!("{}", render::status_line(view));
        if self.shown_results.as_ref() != Some(&view.results) {
            for line in render::render(view).into_iter().skip(1) {
                println!("{line}");
            }
            self.shown_results = Some(view.results.clone());
        }
    }

    /// Returns `false` when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        let command = match commands::parse(line) {
            Ok(command) => command,
            Err(commands::CommandError::Empty) => return true,
            Err(err) => {
                println!("{err}");
                return true;
            }
        };

        let msg = match command {
            Command::Quit => return false,
            Command::Help => {
                println!("{}", commands::HELP);
                return true;
            }
            Command::Show => {
                for line in render::render(&self.state.view()) {
                    println!("{line}");
                }
                return true;
            }
            Command::Search(text) => Msg::FiltersChanged(FilterPatch::default().search(text)),
            Command::Country(country) => {
                Msg::FiltersChanged(FilterPatch::default().country(country))
            }
            Command::Sources(selection) => match self.resolve_sources(selection) {
                Some(sources) => Msg::FiltersChanged(FilterPatch::default().sources(sources)),
                None => return true,
            },
            Command::From(start) => {
                let end = self.state.filters().date_range.end;
                Msg::FiltersChanged(FilterPatch::default().date_range(start, end))
            }
            Command::To(end) => {
                let start = self.state.filters().date_range.start;
                Msg::FiltersChanged(FilterPatch::default().date_range(start, end))
            }
            Command::Page(page) => Msg::PageSelected(page),
            Command::Scrape => Msg::ScrapeClicked,
            Command::Cleanup => Msg::CleanupClicked,
            Command::KeywordAdd(word) => Msg::KeywordAddRequested(word),
            Command::KeywordRemove(word) => Msg::KeywordRemoveRequested(word),
            Command::KeywordToggle => Msg::KeywordsToggled,
        };
        self.dispatch(msg);
        true
    }

    fn resolve_sources(&self, selection: SourceSelection) -> Option<Vec<SourceRef>> {
        let ids = match selection {
            SourceSelection::All => return Some(Vec::new()),
            SourceSelection::Ids(ids) => ids,
        };
        let catalog = self.state.view().sources;
        let mut picked = Vec::with_capacity(ids.len());
        for id in ids {
            match catalog.iter().find(|source| source.id == id) {
                Some(source) => picked.push(source.clone()),
                None => {
                    println!("unknown source id {id}, see `show`");
                    return None;
                }
            }
        }
        Some(picked)
    }
}
