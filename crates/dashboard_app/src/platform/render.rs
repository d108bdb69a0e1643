//! Plain-text rendering of the view model.
use dashboard_core::{
    AppViewModel, Notification, Record, ResultsStatus, ResultsView, RunSummary, ScrapePhase,
    Severity,
};
use dashboard_logging::{dash_error, dash_info};

/// Prints a notification and mirrors it to the log.
pub(crate) fn notify(notification: &Notification) {
    match notification.severity {
        Severity::Error => dash_error!("{}", notification.message),
        Severity::Info | Severity::Success => dash_info!("{}", notification.message),
    }
    println!("{}", notification_line(notification));
}

pub(crate) fn notification_line(notification: &Notification) -> String {
    let tag = match notification.severity {
        Severity::Info => "info",
        Severity::Success => "ok",
        Severity::Error => "error",
    };
    format!("[{tag}] {}", notification.message)
}

/// One line summarizing scrape and result state.
pub(crate) fn status_line(view: &AppViewModel) -> String {
    let scrape = match (&view.scrape.phase, &view.scrape.progress) {
        (ScrapePhase::Idle, _) => "idle".to_string(),
        (ScrapePhase::Starting, _) => "starting".to_string(),
        (ScrapePhase::Polling { .. }, Some(progress)) => {
            let mut text = match (progress.completed, progress.total) {
                (Some(done), Some(total)) => format!("running {done}/{total}"),
                _ => "running".to_string(),
            };
            if let Some(current) = &progress.current_source {
                text.push_str(&format!(" ({current})"));
            }
            text
        }
        (ScrapePhase::Polling { .. }, None) => "running".to_string(),
    };

    let mut line = format!("scrape: {scrape} | results: {}", results_summary(&view.results));
    if view.filters.use_keywords {
        line.push_str(&format!(" | keywords: on ({})", view.keywords.len()));
    }
    if view.cleanup_running {
        line.push_str(" | cleanup running");
    }
    line
}

fn results_summary(results: &ResultsView) -> String {
    match &results.status {
        ResultsStatus::Idle => "-".to_string(),
        ResultsStatus::Loading => "loading".to_string(),
        ResultsStatus::Empty => "no matches".to_string(),
        ResultsStatus::Failed(message) => format!("failed ({message})"),
        ResultsStatus::Ready => match results.pagination {
            Some(pagination) => format!(
                "{} (page {}/{})",
                results.total, pagination.page, pagination.page_count
            ),
            None => results.total.to_string(),
        },
    }
}

/// Full view: filters, last run, current page of records, keywords and catalog.
pub(crate) fn render(view: &AppViewModel) -> Vec<String> {
    let filters = &view.filters;
    let mut lines = vec![status_line(view)];

    let sources = if filters.sources.is_empty() {
        "all".to_string()
    } else {
        filters
            .sources
            .iter()
            .map(|source| source.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let day = |day: Option<chrono::NaiveDate>| day.map_or("-".to_string(), |d| d.to_string());
    lines.push(format!(
        "filters: search={:?} country={} sources={} from={} to={} keywords={}",
        filters.search,
        filters.country,
        sources,
        day(filters.date_range.start),
        day(filters.date_range.end),
        if filters.use_keywords { "on" } else { "off" },
    ));
    if filters.date_range.is_inverted() {
        lines.push("note: from is after to, the dates are swapped when querying".to_string());
    }

    if let Some(last_run) = &view.scrape.last_run {
        lines.push(match last_run {
            RunSummary::Completed(tally) => format!(
                "last scrape: {} succeeded, {} with errors",
                tally.success, tally.errors
            ),
            RunSummary::Failed(message) => format!("last scrape failed: {message}"),
        });
    }

    lines.extend(view.results.records.iter().map(record_line));

    if !view.keywords.is_empty() {
        lines.push(format!("keywords: {}", view.keywords.join(", ")));
    }
    if !view.sources.is_empty() {
        let catalog = view
            .sources
            .iter()
            .map(|source| format!("{}={}", source.id, source.name))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("sources: {catalog}"));
    }
    lines
}

fn record_line(record: &Record) -> String {
    let date = record
        .presentation_date
        .map_or_else(|| "----------".to_string(), |d| d.to_string());
    let origin = record
        .source_name
        .as_deref()
        .or(record.country.as_deref())
        .unwrap_or("?");
    let mut line = format!("  {date}  [{origin}] {}", record.title);
    if let Some(url) = &record.source_url {
        line.push_str(&format!("  <{url}>"));
    }
    line
}
