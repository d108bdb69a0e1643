use std::path::Path;

use chrono::NaiveDate;
use dashboard_core::{Country, FilterPatch, FilterSet, SourceRef};
use dashboard_engine::{read_state, write_atomic};
use dashboard_logging::{dash_error, dash_info, dash_warn};
use serde::{Deserialize, Serialize};

pub(crate) const FILTERS_FILENAME: &str = ".dashboard_filters.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PersistedSource {
    id: u64,
    name: String,
    scraper_type: String,
}

/// Keywords are not stored: they are owned by the server and reloaded per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
struct PersistedFilters {
    search: String,
    country: String,
    sources: Vec<PersistedSource>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    use_keywords: bool,
}

impl PersistedFilters {
    fn from_filters(filters: &FilterSet) -> Self {
        Self {
            search: filters.search.clone(),
            country: filters.country.to_string(),
            sources: filters
                .sources
                .iter()
                .map(|source| PersistedSource {
                    id: source.id,
                    name: source.name.clone(),
                    scraper_type: source.scraper_type.clone(),
                })
                .collect(),
            start_date: filters.date_range.start,
            end_date: filters.date_range.end,
            use_keywords: filters.use_keywords,
        }
    }

    fn into_patch(self) -> FilterPatch {
        let country = self.country.parse().unwrap_or_else(|err| {
            dash_warn!("Ignoring persisted country: {}", err);
            Country::Any
        });
        FilterPatch::default()
            .search(self.search)
            .country(country)
            .sources(self.sources.into_iter().map(|source| SourceRef {
                id: source.id,
                name: source.name,
                scraper_type: source.scraper_type,
            }))
            .date_range(self.start_date, self.end_date)
            .use_keywords(self.use_keywords)
    }
}

/// Filters saved by the previous session, if any could be read.
pub(crate) fn load_filters(state_dir: &Path) -> Option<FilterPatch> {
    let content = match read_state(state_dir, FILTERS_FILENAME) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(err) => {
            dash_warn!("Failed to read persisted filters from {:?}: {}", state_dir, err);
            return None;
        }
    };

    match ron::from_str::<PersistedFilters>(&content) {
        Ok(persisted) => {
            dash_info!("Restored filters from {:?}", state_dir.join(FILTERS_FILENAME));
            Some(persisted.into_patch())
        }
        Err(err) => {
            dash_warn!("Failed to parse persisted filters: {}", err);
            None
        }
    }
}

pub(crate) fn save_filters(state_dir: &Path, filters: &FilterSet) {
    let persisted = PersistedFilters::from_filters(filters);
    let content = match ron::ser::to_string_pretty(&persisted, ron::ser::PrettyConfig::new()) {
        Ok(text) => text,
        Err(err) => {
            dash_error!("Failed to serialize filters: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomic(state_dir, FILTERS_FILENAME, &content) {
        dash_error!("Failed to write filters to {:?}: {}", state_dir, err);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> FilterSet {
        FilterSet::default().merged(
            FilterPatch::default()
                .search("relave")
                .country(Country::Peru)
                .sources([SourceRef {
                    id: 2,
                    name: "Diario Oficial El Peruano".into(),
                    scraper_type: "PERUANO".into(),
                }])
                .date_range(NaiveDate::from_ymd_opt(2024, 1, 1), None)
                .use_keywords(true)
                .keywords(vec!["cobre".into()]),
        )
    }

    #[test]
    fn filters_round_trip_without_keywords() {
        let temp = TempDir::new().unwrap();
        let filters = sample();

        save_filters(temp.path(), &filters);
        let patch = load_filters(temp.path()).expect("restored");
        let restored = FilterSet::default().merged(patch);

        assert_eq!(restored.search, "relave");
        assert_eq!(restored.country, Country::Peru);
        assert_eq!(restored.sources, filters.sources);
        assert_eq!(restored.date_range, filters.date_range);
        assert!(restored.use_keywords);
        assert!(restored.keywords.is_empty());
    }

    #[test]
    fn absent_or_corrupt_state_is_ignored() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load_filters(temp.path()), None);

        fs::write(temp.path().join(FILTERS_FILENAME), "{not ron").unwrap();
        assert_eq!(load_filters(temp.path()), None);
    }
}
