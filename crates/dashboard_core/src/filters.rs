//! Filter State Store: immutable filter snapshots and the single merge operation.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;

pub type SourceId = u64;

/// A catalog source the user can filter on.
///
/// The filter keeps whole sources; queries only need `scraper_type`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceRef {
    pub id: SourceId,
    pub name: String,
    pub scraper_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Country {
    #[default]
    Any,
    Chile,
    Peru,
}

impl Country {
    /// Value sent to the item endpoint; `None` means the parameter is omitted.
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Country::Any => None,
            Country::Chile => Some("Chile"),
            Country::Peru => Some("Perú"),
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_value().unwrap_or("Any"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown country {0:?}")]
pub struct UnknownCountry(pub String);

impl FromStr for Country {
    type Err = UnknownCountry;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "" | "any" | "all" | "todos" => Ok(Country::Any),
            "chile" | "cl" => Ok(Country::Chile),
            "peru" | "perú" | "pe" => Ok(Country::Peru),
            _ => Err(UnknownCountry(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Bounds in ascending order. An inverted range is swapped rather than rejected.
    pub fn ordered(self) -> Self {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Self {
                start: Some(end),
                end: Some(start),
            },
            _ => self,
        }
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }
}

/// Complete snapshot of the user's query criteria.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSet {
    pub search: String,
    pub country: Country,
    pub sources: BTreeSet<SourceRef>,
    pub date_range: DateRange,
    pub use_keywords: bool,
    /// Insertion order is kept for display; duplicates are dropped.
    pub keywords: Vec<String>,
}

impl FilterSet {
    /// Shallow merge: every field present in `patch` replaces the current one.
    pub fn merged(&self, patch: FilterPatch) -> FilterSet {
        let FilterPatch {
            search,
            country,
            sources,
            date_range,
            use_keywords,
            keywords,
        } = patch;

        FilterSet {
            search: search.unwrap_or_else(|| self.search.clone()),
            country: country.unwrap_or(self.country),
            sources: sources.unwrap_or_else(|| self.sources.clone()),
            date_range: date_range.unwrap_or(self.date_range),
            use_keywords: use_keywords.unwrap_or(self.use_keywords),
            keywords: keywords
                .map(dedupe_in_order)
                .unwrap_or_else(|| self.keywords.clone()),
        }
    }

    /// Scraper types of the selected sources, deduplicated, in source order.
    pub fn source_types(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.sources
            .iter()
            .map(|source| source.scraper_type.as_str())
            .filter(|kind| seen.insert(*kind))
            .collect()
    }
}

fn dedupe_in_order(words: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    words
        .into_iter()
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

/// Partial update of a [`FilterSet`]. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub country: Option<Country>,
    pub sources: Option<BTreeSet<SourceRef>>,
    pub date_range: Option<DateRange>,
    pub use_keywords: Option<bool>,
    pub keywords: Option<Vec<String>>,
}

impl FilterPatch {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn country(mut self, country: Country) -> Self {
        self.country = Some(country);
        self
    }

    pub fn sources(mut self, sources: impl IntoIterator<Item = SourceRef>) -> Self {
        self.sources = Some(sources.into_iter().collect());
        self
    }

    pub fn date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    pub fn use_keywords(mut self, use_keywords: bool) -> Self {
        self.use_keywords = Some(use_keywords);
        self
    }

    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = Some(keywords);
        self
    }
}

/// Result of [`FilterStore::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub filters: Arc<FilterSet>,
    /// The new snapshot differs by value from the previous one.
    pub changed: bool,
}

/// Holds the current filter snapshot. Readers get shared, immutable versions;
/// the only way to change it is [`FilterStore::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterStore {
    current: Arc<FilterSet>,
    version: u64,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Arc<FilterSet> {
        Arc::clone(&self.current)
    }

    /// Incremented whenever an apply produced a different value.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn apply(&mut self, patch: FilterPatch) -> Applied {
        let next = self.current.merged(patch);
        let changed = next != *self.current;
        if changed {
            self.current = Arc::new(next);
            self.version += 1;
        }
        Applied {
            filters: self.current(),
            changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: SourceId, kind: &str) -> SourceRef {
        SourceRef {
            id,
            name: format!("Source {id}"),
            scraper_type: kind.to_string(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn merge_only_touches_present_fields() {
        let base = FilterSet {
            search: "vacuna".into(),
            country: Country::Chile,
            ..FilterSet::default()
        };
        let next = base.merged(FilterPatch::default().use_keywords(true));

        assert_eq!(next.search, "vacuna");
        assert_eq!(next.country, Country::Chile);
        assert!(next.use_keywords);
    }

    #[test]
    fn applying_same_patch_twice_is_idempotent() {
        let mut store = FilterStore::new();
        let patch = FilterPatch::default().search("ley").country(Country::Peru);

        let first = store.apply(patch.clone());
        let second = store.apply(patch);

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(first.filters, second.filters);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn snapshots_are_not_affected_by_later_applies() {
        let mut store = FilterStore::new();
        let before = store.current();
        store.apply(FilterPatch::default().search("x"));

        assert_eq!(before.search, "");
        assert_eq!(store.current().search, "x");
    }

    #[test]
    fn keywords_keep_first_occurrence_order() {
        let next = FilterSet::default().merged(FilterPatch::default().keywords(vec![
            "b".into(),
            "a".into(),
            "b".into(),
        ]));
        assert_eq!(next.keywords, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn source_types_are_projected_and_deduplicated() {
        let filters = FilterSet::default().merged(FilterPatch::default().sources([
            source(3, "minsa"),
            source(1, "ispch"),
            source(2, "minsa"),
        ]));
        assert_eq!(filters.source_types(), vec!["ispch", "minsa"]);
    }

    #[test]
    fn inverted_range_is_swapped_when_ordered() {
        let range = DateRange::new(Some(day(2024, 5, 1)), Some(day(2024, 1, 1)));
        assert!(range.is_inverted());
        assert_eq!(
            range.ordered(),
            DateRange::new(Some(day(2024, 1, 1)), Some(day(2024, 5, 1)))
        );

        let open = DateRange::new(Some(day(2024, 5, 1)), None);
        assert_eq!(open.ordered(), open);
    }

    #[test]
    fn country_parsing_has_one_any_representation() {
        for raw in ["", "ANY", "all", "Todos"] {
            assert_eq!(raw.parse::<Country>(), Ok(Country::Any));
        }
        assert_eq!("Perú".parse::<Country>(), Ok(Country::Peru));
        assert!("Narnia".parse::<Country>().is_err());
        assert_eq!(Country::Any.query_value(), None);
    }
}
