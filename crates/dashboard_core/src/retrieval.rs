//! Filtered Retrieval Engine: query derivation, pagination and stale-response discard.
use chrono::NaiveDate;

use crate::filters::FilterSet;
use crate::state::{Principal, UserId};
use crate::RemoteError;

/// Records per page.
pub const PAGE_SIZE: u32 = 10;

pub type RecordId = u64;

/// Monotonically increasing id attached to every issued item query.
pub type RequestToken = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub country: Option<String>,
    pub source_name: Option<String>,
    pub source_url: Option<String>,
    pub presentation_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryResult {
    pub records: Vec<Record>,
    pub total_count: u64,
}

/// Query parameters as sent to the item endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    /// Empty means no text filter.
    pub search: String,
    pub country: Option<String>,
    /// Comma-joined scraper types.
    pub source_type: Option<String>,
    /// `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`.
    pub end_date: Option<String>,
    pub use_keywords: bool,
    pub skip: u64,
    pub limit: u32,
    pub user_id: UserId,
}

impl ItemQuery {
    pub fn derive(filters: &FilterSet, cursor: PaginationCursor, principal: &Principal) -> Self {
        let source_types = filters.source_types();
        let range = filters.date_range.ordered();

        Self {
            search: filters.search.clone(),
            country: filters.country.query_value().map(ToOwned::to_owned),
            source_type: (!source_types.is_empty()).then(|| source_types.join(",")),
            start_date: range.start.map(format_day),
            end_date: range.end.map(format_day),
            use_keywords: filters.use_keywords,
            skip: cursor.skip(),
            limit: PAGE_SIZE,
            user_id: principal.user_id,
        }
    }
}

fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    page: u32,
}

impl PaginationCursor {
    pub fn first() -> Self {
        Self { page: 1 }
    }

    pub fn page(self) -> u32 {
        self.page
    }

    pub fn skip(self) -> u64 {
        u64::from(self.page - 1) * u64::from(PAGE_SIZE)
    }
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::first()
    }
}

/// `ceil(total / PAGE_SIZE)`; zero when there is nothing to page through.
pub fn page_count(total: u64) -> u32 {
    let pages = total.div_ceil(u64::from(PAGE_SIZE));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No query issued yet.
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(RemoteError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRejection {
    #[error("page {requested} does not exist ({page_count} pages)")]
    OutOfRange { requested: u32, page_count: u32 },
}

/// What happened to a delivered query response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    /// Applied, but the new total has fewer pages than the cursor pointed at;
    /// the cursor was moved back to `page`.
    Clamped { page: u32 },
    /// A newer request was issued after this one; the response is dropped.
    Superseded,
    Failed(RemoteError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Retrieval {
    cursor: PaginationCursor,
    latest: RequestToken,
    records: Vec<Record>,
    total: u64,
    load: LoadState,
}

impl Retrieval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn latest_token(&self) -> RequestToken {
        self.latest
    }

    pub fn page_count(&self) -> u32 {
        page_count(self.total)
    }

    /// Moves the cursor back to page 1. Returns whether it moved.
    pub fn reset_cursor(&mut self) -> bool {
        let moved = self.cursor.page != 1;
        self.cursor = PaginationCursor::first();
        moved
    }

    /// Re-selecting the current page is allowed and re-queries it.
    pub fn select_page(&mut self, page: u32) -> Result<(), PageRejection> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PageRejection::OutOfRange {
                requested: page,
                page_count,
            });
        }
        self.cursor = PaginationCursor { page };
        Ok(())
    }

    /// Issues a query for the current cursor. Every earlier token becomes stale.
    pub fn issue(&mut self, filters: &FilterSet, principal: &Principal) -> (RequestToken, ItemQuery) {
        self.latest += 1;
        self.load = LoadState::Loading;
        (self.latest, ItemQuery::derive(filters, self.cursor, principal))
    }

    pub fn deliver(
        &mut self,
        token: RequestToken,
        result: Result<QueryResult, RemoteError>,
    ) -> Delivery {
        if token != self.latest {
            return Delivery::Superseded;
        }
        match result {
            Ok(result) => {
                self.records = result.records;
                self.total = result.total_count;
                self.load = LoadState::Ready;
                let last_page = self.page_count().max(1);
                if self.cursor.page > last_page {
                    self.cursor = PaginationCursor { page: last_page };
                    return Delivery::Clamped { page: last_page };
                }
                Delivery::Applied
            }
            Err(err) => {
                // Previous records stay visible; only the load state reports the failure.
                self.load = LoadState::Failed(err.clone());
                Delivery::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{Country, FilterPatch, SourceRef};

    fn principal() -> Principal {
        Principal { user_id: 1 }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn result(total: u64) -> QueryResult {
        QueryResult {
            records: Vec::new(),
            total_count: total,
        }
    }

    #[test]
    fn default_filters_derive_a_minimal_query() {
        let query = ItemQuery::derive(&FilterSet::default(), PaginationCursor::first(), &principal());
        assert_eq!(
            query,
            ItemQuery {
                search: String::new(),
                country: None,
                source_type: None,
                start_date: None,
                end_date: None,
                use_keywords: false,
                skip: 0,
                limit: PAGE_SIZE,
                user_id: 1,
            }
        );
    }

    #[test]
    fn full_filters_are_projected() {
        let filters = FilterSet::default().merged(
            FilterPatch::default()
                .search("dispositivos")
                .country(Country::Peru)
                .sources([
                    SourceRef {
                        id: 1,
                        name: "DIGESA".into(),
                        scraper_type: "digesa".into(),
                    },
                    SourceRef {
                        id: 2,
                        name: "MINSA".into(),
                        scraper_type: "minsa".into(),
                    },
                ])
                .date_range(Some(day(2024, 12, 31)), Some(day(2024, 1, 2)))
                .use_keywords(true),
        );
        let mut retrieval = Retrieval::new();
        retrieval.total = 40;
        retrieval.select_page(3).unwrap();

        let (_, query) = retrieval.issue(&filters, &Principal { user_id: 7 });

        assert_eq!(query.search, "dispositivos");
        assert_eq!(query.country.as_deref(), Some("Perú"));
        assert_eq!(query.source_type.as_deref(), Some("digesa,minsa"));
        assert_eq!(query.start_date.as_deref(), Some("2024-01-02"));
        assert_eq!(query.end_date.as_deref(), Some("2024-12-31"));
        assert!(query.use_keywords);
        assert_eq!(query.skip, 20);
        assert_eq!(query.user_id, 7);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0), 0);
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(10), 1);
        assert_eq!(page_count(23), 3);
    }

    #[test]
    fn pages_outside_range_are_rejected() {
        let mut retrieval = Retrieval::new();
        let (token, _) = retrieval.issue(&FilterSet::default(), &principal());
        retrieval.deliver(token, Ok(result(23)));

        assert_eq!(
            retrieval.select_page(4),
            Err(PageRejection::OutOfRange {
                requested: 4,
                page_count: 3
            })
        );
        assert!(retrieval.select_page(0).is_err());
        assert_eq!(retrieval.select_page(3), Ok(()));
        assert_eq!(retrieval.cursor().page(), 3);
    }

    #[test]
    fn stale_token_is_superseded() {
        let mut retrieval = Retrieval::new();
        let (a, _) = retrieval.issue(&FilterSet::default(), &principal());
        let (b, _) = retrieval.issue(&FilterSet::default(), &principal());

        assert_eq!(retrieval.deliver(b, Ok(result(5))), Delivery::Applied);
        assert_eq!(retrieval.deliver(a, Ok(result(99))), Delivery::Superseded);
        assert_eq!(retrieval.total(), 5);
    }

    #[test]
    fn failure_keeps_previous_records() {
        let mut retrieval = Retrieval::new();
        let (token, _) = retrieval.issue(&FilterSet::default(), &principal());
        retrieval.deliver(token, Ok(result(12)));

        let (token, _) = retrieval.issue(&FilterSet::default(), &principal());
        let err = RemoteError::new("http status 500");
        assert_eq!(
            retrieval.deliver(token, Err(err.clone())),
            Delivery::Failed(err.clone())
        );
        assert_eq!(retrieval.total(), 12);
        assert_eq!(retrieval.load_state(), &LoadState::Failed(err));
    }

    #[test]
    fn smaller_total_clamps_cursor_to_last_page() {
        let mut retrieval = Retrieval::new();
        let (token, _) = retrieval.issue(&FilterSet::default(), &principal());
        retrieval.deliver(token, Ok(result(23)));
        retrieval.select_page(3).unwrap();

        let (token, query) = retrieval.issue(&FilterSet::default(), &principal());
        assert_eq!(query.skip, 20);
        assert_eq!(
            retrieval.deliver(token, Ok(result(11))),
            Delivery::Clamped { page: 2 }
        );
        assert_eq!(retrieval.cursor().page(), 2);
        assert_eq!(retrieval.total(), 11);
    }
}
