// ── Pagination state translator ──
//
// The backend pages with an opaque continuation cursor that only ever
// steps forward by one page. Users think in page numbers. This module
// maps between the two: `ingest` turns a response into a `PaginationState`,
// `advance` turns a navigation request into the next page window.
//
// Nothing here is persisted. Callers carry the state (or at least
// `page` + `anchor` + `cursor`) between requests and hand it back.

use serde::Serialize;
use tracing::debug;

use voucherflow_api::{Cursor, ListPage};

/// What kind of step a [`PageRequest`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Navigation {
    /// One page forward using the current cursor.
    Forward,
    /// Re-fetch the current page with the cursor that produced it.
    Refresh,
    /// Back to page 1 without a cursor.
    Restart,
}

/// The page window for the next outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
    /// Sent as `last_key`; `None` for page 1.
    pub cursor: Option<Cursor>,
    pub navigation: Navigation,
}

impl PageRequest {
    /// Page 1, no cursor.
    pub fn first(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            cursor: None,
            navigation: Navigation::Restart,
        }
    }
}

/// Where the user is, and what the backend said about what comes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    pub page: u32,
    pub page_size: u32,
    /// Best-effort record count; 0 when unknown.
    pub total: u64,
    /// Set only when the backend marks `total` as exact.
    pub total_exact: bool,
    /// The only signal that gates forward navigation.
    pub has_more: bool,
    /// Cursor for the next page.
    pub cursor: Option<Cursor>,
    /// Cursor that produced this page.
    pub anchor: Option<Cursor>,
}

impl PaginationState {
    /// State for an empty first page.
    pub fn empty(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total: 0,
            total_exact: false,
            has_more: false,
            cursor: None,
            anchor: None,
        }
    }

    /// Build state from a response to `request`.
    pub fn ingest(response: &ListPage, request: &PageRequest) -> Self {
        let has_more = response.has_more;
        let total = response
            .count
            .unwrap_or_else(|| u64::try_from(response.records.len()).unwrap_or(u64::MAX));
        let state = Self {
            page: request.page.max(1),
            page_size: request.page_size.max(1),
            total,
            total_exact: response.count_exact && response.count.is_some(),
            has_more,
            // A cursor without has_more is ignored; a stale one would loop.
            cursor: response.last_key.clone().filter(|_| has_more),
            anchor: request.cursor.clone(),
        };
        debug!(
            page = state.page,
            total = state.total,
            has_more = state.has_more,
            "ingested page"
        );
        state
    }

    /// `page + 1` while more data exists, otherwise `page`.
    pub fn total_pages(&self) -> u32 {
        if self.has_more {
            self.page.saturating_add(1)
        } else {
            self.page
        }
    }

    pub fn has_next(&self) -> bool {
        self.has_more && self.cursor.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Translate "go to `requested`" into a concrete page window.
    ///
    /// Forward moves at most one page. Backward restarts at page 1, since
    /// earlier cursors are not kept. Anything that cannot move replays
    /// the current page.
    pub fn advance(&self, requested: u32) -> PageRequest {
        let request = if requested > self.page {
            if let Some(cursor) = self.cursor.clone().filter(|_| self.has_more) {
                PageRequest {
                    page: self.page.saturating_add(1),
                    page_size: self.page_size,
                    cursor: Some(cursor),
                    navigation: Navigation::Forward,
                }
            } else {
                self.refresh()
            }
        } else if requested < self.page {
            PageRequest::first(self.page_size)
        } else {
            self.refresh()
        };
        debug!(
            from = self.page,
            requested,
            to = request.page,
            navigation = %request.navigation,
            "pagination step"
        );
        request
    }

    pub fn next(&self) -> PageRequest {
        self.advance(self.page.saturating_add(1))
    }

    pub fn previous(&self) -> PageRequest {
        self.advance(self.page.saturating_sub(1))
    }

    /// Changing the page size invalidates every cursor.
    pub fn resize(&self, page_size: u32) -> PageRequest {
        if page_size.max(1) == self.page_size {
            self.refresh()
        } else {
            PageRequest::first(page_size)
        }
    }

    fn refresh(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            page_size: self.page_size,
            cursor: self.anchor.clone(),
            navigation: if self.page == 1 && self.anchor.is_none() {
                Navigation::Restart
            } else {
                Navigation::Refresh
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn cursor(raw: &str) -> Option<Cursor> {
        Cursor::new(raw)
    }

    fn state(page: u32, has_more: bool, next: Option<&str>, anchor: Option<&str>) -> PaginationState {
        PaginationState {
            page,
            page_size: 20,
            total: 0,
            total_exact: false,
            has_more,
            cursor: next.and_then(cursor),
            anchor: anchor.and_then(cursor),
        }
    }

    fn response(has_more: bool, last_key: Option<&str>, count: Option<u64>) -> ListPage {
        ListPage {
            records: Vec::new(),
            count,
            count_exact: false,
            has_more,
            last_key: last_key.and_then(cursor),
        }
    }

    #[test]
    fn forward_carries_current_cursor() {
        let s = state(3, true, Some("C"), Some("B"));
        let req = s.advance(4);
        assert_eq!(req.page, 4);
        assert_eq!(req.cursor, cursor("C"));
        assert_eq!(req.navigation, Navigation::Forward);
    }

    #[test]
    fn forward_jumps_are_clamped_to_one_page() {
        let req = state(2, true, Some("C"), None).advance(9);
        assert_eq!(req.page, 3);
        assert_eq!(req.cursor, cursor("C"));
    }

    #[test]
    fn forward_without_more_stays_put() {
        let req = state(2, false, None, Some("B")).advance(3);
        assert_eq!(req.page, 2);
        assert_eq!(req.cursor, cursor("B"));
        assert_eq!(req.navigation, Navigation::Refresh);

        // has_more without a cursor cannot move either
        let req = state(2, true, None, Some("B")).advance(3);
        assert_eq!(req.page, 2);
    }

    #[test]
    fn backward_restarts_without_cursor() {
        let s = state(5, true, Some("E"), Some("D"));
        for requested in [4, 1, 0] {
            let req = s.advance(requested);
            assert_eq!(req, PageRequest::first(20), "requested {requested}");
        }
        assert!(s.previous().cursor.is_none());
    }

    #[test]
    fn same_page_replays_anchor() {
        let req = state(3, true, Some("C"), Some("B")).advance(3);
        assert_eq!(req.page, 3);
        assert_eq!(req.cursor, cursor("B"));
        assert_eq!(req.navigation, Navigation::Refresh);
    }

    #[test]
    fn page_size_change_restarts() {
        let s = state(3, true, Some("C"), Some("B"));
        assert_eq!(s.resize(50), PageRequest::first(50));
        assert_eq!(s.resize(20).cursor, cursor("B"));
    }

    #[test]
    fn ingest_passes_cursor_through_unmodified() {
        let raw = r#"{"id":"n9","ts":17}"#;
        let state = PaginationState::ingest(
            &response(true, Some(raw), Some(40)),
            &PageRequest::first(20),
        );
        assert_eq!(state.cursor.as_ref().unwrap().as_str(), raw);
        assert_eq!(state.next().cursor.unwrap().as_str(), raw);
    }

    #[test]
    fn ingest_treats_count_as_advisory() {
        let state = PaginationState::ingest(
            &response(true, Some("k"), Some(3)),
            &PageRequest::first(20),
        );
        assert_eq!(state.total, 3);
        assert!(!state.total_exact);
        // count says everything fits, has_more says otherwise: has_more wins
        assert!(state.has_next());
        assert_eq!(state.total_pages(), 2);
    }

    #[test]
    fn ingest_records_anchor() {
        let request = state(1, true, Some("A"), None).next();
        let next = PaginationState::ingest(&response(false, None, None), &request);
        assert_eq!(next.page, 2);
        assert_eq!(next.anchor, cursor("A"));
        assert_eq!(next.total_pages(), 2);
        assert!(!next.has_next());
        assert!(next.has_previous());
    }

    #[test]
    fn stale_cursor_is_dropped_when_no_more() {
        let state = PaginationState::ingest(
            &response(false, Some("stale"), Some(1)),
            &PageRequest::first(20),
        );
        assert!(state.cursor.is_none());
        assert_eq!(state.advance(2).page, 1);
    }

    #[test]
    fn exact_counts_are_flagged() {
        let mut page = response(false, None, Some(7));
        page.count_exact = true;
        let state = PaginationState::ingest(&page, &PageRequest::first(20));
        assert!(state.total_exact);
    }

    #[test]
    fn first_page_refresh_is_a_restart() {
        let req = PaginationState::empty(20).advance(1);
        assert_eq!(req, PageRequest::first(20));
    }
}
