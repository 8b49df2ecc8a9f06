// ── Dashboard view state ──
//
// A dashboard view is addressable by query string:
// `?status=pending&code=V-1&pageSize=20&page=3&lastKey=...`. `ViewQuery`
// parses and renders that state and applies filter changes and navigation
// to it. A cursor is only valid at the page size it was issued under, so
// the size travels with it.

use url::form_urlencoded;
use voucherflow_api::Cursor;

use crate::model::NotificationStatus;

use super::filter::FilterInput;
use super::pagination::{PageRequest, PaginationState};

/// Filters plus page position, as carried in a view URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// Includes the `lastKey` cursor.
    pub filters: FilterInput,
    pub page: Option<u32>,
    /// Size the cursor was issued under; `None` means the configured default.
    pub page_size: Option<u32>,
}

impl ViewQuery {
    pub fn parse(query: &str) -> Self {
        Self {
            filters: FilterInput::from_query(query),
            page: positive_param(query, "page"),
            page_size: positive_param(query, "pageSize"),
        }
    }

    /// Logical page, defaulting to 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn last_key(&self) -> Option<&str> {
        self.filters.last_key.as_deref()
    }

    /// Render back to a query string. Empty values and `status=all` are omitted.
    pub fn to_query_string(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        let pairs = self.filters.query_pairs();
        for (key, value) in pairs.iter().filter(|(k, _)| *k != "lastKey") {
            out.append_pair(key, value);
        }
        if let Some(size) = self.page_size {
            out.append_pair("pageSize", &size.to_string());
        }
        if let Some(page) = self.page.filter(|p| *p > 1) {
            out.append_pair("page", &page.to_string());
        }
        if let Some((_, key)) = pairs.iter().find(|(k, _)| *k == "lastKey") {
            out.append_pair("lastKey", key);
        }
        out.finish()
    }

    /// Replace the advanced filters, keeping the status tab.
    ///
    /// New filters invalidate the position: page and cursor are cleared.
    pub fn apply_filters(&mut self, filters: FilterInput) {
        let status = self.filters.status.take();
        self.filters = FilterInput {
            status,
            last_key: None,
            ..filters
        };
        self.page = None;
    }

    /// Switch the status tab (`None` = all). Clears page and cursor.
    pub fn set_status(&mut self, status: Option<NotificationStatus>) {
        self.filters.status = status.map(|s| s.to_string());
        self.filters.last_key = None;
        self.page = None;
    }

    /// The view for `requested`, given the state of the page on screen.
    pub fn navigate(&self, current: &PaginationState, requested: u32) -> Self {
        self.at(current.advance(requested))
    }

    /// The view to request at `page_size`.
    ///
    /// `default_size` is the size a view without `pageSize` was issued
    /// under. Any other size drops the cursor and restarts at page 1.
    pub fn resized(&self, page_size: u32, default_size: u32) -> Self {
        let issued = PaginationState {
            page: self.page(),
            page_size: self.page_size.unwrap_or(default_size).max(1),
            anchor: self.last_key().and_then(Cursor::new),
            ..PaginationState::empty(default_size)
        };
        self.at(issued.resize(page_size))
    }

    fn at(&self, request: PageRequest) -> Self {
        let mut next = self.clone();
        next.page = Some(request.page);
        next.page_size = Some(request.page_size);
        next.filters.last_key = request.cursor.map(Cursor::into_inner);
        next
    }
}

fn positive_param(query: &str, name: &str) -> Option<u32> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .filter(|(k, _)| k == name)
        .last()
        .and_then(|(_, v)| v.trim().parse::<u32>().ok())
        .filter(|n| *n >= 1)
}
