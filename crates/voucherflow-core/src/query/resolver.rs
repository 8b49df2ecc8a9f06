// ── Filter resolver ──
//
// Picks exactly one backend query mode for a (page, page size, filters)
// request and shapes the inputs the way that mode's endpoint expects.
// Pure: no I/O, no hidden state, never fails.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use serde::Serialize;
use tracing::debug;

use voucherflow_api::{Cursor, PageParams, SearchParams};

use crate::model::NotificationStatus;

use super::filter::{FilterCriteria, FilterInput};
use super::pagination::{Navigation, PageRequest};

/// Which endpoint serves a request. Variants are in priority order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryMode {
    /// `GET /notifications/search`
    Search,
    /// `GET /notifications/status/{status}`
    ByStatus,
    /// `GET /notifications/device/{device_id}`
    ByDevice,
    /// `GET /notifications`
    All,
}

/// Mode plus the endpoint-specific arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryTarget {
    Search(SearchParams),
    ByStatus(NotificationStatus),
    ByDevice(String),
    All,
}

impl QueryTarget {
    pub fn mode(&self) -> QueryMode {
        match self {
            Self::Search(_) => QueryMode::Search,
            Self::ByStatus(_) => QueryMode::ByStatus,
            Self::ByDevice(_) => QueryMode::ByDevice,
            Self::All => QueryMode::All,
        }
    }
}

/// A fully resolved request: where to go and which page window to ask for.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub target: QueryTarget,
    /// Logical page, always >= 1.
    pub page: u32,
    /// Always >= 1.
    pub page_size: u32,
    pub cursor: Option<Cursor>,
}

impl ResolvedQuery {
    pub fn mode(&self) -> QueryMode {
        self.target.mode()
    }

    pub fn page_params(&self) -> PageParams {
        PageParams {
            limit: self.page_size,
            last_key: self.cursor.clone(),
        }
    }

    /// The page window this query asks for.
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            page_size: self.page_size,
            cursor: self.cursor.clone(),
            navigation: if self.cursor.is_some() {
                Navigation::Forward
            } else {
                Navigation::Restart
            },
        }
    }

    /// Same target, moved to the window in `request`.
    pub fn at(&self, request: &PageRequest) -> Self {
        Self {
            target: self.target.clone(),
            page: request.page.max(1),
            page_size: request.page_size.max(1),
            cursor: request.cursor.clone(),
        }
    }

    /// Every outbound parameter in the backend's vocabulary, including
    /// path arguments, for diagnostics and `--output json` dumps.
    pub fn wire_params(&self) -> Vec<(&'static str, String)> {
        let mut pairs = match self.target {
            QueryTarget::Search(ref params) => params.query_pairs(),
            QueryTarget::ByStatus(status) => vec![("status", status.to_string())],
            QueryTarget::ByDevice(ref device_id) => vec![("device_id", device_id.clone())],
            QueryTarget::All => Vec::new(),
        };
        pairs.extend(self.page_params().query_pairs());
        pairs
    }
}

// ── Resolution ──────────────────────────────────────────────────────

/// Resolve using the local time zone for date bounds.
pub fn resolve(page: u32, page_size: u32, input: &FilterInput) -> ResolvedQuery {
    resolve_in(&Local, page, page_size, input)
}

/// Resolve with date bounds interpreted in `tz`.
pub fn resolve_in<Tz: TimeZone>(
    tz: &Tz,
    page: u32,
    page_size: u32,
    input: &FilterInput,
) -> ResolvedQuery {
    let criteria = FilterCriteria::from_input(input);
    let resolved = ResolvedQuery {
        page: page.max(1),
        page_size: page_size.max(1),
        cursor: criteria.cursor.clone(),
        target: select_target(tz, criteria),
    };
    debug!(mode = %resolved.mode(), page = resolved.page, page_size = resolved.page_size, "resolved notification query");
    resolved
}

fn select_target<Tz: TimeZone>(tz: &Tz, criteria: FilterCriteria) -> QueryTarget {
    if criteria.needs_search() {
        return QueryTarget::Search(SearchParams {
            from_timestamp: criteria.date_from.and_then(|d| start_of_day(tz, d)),
            to_timestamp: criteria.date_to.and_then(|d| end_of_day(tz, d)),
            code: criteria.code,
            device_id: criteria.device_id,
            status: criteria.status.map(Into::into),
            min_amount: criteria.amount_min,
            max_amount: criteria.amount_max,
        });
    }
    if let Some(status) = criteria.status {
        return QueryTarget::ByStatus(status);
    }
    if let Some(device_id) = criteria.device_id {
        return QueryTarget::ByDevice(device_id);
    }
    QueryTarget::All
}

// ── Day bounds ──────────────────────────────────────────────────────

/// 00:00:00.000 on `date` in `tz`, as epoch milliseconds.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<i64> {
    let naive = date.and_time(NaiveTime::MIN);
    // Midnight can fall in a DST gap; the day then starts at the first valid instant.
    local_millis(tz, naive, true).or_else(|| local_millis(tz, naive + TimeDelta::hours(1), true))
}

/// 23:59:59.999 on `date` in `tz`, as epoch milliseconds.
pub fn end_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<i64> {
    let naive = date.and_hms_milli_opt(23, 59, 59, 999)?;
    local_millis(tz, naive, false).or_else(|| local_millis(tz, naive - TimeDelta::hours(1), false))
}

fn local_millis<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime, earliest: bool) -> Option<i64> {
    let mapped = naive.and_local_timezone(tz.clone());
    let instant = if earliest {
        mapped.earliest()
    } else {
        mapped.latest()
    };
    instant.map(|dt| dt.timestamp_millis())
}
