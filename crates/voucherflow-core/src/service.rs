// ── Notification service operations ──
//
// The I/O half of the query subsystem. Each operation resolves its
// input, issues exactly one outbound call (plus bounded retries for
// reads), and normalizes the response.
//
// `get_notifications` and `update_notification_status` are the boundary
// operations: they never return `Err`, failures become result values.
// The `Result`-returning forms below them are for callers that want to
// handle errors themselves.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use voucherflow_api::ListPage;

use crate::error::CoreError;
use crate::model::{Notification, NotificationId, NotificationStatus, StatusCounts};
use crate::query::{
    FilterInput, PaginationState, QueryTarget, ResolvedQuery, STATUS_ALL, resolve,
};
use crate::retry::with_retry;
use crate::session::Session;

// ── Result values ───────────────────────────────────────────────────

/// Pagination block of a [`NotificationsResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_key: Option<String>,
}

impl PaginationInfo {
    /// Shape reported when a listing fails.
    pub fn fallback(page_size: u32) -> Self {
        Self {
            total_pages: 0,
            ..Self::from(&PaginationState::empty(page_size))
        }
    }
}

impl From<&PaginationState> for PaginationInfo {
    fn from(state: &PaginationState) -> Self {
        Self {
            page: state.page,
            page_size: state.page_size,
            total: state.total,
            total_pages: state.total_pages(),
            has_more: state.has_more,
            last_key: state.cursor.as_ref().map(|c| c.as_str().to_owned()),
        }
    }
}

/// Outcome of [`get_notifications`].
#[derive(Debug, Clone, Serialize)]
pub struct NotificationsResult {
    pub success: bool,
    pub data: Vec<Notification>,
    pub pagination: PaginationInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of [`update_notification_status`].
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One fetched page with the state needed to move from it.
#[derive(Debug, Clone)]
pub struct NotificationPage {
    pub query: ResolvedQuery,
    pub notifications: Vec<Notification>,
    pub state: PaginationState,
}

impl NotificationPage {
    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.notifications)
    }
}

/// Records gathered by [`collect_all`].
#[derive(Debug, Clone)]
pub struct CollectedPages {
    pub notifications: Vec<Notification>,
    pub pages_fetched: u32,
    /// False when the page cap stopped the walk before the last page.
    pub complete: bool,
}

// ── Boundary operations ─────────────────────────────────────────────

/// List notifications for `page`, filtered by `filters`.
///
/// `page_size` defaults to the session's configured page size.
pub async fn get_notifications(
    session: &Session,
    page: u32,
    page_size: Option<u32>,
    filters: Option<&FilterInput>,
) -> NotificationsResult {
    let page_size = session.page_size(page_size);
    let query = resolve(page, page_size, filters.unwrap_or(&FilterInput::default()));

    match fetch_page(session, &query).await {
        Ok(fetched) => NotificationsResult {
            success: true,
            pagination: PaginationInfo::from(&fetched.state),
            data: fetched.notifications,
            error: None,
        },
        Err(e) => {
            warn!(error = %e, mode = %query.mode(), "failed to load notifications");
            NotificationsResult {
                success: false,
                data: Vec::new(),
                pagination: PaginationInfo::fallback(page_size),
                error: Some(e.to_string()),
            }
        }
    }
}

/// Move notification `id` to `status`.
///
/// Both arguments are validated before any request is made.
pub async fn update_notification_status(session: &Session, id: &str, status: &str) -> UpdateResult {
    let outcome = match validate_update(id, status) {
        Ok((id, status)) => set_status(session, &id, status).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(updated) => UpdateResult {
            success: true,
            data: Some(updated),
            error: None,
        },
        Err(e) => {
            warn!(error = %e, id, "status update failed");
            UpdateResult {
                success: false,
                data: None,
                error: Some(e.to_string()),
            }
        }
    }
}

// ── Result-returning operations ─────────────────────────────────────

/// Fetch the page described by `query`.
pub async fn fetch_page(session: &Session, query: &ResolvedQuery) -> Result<NotificationPage, CoreError> {
    let response = list(session, query).await?;
    Ok(into_page(query, response))
}

/// [`fetch_page`], abandoned as soon as `cancel` fires.
///
/// A cancelled fetch returns [`CoreError::Cancelled`] and its response,
/// if one arrives, is dropped.
pub async fn fetch_page_cancellable(
    session: &Session,
    query: &ResolvedQuery,
    cancel: &CancellationToken,
) -> Result<NotificationPage, CoreError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            debug!(page = query.page, "page fetch cancelled");
            Err(CoreError::Cancelled)
        }
        result = fetch_page(session, query) => result,
    }
}

/// Walk forward from page 1 until the backend runs out or `max_pages`
/// pages have been read.
pub async fn collect_all(
    session: &Session,
    filters: &FilterInput,
    page_size: Option<u32>,
    max_pages: u32,
) -> Result<CollectedPages, CoreError> {
    let first = FilterInput {
        last_key: None,
        ..filters.clone()
    };
    let mut query = resolve(1, session.page_size(page_size), &first);
    let mut collected = CollectedPages {
        notifications: Vec::new(),
        pages_fetched: 0,
        complete: false,
    };

    while collected.pages_fetched < max_pages.max(1) {
        let page = fetch_page(session, &query).await?;
        collected.pages_fetched += 1;
        collected.notifications.extend(page.notifications);
        if !page.state.has_next() {
            collected.complete = true;
            break;
        }
        query = query.at(&page.state.next());
    }

    debug!(
        pages = collected.pages_fetched,
        records = collected.notifications.len(),
        complete = collected.complete,
        "collected notification pages"
    );
    Ok(collected)
}

/// `GET /notifications/{id}`
pub async fn get_notification(session: &Session, id: &str) -> Result<Notification, CoreError> {
    let id = parse_id(id)?;
    let record = with_retry(&session.config().retry, "get notification", || {
        session.client().get(id.as_str())
    })
    .await
    .map_err(|e| not_found_as(&id, e))?;
    Ok(record.into())
}

/// `PUT /notifications/{id}/status`. Never retried.
pub async fn set_status(
    session: &Session,
    id: &NotificationId,
    status: NotificationStatus,
) -> Result<Notification, CoreError> {
    let record = session
        .client()
        .update_status(id.as_str(), status.into())
        .await
        .map_err(|e| not_found_as(id, e))?;
    info!(%id, %status, "notification status updated");
    Ok(record.into())
}

/// Update only if the record is currently in `expected`.
///
/// This is a read-then-write check, not an atomic compare-and-set: a
/// write landing between the two requests still wins.
pub async fn update_status_checked(
    session: &Session,
    id: &str,
    status: NotificationStatus,
    expected: NotificationStatus,
) -> Result<Notification, CoreError> {
    let current = get_notification(session, id).await?;
    if current.status != expected {
        return Err(CoreError::Conflict {
            id: id.trim().to_owned(),
            expected: expected.to_string(),
            actual: current.status.to_string(),
        });
    }
    let id = parse_id(id)?;
    set_status(session, &id, status).await
}

// ── Helpers ─────────────────────────────────────────────────────────

async fn list(session: &Session, query: &ResolvedQuery) -> Result<ListPage, CoreError> {
    let client = session.client();
    let policy = &session.config().retry;
    let page = query.page_params();
    debug!(mode = %query.mode(), params = ?query.wire_params(), "listing notifications");

    let response = match query.target {
        QueryTarget::Search(ref params) => {
            with_retry(policy, "search", || client.search(params, &page)).await
        }
        QueryTarget::ByStatus(status) => {
            with_retry(policy, "list by status", || {
                client.list_by_status(status.into(), &page)
            })
            .await
        }
        QueryTarget::ByDevice(ref device_id) => {
            with_retry(policy, "list by device", || client.list_by_device(device_id, &page)).await
        }
        QueryTarget::All => with_retry(policy, "list", || client.list(&page)).await,
    };
    response.map_err(CoreError::from)
}

fn into_page(query: &ResolvedQuery, response: ListPage) -> NotificationPage {
    let state = PaginationState::ingest(&response, &query.page_request());
    NotificationPage {
        query: query.clone(),
        notifications: response.records.into_iter().map(Notification::from).collect(),
        state,
    }
}

fn parse_id(raw: &str) -> Result<NotificationId, CoreError> {
    NotificationId::parse(raw).ok_or_else(|| CoreError::validation("notification id must not be empty"))
}

fn validate_update(id: &str, status: &str) -> Result<(NotificationId, NotificationStatus), CoreError> {
    // Ids reaching this boundary come from a listed record; send them as issued.
    let id = NotificationId::new(id)
        .ok_or_else(|| CoreError::validation("notification id must not be empty"))?;
    let trimmed = status.trim();
    if trimmed.eq_ignore_ascii_case(STATUS_ALL) {
        return Err(CoreError::validation("'all' is a filter, not a status"));
    }
    let status = trimmed.parse::<NotificationStatus>().map_err(|_| {
        CoreError::validation(format!(
            "invalid status '{status}' (expected pending, validated or rejected)"
        ))
    })?;
    Ok((id, status))
}

fn not_found_as(id: &NotificationId, err: voucherflow_api::Error) -> CoreError {
    if err.is_not_found() {
        CoreError::NotFound {
            identifier: id.to_string(),
        }
    } else {
        err.into()
    }
}
