// voucherflow-core: Query resolution and notification services between voucherflow-api and the CLI.

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod query;
pub mod retry;
pub mod service;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ApiConfig, DEFAULT_PAGE_SIZE, RetryPolicy, TlsVerification};
pub use error::CoreError;
pub use session::Session;

pub use query::{
    FilterCriteria, FilterInput, Navigation, PageRequest, PaginationState, QueryMode,
    QueryTarget, ResolvedQuery, ViewQuery, resolve, resolve_in,
};
pub use service::{
    CollectedPages, NotificationPage, NotificationsResult, PaginationInfo, UpdateResult,
    collect_all, fetch_page, fetch_page_cancellable, get_notification, get_notifications,
    set_status, update_notification_status, update_status_checked,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Notification, NotificationId, NotificationStatus, StatusCounts, format_amount,
    format_timestamp,
};

// The cursor type is shared with the API layer unchanged.
pub use voucherflow_api::Cursor;
