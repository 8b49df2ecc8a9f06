// ── Domain model ──
//
// Canonical notification types consumed by the CLI. Wire types from
// voucherflow-api are converted into these in `convert.rs`.

pub mod format;
pub mod notification;

pub use format::{format_amount, format_timestamp, format_timestamp_in};
pub use notification::{Notification, NotificationId, NotificationStatus, StatusCounts};
