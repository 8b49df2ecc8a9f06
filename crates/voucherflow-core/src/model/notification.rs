// ── Notification domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

// ── Status ──────────────────────────────────────────────────────────

/// Lifecycle state of a notification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NotificationStatus {
    Pending,
    Validated,
    Rejected,
}

impl NotificationStatus {
    /// Human label for tables and prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Validated => "Validated",
            Self::Rejected => "Rejected",
        }
    }

    /// States a record in this state may be moved to.
    pub fn transitions(self) -> Vec<Self> {
        Self::iter().filter(|s| *s != self).collect()
    }
}

// ── Identity ────────────────────────────────────────────────────────

/// Identifier used to address a notification in mutations.
///
/// Never empty. Records without one can be listed but not updated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    /// Id as typed by a user: surrounding whitespace is dropped.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::new(raw.trim())
    }

    /// Id as issued by the backend, kept byte for byte. Blank ids are `None`.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Notification ────────────────────────────────────────────────────

/// A voucher notification as shown in the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NotificationId>,
    pub code: String,
    pub name: String,
    pub status: NotificationStatus,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl Notification {
    /// Stable key for rendering a row at `position` in a page.
    ///
    /// Uses the id when there is one. This key is for display only and
    /// must never be used to address an update.
    pub fn display_key(&self, position: usize) -> String {
        match self.id {
            Some(ref id) => id.to_string(),
            None => format!("{position}-{}", self.code),
        }
    }

    /// Case-insensitive quick search over code, name, device and amount.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.code.to_lowercase().contains(&query)
            || self.name.to_lowercase().contains(&query)
            || self
                .device_id
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query))
            || self
                .amount
                .is_some_and(|a| a.to_string().contains(&query) || format!("{a:.2}").contains(&query))
    }
}

// ── Counts ──────────────────────────────────────────────────────────

/// Per-status tally over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub validated: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a Notification>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut counts, n| {
                match n.status {
                    NotificationStatus::Pending => counts.pending += 1,
                    NotificationStatus::Validated => counts.validated += 1,
                    NotificationStatus::Rejected => counts.rejected += 1,
                }
                counts
            })
    }
}
