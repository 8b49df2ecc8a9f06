//! Wire types for the notifications REST API.
//!
//! Field names follow the backend's snake_case vocabulary. List endpoints
//! are not consistent about their body shape, so every list response is
//! classified once into a [`ListBody`] and flattened into a [`ListPage`]
//! before anything downstream sees it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::Error;

// ── Status ───────────────────────────────────────────────────────────

/// Lifecycle state of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Validated,
    Rejected,
}

impl NotificationStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Validated, Self::Rejected];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown notification status '{0}' (expected pending, validated or rejected)")]
pub struct ParseStatusError(pub String);

impl FromStr for NotificationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "validated" => Ok(Self::Validated),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseStatusError(s.to_owned())),
        }
    }
}

// ── Records ──────────────────────────────────────────────────────────

/// A notification as returned by the API.
///
/// `id` is optional on the wire: some records arrive without one and can
/// only be displayed, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub status: NotificationStatus,
    /// Epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

// ── Cursor ───────────────────────────────────────────────────────────

/// Opaque continuation token issued by the backend.
///
/// Carried verbatim. When the backend sends a structured key (an object
/// rather than a string) its compact JSON text, in the order the backend
/// sent the keys, becomes the token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a caller-supplied token. Blank tokens are not cursors.
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

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self(s)),
            other => Ok(Self(other.to_string())),
        }
    }
}

// ── List bodies ──────────────────────────────────────────────────────

/// The `{data, count, has_more, last_key}` envelope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListEnvelope {
    pub data: Vec<NotificationRecord>,
    pub count: Option<u64>,
    pub count_exact: bool,
    pub has_more: Option<bool>,
    pub last_key: Option<Cursor>,
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    data: Option<DataField>,
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    count_exact: Option<bool>,
    #[serde(default)]
    has_more: Option<bool>,
    #[serde(default)]
    last_key: Option<Cursor>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DataField {
    Many(Vec<NotificationRecord>),
    One(Box<NotificationRecord>),
}

impl From<RawEnvelope> for ListEnvelope {
    fn from(raw: RawEnvelope) -> Self {
        let data = match raw.data {
            Some(DataField::Many(records)) => records,
            Some(DataField::One(record)) => vec![*record],
            None => Vec::new(),
        };
        Self {
            data,
            count: raw.count,
            count_exact: raw.count_exact.unwrap_or(false),
            has_more: raw.has_more,
            last_key: raw.last_key.filter(|c| !c.as_str().trim().is_empty()),
        }
    }
}

/// Any of these at the top level marks a list envelope, even without `data`.
const ENVELOPE_KEYS: [&str; 5] = ["data", "count", "count_exact", "has_more", "last_key"];

/// Every shape a list endpoint has been seen to return.
#[derive(Debug, Clone, PartialEq)]
pub enum ListBody {
    Enveloped(ListEnvelope),
    Array(Vec<NotificationRecord>),
    Single(NotificationRecord),
    Empty,
}

/// A list response with the shape ambiguity removed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListPage {
    pub records: Vec<NotificationRecord>,
    /// Backend-reported count; advisory unless `count_exact`.
    pub count: Option<u64>,
    pub count_exact: bool,
    pub has_more: bool,
    pub last_key: Option<Cursor>,
}

impl ListBody {
    /// Classify a raw response body.
    pub fn parse(body: &str) -> Result<Self, Error> {
        if body.trim().is_empty() {
            return Ok(Self::Empty);
        }
        let value: Value = serde_json::from_str(body).map_err(|e| deser_error(&e, body))?;
        match value {
            Value::Null => Ok(Self::Empty),
            Value::Array(_) => serde_json::from_value(value)
                .map(Self::Array)
                .map_err(|e| deser_error(&e, body)),
            Value::Object(map) => {
                if map.is_empty() {
                    Ok(Self::Empty)
                } else if ENVELOPE_KEYS.iter().any(|key| map.contains_key(*key)) {
                    serde_json::from_value::<RawEnvelope>(Value::Object(map))
                        .map(|raw| Self::Enveloped(raw.into()))
                        .map_err(|e| deser_error(&e, body))
                } else {
                    serde_json::from_value(Value::Object(map))
                        .map(Self::Single)
                        .map_err(|e| deser_error(&e, body))
                }
            }
            _ => Err(Error::Deserialization {
                message: "expected a JSON object or array".into(),
                body: body.to_owned(),
            }),
        }
    }

    pub fn into_page(self) -> ListPage {
        match self {
            Self::Enveloped(env) => {
                let has_more = env.has_more.unwrap_or(env.last_key.is_some());
                ListPage {
                    records: env.data,
                    count: env.count,
                    count_exact: env.count_exact,
                    has_more,
                    last_key: env.last_key,
                }
            }
            Self::Array(records) => ListPage {
                count: u64::try_from(records.len()).ok(),
                records,
                ..ListPage::default()
            },
            Self::Single(record) => ListPage {
                records: vec![record],
                count: Some(1),
                ..ListPage::default()
            },
            Self::Empty => ListPage::default(),
        }
    }
}

/// Parse a single-record body: either `{data: {...}}` or a bare record.
pub fn parse_record(body: &str) -> Result<NotificationRecord, Error> {
    let value: Value = serde_json::from_str(body).map_err(|e| deser_error(&e, body))?;
    let inner = match value {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(inner).map_err(|e| deser_error(&e, body))
}

fn deser_error(err: &serde_json::Error, body: &str) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Deserialization {
        message: format!("{err} (body preview: {preview:?})"),
        body: body.to_owned(),
    }
}

// ── Request parameters ───────────────────────────────────────────────

/// Page window for list endpoints: `limit` + `last_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub limit: u32,
    pub last_key: Option<Cursor>,
}

impl PageParams {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.to_string())];
        if let Some(ref key) = self.last_key {
            pairs.push(("last_key", key.as_str().to_owned()));
        }
        pairs
    }
}

/// Filters accepted by `GET /notifications/search`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchParams {
    pub code: Option<String>,
    pub device_id: Option<String>,
    pub status: Option<NotificationStatus>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    /// Epoch milliseconds, inclusive.
    pub from_timestamp: Option<i64>,
    /// Epoch milliseconds, inclusive.
    pub to_timestamp: Option<i64>,
}

impl SearchParams {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref code) = self.code {
            pairs.push(("code", code.clone()));
        }
        if let Some(ref device_id) = self.device_id {
            pairs.push(("device_id", device_id.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_owned()));
        }
        if let Some(min) = self.min_amount {
            pairs.push(("min_amount", min.to_string()));
        }
        if let Some(max) = self.max_amount {
            pairs.push(("max_amount", max.to_string()));
        }
        if let Some(from) = self.from_timestamp {
            pairs.push(("from_timestamp", from.to_string()));
        }
        if let Some(to) = self.to_timestamp {
            pairs.push(("to_timestamp", to.to_string()));
        }
        pairs
    }
}

/// Body of `PUT /notifications/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateStatusBody {
    pub status: NotificationStatus,
}
