// ── Filter criteria ──
//
// `FilterInput` is what callers hand us: optional strings, straight from a
// form, a query string, or CLI flags. `FilterCriteria` is the normalized
// form: typed, trimmed, with anything malformed already dropped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::form_urlencoded;

use voucherflow_api::Cursor;

use crate::model::NotificationStatus;

/// Status filter value meaning "no status filter".
pub const STATUS_ALL: &str = "all";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw, caller-supplied filters. Every field is optional text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_max: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_key: Option<String>,
}

impl FilterInput {
    /// Read filters from a URL query string (`code=..&deviceId=..`).
    ///
    /// Unknown keys are ignored; a repeated key keeps its last value.
    pub fn from_query(query: &str) -> Self {
        let mut input = Self::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            if let Some(slot) = input.slot_mut(&key) {
                *slot = Some(value.into_owned());
            }
        }
        input
    }

    /// Query-string name/value pairs, skipping blanks and `status=all`.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        self.fields()
            .into_iter()
            .filter_map(|(key, raw)| {
                let value = present(raw)?;
                match key {
                    "status" if value.eq_ignore_ascii_case(STATUS_ALL) => None,
                    // Cursors go back out byte-for-byte.
                    "lastKey" => raw.map(|r| (key, r)),
                    _ => Some((key, value)),
                }
            })
            .collect()
    }

    /// True when no field carries a usable value.
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    fn fields(&self) -> [(&'static str, Option<&str>); 8] {
        [
            ("code", self.code.as_deref()),
            ("deviceId", self.device_id.as_deref()),
            ("status", self.status.as_deref()),
            ("amountMin", self.amount_min.as_deref()),
            ("amountMax", self.amount_max.as_deref()),
            ("dateFrom", self.date_from.as_deref()),
            ("dateTo", self.date_to.as_deref()),
            ("lastKey", self.last_key.as_deref()),
        ]
    }

    pub(crate) fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "code" => Some(&mut self.code),
            "deviceId" => Some(&mut self.device_id),
            "status" => Some(&mut self.status),
            "amountMin" => Some(&mut self.amount_min),
            "amountMax" => Some(&mut self.amount_max),
            "dateFrom" => Some(&mut self.date_from),
            "dateTo" => Some(&mut self.date_to),
            "lastKey" => Some(&mut self.last_key),
            _ => None,
        }
    }
}

// ── Normalized criteria ─────────────────────────────────────────────

/// Filters after normalization. Absent means "not constrained".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub code: Option<String>,
    pub device_id: Option<String>,
    pub status: Option<NotificationStatus>,
    pub amount_min: Option<f64>,
    pub amount_max: Option<f64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub cursor: Option<Cursor>,
}

impl FilterCriteria {
    /// Normalize raw input. Never fails: malformed values are dropped.
    pub fn from_input(input: &FilterInput) -> Self {
        Self {
            code: present(input.code.as_deref()).map(str::to_owned),
            device_id: present(input.device_id.as_deref()).map(str::to_owned),
            status: parse_status(input.status.as_deref()),
            amount_min: parse_amount(input.amount_min.as_deref()),
            amount_max: parse_amount(input.amount_max.as_deref()),
            date_from: parse_date("dateFrom", input.date_from.as_deref()),
            date_to: parse_date("dateTo", input.date_to.as_deref()),
            // Cursors are opaque: only blank ones are discarded, nothing is trimmed.
            cursor: input.last_key.clone().and_then(Cursor::new),
        }
    }

    /// Any field that only the search endpoint can express.
    pub fn needs_search(&self) -> bool {
        self.code.is_some()
            || self.amount_min.is_some()
            || self.amount_max.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_status(raw: Option<&str>) -> Option<NotificationStatus> {
    let raw = present(raw)?;
    if raw.eq_ignore_ascii_case(STATUS_ALL) {
        return None;
    }
    match raw.parse() {
        Ok(status) => Some(status),
        Err(_) => {
            warn!(status = raw, "ignoring unknown status filter");
            None
        }
    }
}

fn parse_amount(raw: Option<&str>) -> Option<f64> {
    present(raw)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_date(field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = present(raw)?;
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(field, value = raw, error = %e, "ignoring unparseable date filter");
            None
        }
    }
}
