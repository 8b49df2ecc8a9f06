// ── Display formatting for amounts and timestamps ──

use chrono::{DateTime, Local, TimeZone};

/// Currency prefix used for amounts (Peruvian sol).
pub const CURRENCY_PREFIX: &str = "S/";

/// `Some(12.5)` → `"S/ 12.50"`, `None` → `"-"`.
pub fn format_amount(amount: Option<f64>) -> String {
    match amount {
        Some(value) if value.is_finite() => format!("{CURRENCY_PREFIX} {value:.2}"),
        _ => "-".to_owned(),
    }
}

/// Epoch milliseconds → `dd/mm/yyyy, HH:MM` in local time.
pub fn format_timestamp(millis: i64) -> String {
    format_timestamp_in(&Local, millis)
}

/// Same as [`format_timestamp`] for an explicit zone.
pub fn format_timestamp_in<Tz: TimeZone>(tz: &Tz, millis: i64) -> String
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp_millis(millis).map_or_else(
        || "-".to_owned(),
        |utc| utc.with_timezone(tz).format("%d/%m/%Y, %H:%M").to_string(),
    )
}
