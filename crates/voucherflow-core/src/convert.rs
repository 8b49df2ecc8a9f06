// ── API-to-domain type conversions ──
//
// Bridges raw `voucherflow_api` wire types into canonical
// `voucherflow_core::model` types. Blank identifiers and device ids
// collapse to `None` here so nothing downstream has to re-check them.

use voucherflow_api::{NotificationRecord, NotificationStatus as WireStatus};

use crate::model::{Notification, NotificationId, NotificationStatus};

impl From<WireStatus> for NotificationStatus {
    fn from(status: WireStatus) -> Self {
        match status {
            WireStatus::Pending => Self::Pending,
            WireStatus::Validated => Self::Validated,
            WireStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<NotificationStatus> for WireStatus {
    fn from(status: NotificationStatus) -> Self {
        match status {
            NotificationStatus::Pending => Self::Pending,
            NotificationStatus::Validated => Self::Validated,
            NotificationStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<NotificationRecord> for Notification {
    fn from(rec: NotificationRecord) -> Self {
        Self {
            id: rec.id.and_then(NotificationId::new),
            code: rec.code,
            name: rec.name,
            status: rec.status.into(),
            timestamp: rec.timestamp,
            amount: rec.amount.filter(|a| a.is_finite()),
            device_id: rec.device_id.filter(|d| !d.trim().is_empty()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_become_none() {
        let rec = NotificationRecord {
            id: Some("  ".into()),
            code: "V-1".into(),
            name: "Ana".into(),
            status: WireStatus::Rejected,
            timestamp: 5,
            amount: None,
            device_id: Some(String::new()),
        };
        let n = Notification::from(rec);
        assert!(n.id.is_none());
        assert!(n.device_id.is_none());
        assert_eq!(n.status, NotificationStatus::Rejected);
    }

    #[test]
    fn backend_id_is_not_trimmed() {
        let rec = NotificationRecord {
            id: Some(" n1 ".into()),
            code: "V-1".into(),
            name: "Ana".into(),
            status: WireStatus::Pending,
            timestamp: 5,
            amount: Some(3.0),
            device_id: None,
        };
        assert_eq!(Notification::from(rec).id.unwrap().as_str(), " n1 ");
    }
}
