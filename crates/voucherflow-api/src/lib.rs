// voucherflow-api: Async Rust client for the VoucherFlow notifications REST API

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use client::NotificationsClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    Cursor, ListBody, ListEnvelope, ListPage, NotificationRecord, NotificationStatus, PageParams,
    ParseStatusError, SearchParams,
};
