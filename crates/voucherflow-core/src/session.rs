// ── Session context ──
//
// One `Session` per configured API: the HTTP client plus the runtime
// config it was built from. Created once by the caller and passed into
// every service operation; there is no process-wide client.

use voucherflow_api::transport::{TlsMode, TransportConfig};
use voucherflow_api::{Credentials, NotificationsClient};

use crate::config::{ApiConfig, TlsVerification};
use crate::error::CoreError;

/// Client + config for one notifications API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Session {
    client: NotificationsClient,
    config: ApiConfig,
}

impl Session {
    /// Build the HTTP client described by `config`.
    pub fn new(config: ApiConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = NotificationsClient::new(config.url.as_str(), &transport)?;
        Ok(Self { client, config })
    }

    /// Use an already-built client (tests, custom middleware).
    pub fn with_client(client: NotificationsClient, config: ApiConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &NotificationsClient {
        &self.client
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The caller's page size, or the configured default.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .filter(|n| *n > 0)
            .unwrap_or(self.config.default_page_size)
            .max(1)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn build_transport(config: &ApiConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        credentials: Credentials::from_token(config.token.clone()),
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
