// Async HTTP client for the notifications REST API.
//
// Endpoints:
//   GET  /notifications                     ?limit&last_key
//   GET  /notifications/status/{status}     ?limit&last_key
//   GET  /notifications/device/{device_id}  ?limit&last_key
//   GET  /notifications/search              ?code&device_id&status&min_amount&...
//   GET  /notifications/{id}
//   PUT  /notifications/{id}/status         {status}

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{
    ListBody, ListPage, NotificationRecord, NotificationStatus, PageParams, SearchParams,
    UpdateStatusBody, parse_record,
};

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the notifications API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct NotificationsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NotificationsClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Keep any path prefix (API gateway stage etc.) and make sure the
    /// base ends with a slash so segments append instead of replace.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        url.set_query(None);
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments (percent-encoded) to the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get_text(&self, url: Url, params: &[(&str, String)]) -> Result<String, Error> {
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        Self::handle_response(resp).await
    }

    async fn put_text<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<String, Error> {
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn get_list(&self, url: Url, params: &[(&str, String)]) -> Result<ListPage, Error> {
        let body = self.get_text(url, params).await?;
        Ok(ListBody::parse(&body)?.into_page())
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp.text().await?)
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let path = resp.url().path().to_owned();
        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.message.or(e.error))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Error::Unauthorized {
                    status: status.as_u16(),
                    message,
                }
            }
            reqwest::StatusCode::NOT_FOUND => Error::NotFound { path },
            reqwest::StatusCode::TOO_MANY_REQUESTS => Error::RateLimited {
                retry_after_secs: retry_after.unwrap_or(1),
            },
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `GET /notifications`
    pub async fn list(&self, page: &PageParams) -> Result<ListPage, Error> {
        self.get_list(self.url(&["notifications"])?, &page.query_pairs())
            .await
    }

    /// `GET /notifications/status/{status}`
    pub async fn list_by_status(
        &self,
        status: NotificationStatus,
        page: &PageParams,
    ) -> Result<ListPage, Error> {
        self.get_list(
            self.url(&["notifications", "status", status.as_str()])?,
            &page.query_pairs(),
        )
        .await
    }

    /// `GET /notifications/device/{device_id}`
    pub async fn list_by_device(
        &self,
        device_id: &str,
        page: &PageParams,
    ) -> Result<ListPage, Error> {
        self.get_list(
            self.url(&["notifications", "device", device_id])?,
            &page.query_pairs(),
        )
        .await
    }

    /// `GET /notifications/search`
    pub async fn search(
        &self,
        filters: &SearchParams,
        page: &PageParams,
    ) -> Result<ListPage, Error> {
        let mut params = filters.query_pairs();
        params.extend(page.query_pairs());
        self.get_list(self.url(&["notifications", "search"])?, &params)
            .await
    }

    /// `GET /notifications/{id}`
    pub async fn get(&self, id: &str) -> Result<NotificationRecord, Error> {
        let body = self.get_text(self.url(&["notifications", id])?, &[]).await?;
        parse_record(&body)
    }

    /// `PUT /notifications/{id}/status`
    pub async fn update_status(
        &self,
        id: &str,
        status: NotificationStatus,
    ) -> Result<NotificationRecord, Error> {
        let body = self
            .put_text(
                self.url(&["notifications", id, "status"])?,
                &UpdateStatusBody { status },
            )
            .await?;
        parse_record(&body)
    }
}
