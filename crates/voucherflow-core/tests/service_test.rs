#![allow(clippy::unwrap_used)]
// Integration tests for the service layer against a wiremock API.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voucherflow_core::{
    ApiConfig, CoreError, FilterInput, NotificationStatus, QueryMode, RetryPolicy, Session,
    collect_all, fetch_page, fetch_page_cancellable, get_notification, get_notifications,
    resolve, update_notification_status, update_status_checked,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Session) {
    let server = MockServer::start().await;
    let mut config = ApiConfig::new(server.uri().parse().unwrap());
    config.retry = RetryPolicy {
        max_retries: 2,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
    };
    let session = Session::new(config).unwrap();
    (server, session)
}

fn record(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "code": format!("V-{id}"),
        "name": "Carlos Quispe",
        "status": status,
        "timestamp": 1_705_300_000_000_i64,
        "amount": 40.0,
        "device_id": "POS-1"
    })
}

fn status_filter(status: &str) -> FilterInput {
    FilterInput {
        status: Some(status.into()),
        ..FilterInput::default()
    }
}

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pending_first_page() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/notifications/status/pending"))
        .and(query_param("limit", "20"))
        .and(query_param_is_missing("last_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [record("a", "pending"), record("b", "pending"), record("c", "pending")],
            "count": 3,
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = get_notifications(&session, 1, Some(20), Some(&status_filter("pending"))).await;

    assert!(result.success);
    assert_eq!(result.data.len(), 3);
    assert_eq!(
        serde_json::to_value(&result.pagination).unwrap(),
        json!({"page": 1, "pageSize": 20, "total": 3, "totalPages": 1, "hasMore": false})
    );
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_default_page_size_from_config() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/notifications"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let result = get_notifications(&session, 1, None, None).await;
    assert!(result.success);
    assert!(result.data.is_empty());
    assert!(!result.pagination.has_more);
}

#[tokio::test]
async fn test_envelope_without_data_is_empty_success() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/notifications/status/rejected"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "count": 0, "has_more": false })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = get_notifications(&session, 1, Some(20), Some(&status_filter("rejected"))).await;

    assert!(result.success, "error: {:?}", result.error);
    assert!(result.data.is_empty());
    assert!(!result.pagination.has_more);
    assert_eq!(result.pagination.total, 0);
}

#[tokio::test]
async fn test_search_carries_every_constraint() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/notifications/search"))
        .and(query_param("code", "V-a"))
        .and(query_param("status", "pending"))
        .and(query_param("device_id", "POS-1"))
        .and(query_param("min_amount", "10.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [record("a", "pending")],
            "count": 1,
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filters = FilterInput {
        code: Some("V-a".into()),
        status: Some("pending".into()),
        device_id: Some("POS-1".into()),
        amount_min: Some("10.5".into()),
        amount_max: Some("not a number".into()),
        ..FilterInput::default()
    };
    let result = get_notifications(&session, 1, Some(20), Some(&filters)).await;
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.data[0].code, "V-a");
}

#[tokio::test]
async fn test_failure_becomes_result_value() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/notifications/device/POS-9"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "table offline" })))
        .mount(&server)
        .await;

    let filters = FilterInput {
        device_id: Some("POS-9".into()),
        ..FilterInput::default()
    };
    let result = get_notifications(&session, 4, Some(50), Some(&filters)).await;

    assert!(!result.success);
    assert!(result.data.is_empty());
    assert!(result.error.unwrap().contains("table offline"));
    assert_eq!(
        serde_json::to_value(&result.pagination).unwrap(),
        json!({"page": 1, "pageSize": 50, "total": 0, "totalPages": 0, "hasMore": false})
    );
}

// ── Pagination ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_forward_navigation_forwards_cursor() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/notifications"))
        .and(query_param_is_missing("last_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [record("a", "pending")],
            "count": 2,
            "has_more": true,
            "last_key": {"id": "a", "timestamp": 1_705_300_000_000_i64}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .and(query_param("last_key", r#"{"id":"a","timestamp":1705300000000}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [record("b", "validated")],
            "count": 2,
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let first_query = resolve(1, 1, &FilterInput::default());
    let first = fetch_page(&session, &first_query).await.unwrap();
    assert!(first.state.has_next());
    assert_eq!(first.state.total_pages(), 2);

    let second_query = first.query.at(&first.state.next());
    let second = fetch_page(&session, &second_query).await.unwrap();
    assert_eq!(second.state.page, 2);
    assert_eq!(second.notifications[0].status, NotificationStatus::Validated);
    assert!(!second.state.has_next());

    // going back never reuses a later cursor
    let back = second.state.previous();
    assert_eq!(back.page, 1);
    assert!(back.cursor.is_none());
}

#[tokio::test]
async fn test_collect_all_follows_cursors() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/notifications/status/rejected"))
        .and(query_param_is_missing("last_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [record("a", "rejected"), record("b", "rejected")],
            "has_more": true,
            "last_key": "k1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notifications/status/rejected"))
        .and(query_param("last_key", "k1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [record("c", "rejected")],
            "has_more": false
        })))
        .mount(&server)
        .await;

    let all = collect_all(&session, &status_filter("rejected"), Some(2), 10)
        .await
        .unwrap();
    assert_eq!(all.notifications.len(), 3);
    assert_eq!(all.pages_fetched, 2);
    assert!(all.complete);

    let capped = collect_all(&session, &status_filter("rejected"), Some(2), 1)
        .await
        .unwrap();
    assert_eq!(capped.notifications.len(), 2);
    assert!(!capped.complete);
}

#[tokio::test]
async fn test_transient_read_failures_are_retried() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record("a", "pending")])))
        .mount(&server)
        .await;

    let result = get_notifications(&session, 1, Some(20), None).await;
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.data.len(), 1);
}

#[tokio::test]
async fn test_cancelled_fetch_is_discarded() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/notifications"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [] }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let query = resolve(1, 20, &FilterInput::default());
    assert_eq!(query.mode(), QueryMode::All);
    let result = fetch_page_cancellable(&session, &query, &cancel).await;
    assert!(matches!(result, Err(CoreError::Cancelled)));
}

// ── Status updates ──────────────────────────────────────────────────

#[tokio::test]
async fn test_update_status() {
    let (server, session) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/notifications/abc123/status"))
        .and(body_json(json!({ "status": "validated" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": record("abc123", "validated") })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = update_notification_status(&session, "abc123", "validated").await;
    assert!(result.success);
    let updated = result.data.unwrap();
    assert_eq!(updated.id.unwrap().as_str(), "abc123");
    assert_eq!(updated.status, NotificationStatus::Validated);
}

#[tokio::test]
async fn test_invalid_update_never_hits_network() {
    let (server, session) = setup().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for (id, status) in [("", "validated"), ("abc", "all"), ("abc", "done")] {
        let result = update_notification_status(&session, id, status).await;
        assert!(!result.success, "{id:?}/{status:?}");
        assert!(result.data.is_none());
        assert!(result.error.unwrap().starts_with("Validation failed"));
    }
}

#[tokio::test]
async fn test_status_update_is_not_retried() {
    let (server, session) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/notifications/abc/status"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let result = update_notification_status(&session, "abc", "rejected").await;
    assert!(!result.success);
}

#[tokio::test]
async fn test_checked_update_detects_conflict() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/notifications/abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": record("abc", "rejected") })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = update_status_checked(
        &session,
        "abc",
        NotificationStatus::Validated,
        NotificationStatus::Pending,
    )
    .await
    .unwrap_err();
    assert!(
        matches!(err, CoreError::Conflict { ref actual, .. } if actual == "rejected"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_missing_notification_names_the_id() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/notifications/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = get_notification(&session, "ghost").await.unwrap_err();
    assert!(
        matches!(err, CoreError::NotFound { ref identifier } if identifier == "ghost"),
        "got: {err:?}"
    );
}
