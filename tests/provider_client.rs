mod common;

use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use common::{check_auth, provider_config, spawn_provider};
use pinnacle_live_feed::config::OddsFormat;
use pinnacle_live_feed::error::FetchError;
use pinnacle_live_feed::PinnacleClient;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Seen {
    queries: Mutex<Vec<String>>,
    headers: Mutex<Vec<HeaderMap>>,
}

async fn fixtures(
    State(seen): State<Arc<Seen>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    seen.queries.lock().unwrap().push(query.unwrap_or_default());
    seen.headers.lock().unwrap().push(headers.clone());
    if let Err(rejection) = check_auth(&headers) {
        return rejection;
    }
    Json(json!({ "sportId": 29, "last": 1, "league": [] })).into_response()
}

async fn odds(State(seen): State<Arc<Seen>>, RawQuery(query): RawQuery) -> Response {
    seen.queries.lock().unwrap().push(query.unwrap_or_default());
    Json(json!({ "sportId": 29, "last": 1, "leagues": [] })).into_response()
}

fn router(seen: Arc<Seen>) -> Router {
    Router::new()
        .route("/v1/fixtures", get(fixtures))
        .route("/v1/odds", get(odds))
        .with_state(seen)
}

#[tokio::test]
async fn test_fetch_fixtures_sends_auth_headers_and_query() {
    let seen = Arc::new(Seen::default());
    let base_url = spawn_provider(router(seen.clone())).await;
    let client = PinnacleClient::new(&provider_config(&base_url)).unwrap();

    let payload = client.fetch_fixtures(29, true, None).await.unwrap();
    assert_eq!(payload["league"], json!([]));

    assert_eq!(seen.queries.lock().unwrap()[0], "sportId=29&isLive=1");
    let headers = seen.headers.lock().unwrap()[0].clone();
    assert_eq!(headers[header::ACCEPT], "application/json");
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
}

#[tokio::test]
async fn test_fetch_odds_query_parameters() {
    let seen = Arc::new(Seen::default());
    let base_url = spawn_provider(router(seen.clone())).await;
    let client = PinnacleClient::new(&provider_config(&base_url)).unwrap();

    client
        .fetch_odds(29, true, OddsFormat::Decimal, None)
        .await
        .unwrap();
    client
        .fetch_odds(29, false, OddsFormat::American, Some(1234))
        .await
        .unwrap();

    let queries = seen.queries.lock().unwrap().clone();
    assert_eq!(queries[0], "sportId=29&isLive=1&oddsFormat=Decimal");
    assert_eq!(
        queries[1],
        "sportId=29&isLive=0&oddsFormat=American&since=1234"
    );
}

#[tokio::test]
async fn test_wrong_credentials_is_status_error() {
    let seen = Arc::new(Seen::default());
    let base_url = spawn_provider(router(seen)).await;
    let mut config = provider_config(&base_url);
    config.password = "wrong".to_string();
    let client = PinnacleClient::new(&config).unwrap();

    match client.fetch_fixtures(29, true, None).await {
        Err(FetchError::Status { status, url }) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert!(url.ends_with("v1/fixtures?sportId=29&isLive=1"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_status_error() {
    let app = Router::new().route(
        "/v1/odds",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base_url = spawn_provider(app).await;
    let client = PinnacleClient::new(&provider_config(&base_url)).unwrap();

    let result = client.fetch_odds(29, true, OddsFormat::Decimal, None).await;
    assert!(matches!(
        result,
        Err(FetchError::Status { status, .. }) if status == StatusCode::INTERNAL_SERVER_ERROR
    ));
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let app = Router::new().route("/v1/fixtures", get(|| async { "<html>maintenance</html>" }));
    let base_url = spawn_provider(app).await;
    let client = PinnacleClient::new(&provider_config(&base_url)).unwrap();

    let result = client.fetch_fixtures(29, true, None).await;
    assert!(matches!(result, Err(FetchError::Decode { .. })));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let app = Router::new().route(
        "/v1/fixtures",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "league": [] }))
        }),
    );
    let base_url = spawn_provider(app).await;
    let mut config = provider_config(&base_url);
    config.timeout = Duration::from_millis(200);
    let client = PinnacleClient::new(&config).unwrap();

    let result = client.fetch_fixtures(29, true, None).await;
    assert!(matches!(result, Err(FetchError::Transport { .. })));
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = PinnacleClient::new(&provider_config(&format!("http://{}/", addr))).unwrap();
    let result = client.fetch_fixtures(29, true, None).await;
    assert!(matches!(result, Err(FetchError::Transport { .. })));
}
