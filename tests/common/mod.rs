#![allow(dead_code)]

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use pinnacle_live_feed::config::ProviderConfig;
use std::time::Duration;

/// `Basic` header for user "user" and password "secret"
pub const EXPECTED_AUTH: &str = "Basic dXNlcjpzZWNyZXQ=";

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn_provider(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

pub fn provider_config(base_url: &str) -> ProviderConfig {
    let mut config = ProviderConfig::new("user", "secret");
    config.base_url = base_url.to_string();
    config.timeout = Duration::from_secs(2);
    config
}

/// Reject requests without the expected credentials
pub fn check_auth(headers: &HeaderMap) -> Result<(), Response> {
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == EXPECTED_AUTH => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "bad credentials").into_response()),
    }
}
