use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

use telegram_parser::errors::FetchError;
use telegram_parser::models::MessageSnapshot;
use telegram_parser::telegram::{ChannelRef, TelegramApi};
use telegram_parser::web::{router, AppState};

/// Scriptable stand-in for the remote Telegram layer
#[derive(Default)]
struct MockTelegram {
    missing_post: bool,
    flood_wait: Option<u32>,
    fail_best_effort: bool,
}

#[async_trait]
impl TelegramApi for MockTelegram {
    async fn resolve_channel(&self, username: &str) -> Result<ChannelRef, FetchError> {
        Ok(ChannelRef {
            id: 1000,
            access_hash: Some(7),
            username: username.to_string(),
            title: "Example Channel".to_string(),
        })
    }

    async fn fetch_message(
        &self,
        channel: &ChannelRef,
        message_id: i32,
    ) -> Result<MessageSnapshot, FetchError> {
        if let Some(seconds) = self.flood_wait {
            return Err(FetchError::RateLimited {
                retry_after: seconds,
            });
        }
        if self.missing_post {
            return Err(FetchError::PostNotFound {
                channel: channel.username.clone(),
                message_id,
            });
        }

        let reactions: BTreeMap<String, u64> = [("👍".to_string(), 5), ("❤️".to_string(), 3)]
            .into_iter()
            .collect();

        Ok(MessageSnapshot {
            views: 1000,
            date: None,
            reactions,
            photo_id: None,
        })
    }

    async fn fetch_comment_count(
        &self,
        _channel: &ChannelRef,
        _message_id: i32,
    ) -> Result<u64, FetchError> {
        if self.fail_best_effort {
            return Err(FetchError::unknown("comments unavailable"));
        }
        Ok(2)
    }

    async fn fetch_forward_count(
        &self,
        _channel: &ChannelRef,
        _message_id: i32,
    ) -> Result<u64, FetchError> {
        if self.fail_best_effort {
            return Err(FetchError::unknown("forwards unavailable"));
        }
        Ok(1)
    }

    async fn fetch_subscriber_count(
        &self,
        _channel: &ChannelRef,
    ) -> Result<Option<u64>, FetchError> {
        if self.fail_best_effort {
            return Err(FetchError::unknown("full channel unavailable"));
        }
        Ok(Some(5000))
    }
}

fn app_with(mock: MockTelegram, allowed_ips: &[&str]) -> Router {
    let allowed: Vec<String> = allowed_ips.iter().map(|ip| ip.to_string()).collect();
    let state = AppState::new(&allowed, Arc::new(mock)).unwrap();
    router(state)
}

// Helper function to send requests to the app
async fn send_request(
    app: &Router,
    method: Method,
    uri: &str,
    caller: &str,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let addr: SocketAddr = format!("{caller}:55555").parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(json!({}))
    };

    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app_with(MockTelegram::default(), &[]);

    let (status, response) = send_request(&app, Method::GET, "/health", "127.0.0.1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "ok");
    assert_eq!(response["service"], "telegram-parser");
}

#[tokio::test]
async fn test_parse_happy_path() {
    let app = app_with(MockTelegram::default(), &[]);

    let (status, response) = send_request(
        &app,
        Method::GET,
        "/parse?url=https://t.me/examplechan/99",
        "127.0.0.1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["success"], true);
    assert_eq!(response["channel"], "examplechan");
    assert_eq!(response["channel_id"], 1000);
    assert_eq!(response["message_id"], 99);
    assert_eq!(response["views"], 1000);
    assert_eq!(response["reactions"]["👍"], 5);
    assert_eq!(response["reactions"]["❤️"], 3);
    assert_eq!(response["total_reactions"], 8);
    assert_eq!(response["comments"], 2);
    assert_eq!(response["reposts"], 1);
    assert_eq!(response["has_reactions"], true);
    assert_eq!(response["channel_subscribers"], 5000);
}

#[tokio::test]
async fn test_parse_invalid_url() {
    let app = app_with(MockTelegram::default(), &[]);

    let (status, response) = send_request(&app, Method::GET, "/parse?url=not-a-url", "127.0.0.1").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);
    assert_eq!(response["error_code"], "INVALID_URL");
}

#[tokio::test]
async fn test_parse_post_not_found() {
    let app = app_with(
        MockTelegram {
            missing_post: true,
            ..Default::default()
        },
        &[],
    );

    let (status, response) = send_request(
        &app,
        Method::GET,
        "/parse?url=https://t.me/examplechan/12345",
        "127.0.0.1",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error_code"], "POST_NOT_FOUND");
}

#[tokio::test]
async fn test_parse_rate_limited() {
    let app = app_with(
        MockTelegram {
            flood_wait: Some(30),
            ..Default::default()
        },
        &[],
    );

    let (status, response) = send_request(
        &app,
        Method::GET,
        "/parse?url=https://t.me/examplechan/99",
        "127.0.0.1",
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response["error_code"], "TELEGRAM_RATE_LIMIT");
    assert!(response["error"].as_str().unwrap().contains("30"));
}

#[tokio::test]
async fn test_parse_best_effort_degrades_to_defaults() {
    let app = app_with(
        MockTelegram {
            fail_best_effort: true,
            ..Default::default()
        },
        &[],
    );

    let (status, response) = send_request(
        &app,
        Method::GET,
        "/parse?url=https://t.me/examplechan/99",
        "127.0.0.1",
    )
    .await;

    // the request still succeeds with the mandatory data
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["views"], 1000);
    assert_eq!(response["total_reactions"], 8);
    assert_eq!(response["comments"], 0);
    assert_eq!(response["reposts"], 0);
    assert_eq!(response["channel_subscribers"], Value::Null);
    // metadata known from channel resolution survives the failed call
    assert_eq!(response["channel_name"], "Example Channel");
    assert_eq!(
        response["channel_thumbnail_url"],
        "https://t.me/i/userpic/320/examplechan.jpg"
    );
}

#[tokio::test]
async fn test_parse_missing_url_parameter() {
    let app = app_with(MockTelegram::default(), &[]);

    let (status, response) = send_request(&app, Method::GET, "/parse", "127.0.0.1").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);
    assert_eq!(response["error_code"], "INVALID_URL");
}

#[tokio::test]
async fn test_allowlist_empty_allows_everyone() {
    let app = app_with(MockTelegram::default(), &[]);

    let (status, _) = send_request(&app, Method::GET, "/health", "203.0.113.7").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_allowlist_permits_listed_caller() {
    let app = app_with(MockTelegram::default(), &["203.0.113.7"]);

    let (status, response) = send_request(
        &app,
        Method::GET,
        "/parse?url=https://t.me/examplechan/99",
        "203.0.113.7",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["success"], true);
}

#[tokio::test]
async fn test_allowlist_rejects_preflight_from_unlisted_caller() {
    let app = app_with(MockTelegram::default(), &["203.0.113.7"]);

    // CORS must not answer the preflight before the allowlist check runs
    let mut request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/parse")
        .header("origin", "https://example.com")
        .header("access-control-request-method", "GET")
        .body(Body::empty())
        .unwrap();
    let addr: SocketAddr = "198.51.100.9:55555".parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_allowlist_rejects_unlisted_caller() {
    let app = app_with(MockTelegram::default(), &["203.0.113.7"]);

    let (status, response) = send_request(&app, Method::GET, "/health", "198.51.100.9").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["success"], false);
    assert_eq!(response["error"], "Access denied");
    assert_eq!(response["error_code"], "FORBIDDEN");
}
