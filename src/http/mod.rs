//! HTTP endpoints for pair-relay.
//!
//! Binds the two relay operations (`/send`, `/receive`) plus health and
//! metrics. Caller misuse — a missing receiver key or an oversized payload —
//! is rejected here with a status code and never reaches the core. The
//! protocol is consumed by untrusted web clients, so every response carries
//! permissive CORS headers.

pub mod health;
mod metrics;

use crate::server::MailboxRelay;
use axum::{
    extract::{Query, Request},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub use health::HealthStatus;

/// Build the HTTP router with all endpoints.
pub fn build_router(relay: Arc<MailboxRelay>) -> Router {
    Router::new()
        .route("/send", get(send_handler).post(send_handler))
        .route("/receive", get(receive_handler))
        .route("/health", get(health::health_handler))
        .route("/metrics", get(metrics::metrics_handler))
        .layer(Extension(relay))
        .layer(middleware::from_fn(cors))
}

/// Query parameters for `/send`.
#[derive(Debug, Deserialize)]
struct SendParams {
    receiver: Option<String>,
    message: Option<String>,
}

/// Query parameters for `/receive`.
#[derive(Debug, Deserialize)]
struct ReceiveParams {
    receiver: Option<String>,
}

/// Deposit a message for a receiver key.
///
/// `GET` takes the payload from the `message` query parameter, `POST` from
/// the raw request body. Responds with `ok` on success.
async fn send_handler(
    Extension(relay): Extension<Arc<MailboxRelay>>,
    method: Method,
    Query(params): Query<SendParams>,
    body: String,
) -> Response {
    let Some(receiver) = params.receiver else {
        return reject(&relay, StatusCode::BAD_REQUEST, "missing receiver");
    };

    let message = if method == Method::GET {
        match params.message {
            Some(message) => message,
            None => return reject(&relay, StatusCode::BAD_REQUEST, "missing message"),
        }
    } else {
        body
    };

    if message.len() > relay.config().mailbox.max_payload_bytes {
        return reject(&relay, StatusCode::PAYLOAD_TOO_LARGE, "payload too large");
    }

    relay.deposit(&receiver, message);
    "ok".into_response()
}

/// Long-poll for a message addressed to a receiver key.
///
/// Held open until a deposit arrives or the server-side await timeout
/// elapses. The body is JSON: the delivered string, or `null` on timeout.
async fn receive_handler(
    Extension(relay): Extension<Arc<MailboxRelay>>,
    Query(params): Query<ReceiveParams>,
) -> Response {
    let Some(receiver) = params.receiver else {
        return reject(&relay, StatusCode::BAD_REQUEST, "missing receiver");
    };

    let message = relay.receive(&receiver).await;
    Json(message).into_response()
}

fn reject(relay: &MailboxRelay, status: StatusCode, reason: &'static str) -> Response {
    relay.metrics().rejected_total.fetch_add(1, Ordering::Relaxed);
    tracing::debug!("Rejected request: {}", reason);
    (status, reason).into_response()
}

/// Permissive CORS for untrusted web clients.
///
/// Answers `OPTIONS` preflights directly and stamps every other response.
async fn cors(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, GET, OPTIONS, PUT, DELETE"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::{to_bytes, Body};
    // Shadows the glob-imported `extract::Request` so `Request::builder()`
    // infers an empty body type.
    use axum::http::Request;
    use tower::util::ServiceExt;

    fn test_relay() -> Arc<MailboxRelay> {
        let mut config = Config::default();
        config.mailbox.await_timeout_secs = 1;
        config.mailbox.max_payload_bytes = 1024;
        Arc::new(MailboxRelay::new(config))
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn post_send_then_receive_round_trips() {
        let relay = test_relay();
        let app = build_router(relay);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/send?receiver=bob")
                    .body(Body::from("hello"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "ok");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/receive?receiver=bob")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "\"hello\"");
    }

    #[tokio::test]
    async fn get_send_takes_message_from_query() {
        let relay = test_relay();
        let app = build_router(relay);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/send?receiver=bob&message=hi")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/receive?receiver=bob")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "\"hi\"");
    }

    #[tokio::test]
    async fn receive_timeout_serializes_null() {
        let mut config = Config::default();
        config.mailbox.await_timeout_secs = 0;
        let app = build_router(Arc::new(MailboxRelay::new(config)));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/receive?receiver=nobody")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "null");
    }

    #[tokio::test]
    async fn send_without_receiver_is_rejected() {
        let relay = test_relay();
        let app = build_router(relay.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/send")
                    .body(Body::from("orphan"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(relay.metrics().rejected_total.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn receive_without_receiver_is_rejected() {
        let app = build_router(test_relay());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/receive")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_send_without_message_is_rejected() {
        let app = build_router(test_relay());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/send?receiver=bob")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_payload_is_rejected() {
        let relay = test_relay();
        let app = build_router(relay.clone());

        let big = "x".repeat(2048);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/send?receiver=bob")
                    .body(Body::from(big))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(relay.metrics().deposits_total.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn responses_carry_cors_headers() {
        let app = build_router(test_relay());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/send?receiver=bob&message=hi")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_METHODS)
                .unwrap(),
            "POST, GET, OPTIONS, PUT, DELETE"
        );
    }

    #[tokio::test]
    async fn options_preflight_is_answered() {
        let app = build_router(test_relay());

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/send")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = build_router(test_relay());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_returns_ok() {
        let app = build_router(test_relay());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("pair_relay_deposits_total"));
    }
}
