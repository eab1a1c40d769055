//! Integration tests for the HTTP API

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use kuji::core::{create_router, Catalogue, Recognizer};
use kuji::RecognizerConfig;
use serde_json::Value;
use tower::ServiceExt;

fn create_test_router() -> Router {
    let catalogue = Catalogue::builder(&["en"])
        .symbol(&["A"])
        .symbol(&["B"])
        .symbol(&["C"])
        .sequence(&[""], &["Fireball"], &[0, 1, 2])
        .build()
        .unwrap();
    let config = RecognizerConfig {
        score_threshold: 0.5,
        inactivity_timeout: 10.0,
        ..Default::default()
    };
    create_router(Recognizer::new(Arc::new(catalogue), config).unwrap())
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], kuji::VERSION);
    assert_eq!(json["symbols"], 3);
    assert_eq!(json["sequences"], 1);
    assert_eq!(json["catalogue_digest"].as_str().map(str::len), Some(64));
}

#[tokio::test]
async fn test_tick_accepts_sign() {
    let app = create_test_router();

    let response = app
        .oneshot(post_json(
            "/tick",
            r#"{"t": 0.0, "detections": [{"symbol": 1, "confidence": 0.9}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["mode"], "SHOWING_TRAIL");
    assert_eq!(json["text"], "B");
    assert_eq!(json["accepted"], 1);
    assert_eq!(json["reason"], "R001_SIGN_ACCEPTED");
}

#[tokio::test]
async fn test_tick_sequence_then_state() {
    let app = create_test_router();

    for (t, symbol) in [(0.0, 0), (1.0, 1), (2.0, 2)] {
        let body = format!(
            r#"{{"t": {:.1}, "detections": [{{"symbol": {}, "confidence": 0.9}}]}}"#,
            t, symbol
        );
        let response = app.clone().oneshot(post_json("/tick", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // server clock is clamped to the last tick, so the match is still on screen
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/state").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["window_len"], 3);
    assert_eq!(json["mode"], "SHOWING_MATCH");

    let response = app
        .oneshot(post_json("/tick", r#"{"t": 3.0}"#))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["mode"], "SHOWING_MATCH");
    assert_eq!(json["text"], "Fireball");
    assert_eq!(json["match_index"], 0);
}

#[tokio::test]
async fn test_reset_clears_history() {
    let app = create_test_router();

    app.clone()
        .oneshot(post_json(
            "/tick",
            r#"{"t": 0.0, "detections": [{"symbol": 0, "confidence": 0.9}]}"#,
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reset")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["reason"], "R002_HISTORY_RESET");
    assert_eq!(json["window_len"], 0);
    assert_eq!(json["trail"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_catalogue_endpoint() {
    let app = create_test_router();

    let response = app
        .oneshot(Request::builder().uri("/catalogue").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["languages"][0], "en");
    assert_eq!(json["sequences"][0]["name"], "Fireball");
    assert_eq!(json["sequences"][0]["signs"], "A B C");
    assert_eq!(json["sequences"][0]["symbols"], serde_json::json!([0, 1, 2]));
}

#[tokio::test]
async fn test_malformed_tick_rejected() {
    let app = create_test_router();

    let response = app
        .oneshot(post_json("/tick", r#"{"detections": "nope"}"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

/// A client driving its own timeline through `t` must not see /state answered
/// from an earlier server time
#[tokio::test]
async fn test_state_follows_client_timeline() {
    let app = create_test_router();

    for (t, symbol) in [(100.0, 0), (101.0, 1), (102.0, 2)] {
        let body = format!(
            r#"{{"t": {:.1}, "detections": [{{"symbol": {}, "confidence": 0.9}}]}}"#,
            t, symbol
        );
        app.clone().oneshot(post_json("/tick", &body)).await.unwrap();
    }
    // history expires, match left the screen long ago
    app.clone()
        .oneshot(post_json("/tick", r#"{"t": 200.0}"#))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/state").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert!(json["time"].as_f64().unwrap() >= 200.0);
    assert_eq!(json["mode"], "SHOWING_TRAIL");
    assert_eq!(json["text"], "");

    // reset also answers on the client timeline
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reset")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert!(json["time"].as_f64().unwrap() >= 200.0);
    assert_eq!(json["mode"], "SHOWING_TRAIL");
}

#[tokio::test]
async fn test_state_at_explicit_time() {
    let app = create_test_router();

    for (t, symbol) in [(10.0, 0), (11.0, 1), (12.0, 2)] {
        let body = format!(
            r#"{{"t": {:.1}, "detections": [{{"symbol": {}, "confidence": 0.9}}]}}"#,
            t, symbol
        );
        app.clone().oneshot(post_json("/tick", &body)).await.unwrap();
    }

    let state_at = |t: &str| {
        Request::builder()
            .uri(format!("/state?t={}", t))
            .body(Body::empty())
            .unwrap()
    };

    let json = body_json(app.clone().oneshot(state_at("13.0")).await.unwrap()).await;
    assert_eq!(json["mode"], "SHOWING_MATCH");
    assert_eq!(json["text"], "Fireball");

    let json = body_json(app.oneshot(state_at("17.0")).await.unwrap()).await;
    assert_eq!(json["mode"], "SHOWING_TRAIL");
    assert_eq!(json["text"], "ABC");
}
