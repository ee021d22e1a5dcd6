use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use cm_api::{create_router, test_state};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn livez_responds_ok_without_a_database() {
    let app = create_router(test_state());

    let response = app
        .oneshot(Request::builder().uri("/livez").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn recommendations_reject_unknown_trade_type() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/crews/recommendations?tradeType=flying")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "bad_request");
    assert!(json["message"].as_str().unwrap().contains("flying"));
}

#[tokio::test]
async fn recommendations_render_400_for_long_multibyte_trade_type() {
    let app = create_router(test_state());

    // 120 copies of a three-byte character; the echoed message must be
    // truncated without splitting a character.
    let trade = "%E5%80%8B".repeat(120);
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/crews/recommendations?tradeType={trade}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "bad_request");
    assert!(json["message"].as_str().unwrap().len() <= 240);
}

#[tokio::test]
async fn recommendations_require_trade_type() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/crews/recommendations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recommendations_reject_half_specified_coordinates() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/crews/recommendations?tradeType=electrical&lat=39.7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_rejects_inverted_window() {
    let app = create_router(test_state());

    let payload = serde_json::json!({
        "projectId": "proj-1",
        "start": "2026-04-10T12:00:00Z",
        "end": "2026-04-10T10:00:00Z",
    });

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/crews/1/bookings")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "bad_request");
}

#[tokio::test]
async fn booking_rejects_blank_project_id() {
    let app = create_router(test_state());

    let payload = serde_json::json!({
        "projectId": "   ",
        "start": "2026-04-10T10:00:00Z",
        "end": "2026-04-10T12:00:00Z",
    });

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/crews/1/bookings")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn propagates_caller_supplied_request_id() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/crews/recommendations?tradeType=flying")
                .header("x-request-id", "req-smoke-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-smoke-1"
    );
    let json = body_json(response).await;
    assert_eq!(json["request_id"], "req-smoke-1");
}
