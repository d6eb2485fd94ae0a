mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{offline_state, send, token_for};
use online_store::app;

#[tokio::test]
async fn test_health_and_ping() {
    let app = app(offline_state());

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/home/ping", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let app = app(offline_state());
    for uri in ["/api/order/session", "/api/order/list", "/api/order/detail/1", "/api/order/cancel/1", "/api/profile/detail"] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = app(offline_state());
    let (status, body) = send(&app, Method::GET, "/api/order/session", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");

    let foreign = online_store::auth::JwtKeys::new("another-secret", 60).issue(1, "a@b.c").unwrap();
    let (status, _) = send(&app, Method::GET, "/api/order/session", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_to_cart_rejects_zero_qty() {
    let app = app(offline_state());
    let token = token_for(1);
    let (status, body) = send(&app, Method::POST, "/api/order/create/cart/1", Some(&token), Some(json!({"size_id": 1, "colour_id": 1, "qty": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("qty"));
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_error() {
    let app = app(offline_state());
    let token = token_for(1);
    let (status, body) = send(&app, Method::POST, "/api/order/create/cart/1", Some(&token), Some(json!({"size_id": "big"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_checkout_requires_billing_fields() {
    let app = app(offline_state());
    let token = token_for(1);
    let body = json!({"payment_id": 1, "email": "jane@example.com", "first_name": "Jane", "last_name": "Doe", "address": ""});
    let (status, body) = send(&app, Method::POST, "/api/order/checkout/submit", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("address"));
}

#[tokio::test]
async fn test_register_password_rules() {
    let app = app(offline_state());
    let mismatch = json!({"name": "Jane Doe", "email": "jane@example.com", "password": "s3cret-pass", "password_confirm": "other-pass"});
    let (status, body) = send(&app, Method::POST, "/api/auth/register", None, Some(mismatch)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("password_confirm"));

    let short = json!({"name": "Jane Doe", "email": "jane@example.com", "password": "short", "password_confirm": "short"});
    let (status, _) = send(&app, Method::POST, "/api/auth/register", None, Some(short)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shop_list_rejects_inverted_price_range() {
    let app = app(offline_state());
    let (status, body) = send(&app, Method::GET, "/api/shop/list?priceMin=50&priceMax=10", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("priceMin"));
}

#[tokio::test]
async fn test_confirm_rejects_malformed_token() {
    let app = app(offline_state());
    let (status, _) = send(&app, Method::GET, "/api/auth/confirm/not-a-token", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_path_id_is_a_json_validation_error() {
    let app = app(offline_state());
    let token = token_for(1);
    for uri in ["/api/order/cancel/abc", "/api/order/detail/abc", "/api/order/cart/1x"] {
        let (status, body) = send(&app, Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}
