//! HTTP API 端到端测试
//!
//! 直接以 tower Service 方式调用完整 Router (含中间件)，不经过网络栈。

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::Service;

use storefront_server::db::models::ProductCreate;
use storefront_server::db::repository::ProductRepository;
use storefront_server::{Config, ServerState, api};

async fn test_app() -> (Router, ServerState, String) {
    let config = Config::with_overrides("/tmp/unused", 0);
    let state = ServerState::initialize_in_memory(&config).await;

    let repo = ProductRepository::new(state.get_db());
    let product = repo
        .create(ProductCreate {
            name: "POLO CLASSIC FIT".to_string(),
            description: "Premium cotton polo.".to_string(),
            category: "polos".to_string(),
            price: Decimal::new(4999, 2),
            stock_limit: 5,
            image_url: String::new(),
            tags: vec!["polo".to_string()],
        })
        .await
        .expect("create product");
    let product_id = product.key();
    state.stock.initialize(&product_id, 5).expect("seed stock");

    (api::build_app(state.clone()), state, product_id)
}

async fn send(app: &mut Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.call(request).await.expect("request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

async fn register(app: &mut Router, email: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "email": email, "password": "correct-horse-battery", "displayName": "Test" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E0000");
    body["data"]["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let (mut app, _state, _product) = test_app().await;
    let (status, body) = send(&mut app, get_request("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn product_listing_is_public_and_reports_stock() {
    let (mut app, _state, product_id) = test_app().await;

    let (status, body) = send(&mut app, get_request("/api/products", None)).await;
    assert_eq!(status, StatusCode::OK);

    let products = body["data"].as_array().expect("products");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], product_id);
    assert_eq!(products[0]["stock"], 5);
    assert_eq!(products[0]["isSoldOut"], false);
}

#[tokio::test]
async fn cart_requires_authentication() {
    let (mut app, _state, _product) = test_app().await;
    let (status, body) = send(&mut app, get_request("/api/cart/get", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");
}

#[tokio::test]
async fn invalid_token_is_rejected() {
    let (mut app, _state, _product) = test_app().await;
    let (status, body) = send(&mut app, get_request("/api/cart/get", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3002");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (mut app, _state, _product) = test_app().await;
    register(&mut app, "dup@example.com").await;

    let (status, body) = send(
        &mut app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "email": "dup@example.com", "password": "correct-horse-battery" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E0004");
}

#[tokio::test]
async fn login_with_wrong_password_fails_uniformly() {
    let (mut app, _state, _product) = test_app().await;
    register(&mut app, "jane@example.com").await;

    let (status, body) = send(
        &mut app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "jane@example.com", "password": "wrong-password-here" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn cart_and_checkout_happy_path() {
    let (mut app, _state, product_id) = test_app().await;
    let token = register(&mut app, "buyer@example.com").await;

    // Add two units
    let (status, body) = send(
        &mut app,
        json_request(
            "POST",
            "/api/cart/add",
            Some(&token),
            json!({ "productId": product_id, "quantity": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["quantity"], 2);
    assert_eq!(body["data"]["total"], "99.98");

    // Check out the cart
    let (status, body) = send(
        &mut app,
        json_request("POST", "/api/purchase/checkout", Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["purchases"].as_array().unwrap().len(), 1);
    assert!(body["data"]["failedItems"].is_null());

    // Cart is empty afterwards
    let (status, body) = send(&mut app, get_request("/api/cart/get", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);

    // Stock went down
    let (_, body) = send(&mut app, get_request("/api/products", None)).await;
    assert_eq!(body["data"][0]["stock"], 3);
}

#[tokio::test]
async fn checkout_without_cart_is_not_found() {
    let (mut app, _state, _product) = test_app().await;
    let token = register(&mut app, "nocart@example.com").await;

    let (status, body) = send(
        &mut app,
        json_request("POST", "/api/purchase/checkout", Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");
}

#[tokio::test]
async fn single_purchase_conflict_reports_available_stock() {
    let (mut app, _state, product_id) = test_app().await;
    let token = register(&mut app, "greedy@example.com").await;

    let (status, body) = send(
        &mut app,
        json_request(
            "POST",
            &format!("/api/purchase/{product_id}"),
            Some(&token),
            json!({ "quantity": 9 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["data"]["availableStock"], 5);
}

#[tokio::test]
async fn single_purchase_returns_remaining_stock() {
    let (mut app, _state, product_id) = test_app().await;
    let token = register(&mut app, "direct@example.com").await;

    let (status, body) = send(
        &mut app,
        json_request(
            "POST",
            &format!("/api/purchase/{product_id}"),
            Some(&token),
            json!({ "quantity": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["remainingStock"], 4);
    assert_eq!(body["data"]["purchase"]["status"], "completed");
}
