//! End-to-end tests against the full router on an in-memory store.

use agri_auth::AccessTokenClaims;
use agri_auth::token::{encode_claims, issue_access_token};
use agri_integrations::LineConfig;
use agri_integrations::messaging::{SIGNATURE_HEADER, sign_body};
use agri_server::state::DEMO_DEVICE_ID;
use agri_server::{AppConfig, AppState, build_router};
use axum::body::Bytes;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{Value, json};

const LINE_SECRET: &str = "test-channel-secret";

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.seed_demo_data = false;
    config.auth.jwt_secret = "api-test-secret".into();
    config
}

async fn server_with(config: &AppConfig) -> TestServer {
    let state = AppState::initialize(config).await.unwrap();
    TestServer::new(build_router(state, &config.server)).unwrap()
}

fn bearer(config: &AppConfig, subject: &str, tenant_id: i64) -> HeaderValue {
    let token = issue_access_token(subject, tenant_id, &config.auth).unwrap();
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

async fn create_farmer(server: &TestServer, auth: &HeaderValue) -> Value {
    let response = server
        .post("/api/v1/farmers")
        .add_header(AUTHORIZATION, auth.clone())
        .json(&json!({ "name": "Green Valley", "location": "Hualien" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

async fn create_product(server: &TestServer, auth: &HeaderValue, farmer_id: &str, price: f64) -> Value {
    let response = server
        .post("/api/v1/products")
        .add_header(AUTHORIZATION, auth.clone())
        .json(&json!({ "name": "Apple", "price": price, "farmer_id": farmer_id }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn login_issues_a_token_for_the_default_tenant() {
    let config = test_config();
    let server = server_with(&config).await;

    let response = server
        .post("/api/v1/login")
        .json(&json!({ "username": "agribridge_user", "password": "password" }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 1800);

    let token = body["access_token"].as_str().unwrap();
    let protected = server
        .get("/api/v1/protected")
        .add_header(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        )
        .await;
    protected.assert_status_ok();
    let identity = protected.json::<Value>();
    assert_eq!(identity["subject"], "agribridge_user");
    assert_eq!(identity["tenant_id"], 1);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let config = test_config();
    let server = server_with(&config).await;

    let response = server
        .post("/api/v1/login")
        .json(&json!({ "username": "agribridge_user", "password": "nope" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn missing_header_is_not_authenticated() {
    let config = test_config();
    let server = server_with(&config).await;

    let response = server.get("/api/v1/products").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.header(WWW_AUTHENTICATE), "Bearer");
    let body = response.json::<Value>();
    assert_eq!(body["code"], "unauthenticated");
    assert_eq!(body["detail"], "Not authenticated");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let config = test_config();
    let server = server_with(&config).await;

    let now = chrono::Utc::now().timestamp();
    let token = encode_claims(
        &AccessTokenClaims {
            sub: "agribridge_user".into(),
            tenant_id: 1,
            iat: now - 7200,
            exp: now - 3600,
        },
        &config.auth,
    )
    .unwrap();

    let response = server
        .get("/api/v1/farmers")
        .add_header(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        )
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["detail"], "Token has expired");
}

#[tokio::test]
async fn token_signed_with_another_secret_is_invalid() {
    let config = test_config();
    let server = server_with(&config).await;

    let mut other = config.clone();
    other.auth.jwt_secret = "some-other-secret".into();

    let response = server
        .get("/api/v1/farmers")
        .add_header(AUTHORIZATION, bearer(&other, "mallory", 1))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "invalid_token");
    assert!(body["detail"].as_str().unwrap().starts_with("Invalid token"));
}

#[tokio::test]
async fn products_are_visible_only_to_their_tenant() {
    let config = test_config();
    let server = server_with(&config).await;
    let t1 = bearer(&config, "alice", 1);
    let t2 = bearer(&config, "bob", 2);

    let farmer = create_farmer(&server, &t1).await;
    let product = create_product(&server, &t1, farmer["id"].as_str().unwrap(), 25.5).await;
    assert_eq!(product["price"], 25.5);
    assert_eq!(product["tenant_id"], 1);

    let t1_list = server
        .get("/api/v1/products")
        .add_header(AUTHORIZATION, t1.clone())
        .await;
    t1_list.assert_status_ok();
    assert_eq!(t1_list.header("x-total-count"), "1");
    let items = t1_list.json::<Vec<Value>>();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Apple");

    let t2_list = server
        .get("/api/v1/products")
        .add_header(AUTHORIZATION, t2.clone())
        .await;
    t2_list.assert_status_ok();
    assert_eq!(t2_list.header("x-total-count"), "0");
    assert!(t2_list.json::<Vec<Value>>().is_empty());

    let by_id = server
        .get(&format!("/api/v1/products/{}", product["id"].as_str().unwrap()))
        .add_header(AUTHORIZATION, t2)
        .await;
    by_id.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ordering_another_tenants_product_is_not_found() {
    let config = test_config();
    let server = server_with(&config).await;
    let t1 = bearer(&config, "alice", 1);
    let t2 = bearer(&config, "bob", 2);

    let farmer = create_farmer(&server, &t1).await;
    let product = create_product(&server, &t1, farmer["id"].as_str().unwrap(), 10.0).await;

    let response = server
        .post("/api/v1/orders")
        .add_header(AUTHORIZATION, t2)
        .json(&json!({ "product_id": product["id"], "quantity": 1, "buyer_id": 7 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "not_found");
}

#[tokio::test]
async fn tenant_id_in_the_body_is_ignored() {
    let config = test_config();
    let server = server_with(&config).await;
    let t1 = bearer(&config, "alice", 1);
    let t2 = bearer(&config, "bob", 2);

    let response = server
        .post("/api/v1/farmers")
        .add_header(AUTHORIZATION, t2)
        .json(&json!({ "name": "Sneaky", "location": "Nowhere", "tenant_id": 1 }))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["tenant_id"], 2);

    let t1_list = server
        .get("/api/v1/farmers")
        .add_header(AUTHORIZATION, t1)
        .await;
    assert_eq!(t1_list.header("x-total-count"), "0");
}

#[tokio::test]
async fn order_total_is_frozen_and_status_can_change() {
    let config = test_config();
    let server = server_with(&config).await;
    let t1 = bearer(&config, "alice", 1);

    let farmer = create_farmer(&server, &t1).await;
    let product = create_product(&server, &t1, farmer["id"].as_str().unwrap(), 12.5).await;
    let product_path = format!("/api/v1/products/{}", product["id"].as_str().unwrap());

    let order = server
        .post("/api/v1/orders")
        .add_header(AUTHORIZATION, t1.clone())
        .json(&json!({ "product_id": product["id"], "quantity": 4, "buyer_id": 101 }))
        .await;
    order.assert_status(StatusCode::CREATED);
    let order = order.json::<Value>();
    assert_eq!(order["total_price"], 50.0);
    assert_eq!(order["status"], "pending");
    let order_path = format!("/api/v1/orders/{}", order["id"].as_str().unwrap());

    server
        .patch(&product_path)
        .add_header(AUTHORIZATION, t1.clone())
        .json(&json!({ "price": 99.0 }))
        .await
        .assert_status_ok();

    let fetched = server
        .get(&order_path)
        .add_header(AUTHORIZATION, t1.clone())
        .await;
    assert_eq!(fetched.json::<Value>()["total_price"], 50.0);

    let updated = server
        .patch(&format!("{order_path}/status"))
        .add_header(AUTHORIZATION, t1.clone())
        .json(&json!({ "status": "completed" }))
        .await;
    updated.assert_status_ok();
    assert_eq!(updated.json::<Value>()["status"], "completed");

    server
        .patch(&format!("{order_path}/status"))
        .add_header(AUTHORIZATION, t1)
        .json(&json!({ "status": "shipped" }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn invalid_input_is_unprocessable() {
    let config = test_config();
    let server = server_with(&config).await;
    let t1 = bearer(&config, "alice", 1);

    server
        .get("/api/v1/farmers/not-a-uuid")
        .add_header(AUTHORIZATION, t1.clone())
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .get("/api/v1/orders?limit=-1")
        .add_header(AUTHORIZATION, t1.clone())
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let response = server
        .post("/api/v1/farmers")
        .add_header(AUTHORIZATION, t1)
        .json(&json!({ "name": "", "location": "Taitung" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["code"], "validation_error");
}

#[tokio::test]
async fn esg_report_refreshes_farmer_metrics() {
    let config = test_config();
    let server = server_with(&config).await;
    let t1 = bearer(&config, "alice", 1);

    let farmer = create_farmer(&server, &t1).await;
    let farmer_id = farmer["id"].as_str().unwrap().to_string();
    let product = create_product(&server, &t1, &farmer_id, 10.0).await;

    server
        .post("/api/v1/orders")
        .add_header(AUTHORIZATION, t1.clone())
        .json(&json!({ "product_id": product["id"], "quantity": 100, "buyer_id": 1 }))
        .await
        .assert_status(StatusCode::CREATED);

    let report = server
        .get(&format!("/api/v1/farmers/{farmer_id}/esg-report"))
        .add_header(AUTHORIZATION, t1.clone())
        .await;
    report.assert_status_ok();
    let report = report.json::<Value>();
    assert_eq!(report["total_sales"], 1000.0);
    // 0.5 * 50 + 1 * 10 + 0.2 * 20
    let score = report["esg_score"].as_f64().unwrap();
    assert!((score - 39.0).abs() < 1e-9);
    assert_eq!(report["social_impact"]["community_engagement"], "Low");

    let refreshed = server
        .get(&format!("/api/v1/farmers/{farmer_id}"))
        .add_header(AUTHORIZATION, t1)
        .await
        .json::<Value>();
    assert!((refreshed["esg_score"].as_f64().unwrap() - 39.0).abs() < 1e-9);
    assert_eq!(refreshed["total_sales"], 1000.0);
}

#[tokio::test]
async fn payments_reject_unknown_methods_and_list_per_tenant() {
    let config = test_config();
    let server = server_with(&config).await;
    let t1 = bearer(&config, "alice", 1);
    let t2 = bearer(&config, "bob", 2);
    let order_id = uuid::Uuid::new_v4();

    let rejected = server
        .post("/api/v1/payments")
        .add_header(AUTHORIZATION, t1.clone())
        .json(&json!({
            "order_id": order_id, "amount": 100.0, "currency": "twd", "payment_method": "paypal"
        }))
        .await;
    rejected.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(rejected.json::<Value>()["detail"], "Unsupported payment method");

    let accepted = server
        .post("/api/v1/payments")
        .add_header(AUTHORIZATION, t1.clone())
        .json(&json!({
            "order_id": order_id, "amount": 100.0, "currency": "twd", "payment_method": "stripe"
        }))
        .await;
    accepted.assert_status_ok();
    let receipt = accepted.json::<Value>();
    assert_eq!(receipt["status"], "completed");
    assert_eq!(receipt["currency"], "TWD");

    let t1_ledger = server
        .get("/api/v1/ledger/transactions")
        .add_header(AUTHORIZATION, t1)
        .await;
    assert_eq!(t1_ledger.header("x-total-count"), "1");
    assert_eq!(t1_ledger.json::<Vec<Value>>()[0]["transaction_id"], receipt["transaction_id"]);

    let t2_ledger = server
        .get("/api/v1/ledger/transactions")
        .add_header(AUTHORIZATION, t2)
        .await;
    assert!(t2_ledger.json::<Vec<Value>>().is_empty());
}

#[tokio::test]
async fn blockchain_lists_newest_first_per_tenant() {
    let config = test_config();
    let server = server_with(&config).await;
    let t1 = bearer(&config, "alice", 1);
    let t2 = bearer(&config, "bob", 2);

    for amount in [10.0, 20.0] {
        server
            .post("/api/v1/blockchain/transactions")
            .add_header(AUTHORIZATION, t1.clone())
            .json(&json!({ "sender": "farm", "receiver": "buyer", "amount": amount }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let entries = server
        .get("/api/v1/blockchain/transactions")
        .add_header(AUTHORIZATION, t1)
        .await
        .json::<Vec<Value>>();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["block_id"], 2);
    assert_eq!(entries[0]["previous_hash"], entries[1]["hash"]);

    let other = server
        .get("/api/v1/blockchain/transactions")
        .add_header(AUTHORIZATION, t2)
        .await
        .json::<Vec<Value>>();
    assert!(other.is_empty());
}

#[tokio::test]
async fn blockchain_verify_reports_chain_state() {
    let config = test_config();
    let server = server_with(&config).await;
    let token = bearer(&config, "alice", 1);

    server
        .get("/api/v1/blockchain/verify")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    for amount in [5.0, 7.5, 12.0] {
        server
            .post("/api/v1/blockchain/transactions")
            .add_header(AUTHORIZATION, token.clone())
            .json(&json!({ "sender": "farm", "receiver": "buyer", "amount": amount }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server
        .get("/api/v1/blockchain/verify")
        .add_header(AUTHORIZATION, token)
        .await;
    response.assert_status_ok();
    let report = response.json::<Value>();
    assert_eq!(report["valid"], true);
    assert_eq!(report["retained_entries"], 3);
    assert_eq!(report["latest_block_id"], 3);
    assert!(report["broken_at"].is_null());
}

#[tokio::test]
async fn iot_readings_are_tenant_scoped() {
    let config = test_config();
    let server = server_with(&config).await;
    let t1 = bearer(&config, "alice", 1);
    let t2 = bearer(&config, "bob", 2);

    let missing = server
        .get("/api/v1/iot/data/sensor-7")
        .add_header(AUTHORIZATION, t1.clone())
        .await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        missing.json::<Value>()["detail"],
        "No IoT data found for this device or tenant"
    );

    let ingested = server
        .post("/api/v1/iot/data")
        .add_header(AUTHORIZATION, t1.clone())
        .json(&json!({ "device_id": "sensor-7", "temperature": 22.5, "humidity": 61.0 }))
        .await;
    ingested.assert_status(StatusCode::CREATED);
    assert_eq!(ingested.json::<Value>()["message"], "IoT data received successfully");

    let readings = server
        .get("/api/v1/iot/data/sensor-7")
        .add_header(AUTHORIZATION, t1)
        .await;
    readings.assert_status_ok();
    assert_eq!(readings.json::<Vec<Value>>().len(), 1);

    server
        .get("/api/v1/iot/data/sensor-7")
        .add_header(AUTHORIZATION, t2)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn line_webhook_checks_the_signature() {
    let mut config = test_config();
    config.integrations.line = LineConfig {
        channel_access_token: Some("test-token".into()),
        channel_secret: Some(LINE_SECRET.into()),
    };
    let server = server_with(&config).await;
    let signature_header = HeaderName::from_static(SIGNATURE_HEADER);

    let body: &'static [u8] = br#"{"events":[{"type":"message","replyToken":"r-1","message":{"type":"text","text":"hi"}}]}"#;
    let signature = sign_body(LINE_SECRET, body).unwrap();

    let accepted = server
        .post("/api/v1/line-webhook")
        .add_header(
            signature_header.clone(),
            HeaderValue::from_str(&signature).unwrap(),
        )
        .bytes(Bytes::from_static(body))
        .await;
    accepted.assert_status_ok();
    let reply = accepted.json::<Value>();
    assert_eq!(reply["status"], "ok");
    assert_eq!(reply["replies"][0]["reply_token"], "r-1");

    let forged = sign_body("wrong-secret", body).unwrap();
    let rejected = server
        .post("/api/v1/line-webhook")
        .add_header(signature_header, HeaderValue::from_str(&forged).unwrap())
        .bytes(Bytes::from_static(body))
        .await;
    rejected.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(rejected.json::<Value>()["code"], "invalid_signature");
}

#[tokio::test]
async fn line_endpoints_are_unavailable_without_credentials() {
    let config = test_config();
    let server = server_with(&config).await;

    server
        .post("/api/v1/line-webhook")
        .bytes(Bytes::from_static(b"{}"))
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    server
        .post("/api/v1/notifications/send-line-message")
        .add_header(AUTHORIZATION, bearer(&config, "alice", 1))
        .json(&json!({ "user_id": "U0123456789", "message": "hello" }))
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn line_push_validates_the_recipient() {
    let mut config = test_config();
    config.integrations.line = LineConfig {
        channel_access_token: Some("test-token".into()),
        channel_secret: Some(LINE_SECRET.into()),
    };
    let server = server_with(&config).await;
    let t1 = bearer(&config, "alice", 1);

    server
        .post("/api/v1/notifications/send-line-message")
        .add_header(AUTHORIZATION, t1.clone())
        .json(&json!({ "user_id": "U0123456789", "message": "Your order shipped" }))
        .await
        .assert_status_ok();

    server
        .post("/api/v1/notifications/send-line-message")
        .add_header(AUTHORIZATION, t1)
        .json(&json!({ "user_id": "mock_user_id", "message": "hello" }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn demo_seed_provisions_catalogue_and_telemetry() {
    let mut config = test_config();
    config.seed_demo_data = true;
    let server = server_with(&config).await;
    let t1 = bearer(&config, "agribridge_user", 1);

    server.get("/health").await.assert_status_ok();

    let products = server
        .get("/api/v1/products")
        .add_header(AUTHORIZATION, t1.clone())
        .await;
    products.assert_status_ok();
    assert_eq!(products.header("x-total-count"), "3");

    let orders = server
        .get("/api/v1/orders")
        .add_header(AUTHORIZATION, t1.clone())
        .await;
    assert_eq!(orders.header("x-total-count"), "2");

    let readings = server
        .get(&format!("/api/v1/iot/data/{DEMO_DEVICE_ID}"))
        .add_header(AUTHORIZATION, t1)
        .await;
    readings.assert_status_ok();
    assert_eq!(readings.json::<Vec<Value>>().len(), 20);
}
