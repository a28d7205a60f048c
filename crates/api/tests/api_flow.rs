//! End-to-end tests that drive the router with in-process requests.
//!
//! Passcodes are captured by a recording notifier instead of being mailed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use nursery_api::{AppState, SessionStore, create_router};
use nursery_core::auth::UserRole;
use nursery_core::invoice::ShopHeader;
use nursery_db::UserRepository;
use nursery_db::migration::Migrator;
use nursery_shared::{EmailError, JwtConfig, JwtService, Notifier};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rstest::rstest;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;

const RECIPIENT: &str = "owner@example.com";

/// Money fields travel as strings.
fn money(value: &Value) -> Decimal {
    value.as_str().expect("money is a string").parse().unwrap()
}

/// Notifier that keeps every message and can be told to fail.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    fn last_code(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let (_, _, body) = sent.last().expect("no message sent");
        body.rsplit(' ').next().unwrap().to_string()
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, destination: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmailError::SendError("smtp unavailable".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

struct TestApp {
    router: Router,
    notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    async fn new() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.expect("Failed to open database");
        Migrator::up(&db, None).await.expect("Failed to migrate");

        let users = UserRepository::new(db.clone());
        users.create("root", "rootpw", UserRole::Admin).await.unwrap();
        users.create("alice", "alicepw", UserRole::Staff).await.unwrap();
        users.create("bob", "bobpw", UserRole::Staff).await.unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState {
            db: Arc::new(db),
            jwt_service: Arc::new(JwtService::new(JwtConfig {
                secret: "test-secret".to_string(),
                access_token_expires_minutes: 15,
            })),
            notifier: notifier.clone(),
            otp_recipient: RECIPIENT.to_string(),
            sessions: SessionStore::new(Duration::from_secs(600), Duration::from_secs(300)),
            shop: ShopHeader {
                name: "GREEN NURSERY".to_string(),
                tagline: "Plants | Pots | Gardening Tools".to_string(),
            },
            timezone: chrono_tz::Tz::UTC,
        };

        Self {
            router: create_router(state),
            notifier,
        }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .post("/api/v1/auth/login", None, json!({ "username": username, "password": password }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let session_id = body["session_id"].clone();

        let (status, body) = self
            .post(
                "/api/v1/auth/otp",
                None,
                json!({ "session_id": session_id, "code": self.notifier.last_code() }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn stock_rose(&self, admin: &str) {
        let (status, body) = self
            .post(
                "/api/v1/inventory",
                Some(admin),
                json!({
                    "item": "Rose",
                    "category": "Plants",
                    "type": "Flower",
                    "quantity": 5,
                    "cost_price": "60",
                    "sell_price": "100"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/api/v1/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_login_requires_passcode() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/api/v1/auth/login", None, json!({ "username": "alice", "password": "alicepw" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "otp");
    {
        let sent = app.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, RECIPIENT);
        assert_eq!(sent[0].1, "Login OTP");
    }

    let session_id = body["session_id"].clone();
    let (status, body) = app
        .post("/api/v1/auth/otp", None, json!({ "session_id": session_id, "code": "000000x" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_OTP");

    let code = app.notifier.last_code();
    let (status, body) = app
        .post("/api/v1/auth/otp", None, json!({ "session_id": session_id, "code": code }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "staff");

    // the passcode is single use
    let (status, _) = app
        .post("/api/v1/auth/otp", None, json!({ "session_id": session_id, "code": code }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_bad_password_sends_nothing() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post("/api/v1/auth/login", None, json!({ "username": "alice", "password": "nope" }))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
    assert_eq!(app.notifier.count(), 0);
}

#[tokio::test]
async fn test_delivery_failure_is_reported() {
    let app = TestApp::new().await;
    app.notifier.fail.store(true, Ordering::SeqCst);

    let (status, body) = app
        .post("/api/v1/auth/login", None, json!({ "username": "alice", "password": "alicepw" }))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "DELIVERY_ERROR");
}

#[tokio::test]
async fn test_protected_routes_need_token_and_session() {
    let app = TestApp::new().await;

    let (status, _) = app.call(Method::GET, "/api/v1/inventory", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.login("alice", "alicepw").await;
    let (status, _) = app.get("/api/v1/inventory", &token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call(Method::POST, "/api/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/api/v1/inventory", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_cannot_manage() {
    let app = TestApp::new().await;
    let staff = app.login("alice", "alicepw").await;

    let (status, body) = app
        .post(
            "/api/v1/inventory",
            Some(&staff),
            json!({
                "item": "Rose",
                "category": "Plants",
                "type": "Flower",
                "quantity": 5,
                "cost_price": "60",
                "sell_price": "100",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = app
        .post(
            "/api/v1/users",
            Some(&staff),
            json!({ "username": "eve", "password": "pw", "role": "admin" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[case("0.004")]
#[case("12.345")]
#[case("99999999999999")]
#[tokio::test]
async fn test_inventory_rejects_unstorable_prices(#[case] sell_price: &str) {
    let app = TestApp::new().await;
    let admin = app.login("root", "rootpw").await;

    let (status, body) = app
        .post(
            "/api/v1/inventory",
            Some(&admin),
            json!({
                "item": "Moss",
                "category": "Plants",
                "type": "Indoor",
                "quantity": 5,
                "cost_price": "1",
                "sell_price": sell_price,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, _) = app.get("/api/v1/inventory/Moss", &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_item_paths_ignore_surrounding_whitespace() {
    let app = TestApp::new().await;
    let admin = app.login("root", "rootpw").await;
    app.stock_rose(&admin).await;

    let (status, body) = app.get("/api/v1/inventory/%20Rose", &admin).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["item"], "Rose");

    let (status, _) = app
        .call(Method::DELETE, "/api/v1/inventory/%20Rose%20", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/api/v1/inventory/Rose", &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_adds_user() {
    let app = TestApp::new().await;
    let admin = app.login("root", "rootpw").await;

    let body = json!({ "username": "carol", "password": "carolpw", "role": "staff" });
    let (status, _) = app.post("/api/v1/users", Some(&admin), body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = app.post("/api/v1/users", Some(&admin), body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["error"], "USER_EXISTS");

    app.login("carol", "carolpw").await;
}

#[tokio::test]
async fn test_sale_return_and_reports() {
    let app = TestApp::new().await;
    let admin = app.login("root", "rootpw").await;
    let alice = app.login("alice", "alicepw").await;
    let bob = app.login("bob", "bobpw").await;
    app.stock_rose(&admin).await;

    let (status, sale) = app
        .post("/api/v1/sales", Some(&alice), json!({ "item": "Rose", "quantity": 3 }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{sale}");
    assert_eq!(sale["new_quantity"], 2);
    assert_eq!(sale["transaction"]["username"], "alice");

    let (status, ret) = app
        .post("/api/v1/returns", Some(&alice), json!({ "item": "Rose", "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ret["new_quantity"], 3);

    let (status, body) = app
        .post("/api/v1/sales", Some(&bob), json!({ "item": "Rose", "quantity": 10 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "INSUFFICIENT_STOCK");

    let (_, item) = app.get("/api/v1/inventory/Rose", &admin).await;
    assert_eq!(item["quantity"], 3);

    let (status, history) = app.get("/api/v1/transactions", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["summary"]["count"], 2);
    assert_eq!(money(&history["summary"]["total_profit"]), dec!(80));

    // bob asked for alice's rows and got his own (none)
    let (_, history) = app.get("/api/v1/transactions?username=alice", &bob).await;
    assert_eq!(history["summary"]["count"], 0);

    let sale_id = sale["transaction"]["id"].as_i64().unwrap();
    let (status, _) = app
        .get(&format!("/api/v1/transactions/{sale_id}/invoice"), &bob)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, invoice) = app
        .get(&format!("/api/v1/transactions/{sale_id}/invoice"), &alice)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["invoice"]["number"], sale_id);
    assert!(invoice["text"].as_str().unwrap().contains("GREEN NURSERY"));

    let (_, dashboard) = app.get("/api/v1/reports/dashboard", &bob).await;
    assert_eq!(money(&dashboard["total_sales"]), Decimal::ZERO);

    let (_, closing) = app.get("/api/v1/reports/daily-closing", &admin).await;
    assert_eq!(money(&closing["total_sale"]), dec!(300));
    assert_eq!(money(&closing["total_return"]), dec!(100));
    assert_eq!(money(&closing["net_profit"]), dec!(80));
}

#[tokio::test]
async fn test_forgot_password() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post("/api/v1/auth/password/forgot", None, json!({ "username": "ghost" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post("/api/v1/auth/password/forgot", None, json!({ "username": "alice" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "password_reset");
    let session_id = body["session_id"].clone();
    let code = app.notifier.last_code();

    let (status, _) = app
        .post(
            "/api/v1/auth/password/complete",
            None,
            json!({
                "session_id": session_id,
                "otp": code,
                "new_password": "a",
                "confirm_password": "b",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/auth/password/complete",
            None,
            json!({
                "session_id": session_id,
                "otp": code,
                "new_password": "fresh",
                "confirm_password": "fresh",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post("/api/v1/auth/login", None, json!({ "username": "alice", "password": "alicepw" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    app.login("alice", "fresh").await;
}

#[tokio::test]
async fn test_back_abandons_passcode() {
    let app = TestApp::new().await;
    let (_, body) = app
        .post("/api/v1/auth/login", None, json!({ "username": "alice", "password": "alicepw" }))
        .await;
    let session_id = body["session_id"].clone();
    let code = app.notifier.last_code();

    let (status, body) = app
        .post("/api/v1/auth/otp/back", None, json!({ "session_id": session_id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "login");

    let (status, _) = app
        .post("/api/v1/auth/otp", None, json!({ "session_id": session_id, "code": code }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
