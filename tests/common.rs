#![allow(dead_code)]

use event_booking::{
    api::router::create_router,
    config::Config,
    infra::factory::bootstrap_state,
    state::AppState,
};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::sync::Arc;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};

pub const ADMIN_EMAIL: &str = "admin@test.local";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct AuthHeaders {
    pub user_id: String,
    pub access_token: String,
    pub csrf_token: String,
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            admin_email: Some(ADMIN_EMAIL.to_string()),
            admin_password: Some(ADMIN_PASSWORD.to_string()),
            display_timezone: "UTC".to_string(),
            notification_max_attempts: 3,
        };

        let state = Arc::new(bootstrap_state(&config).await);

        // Second handle on the same file for assertions that bypass the API.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await
            .expect("Failed to connect to test db");

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&AuthHeaders>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }
        let body = match body {
            Some(payload) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(payload.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        (status, parse_body(response.into_body()).await)
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthHeaders {
        let payload = json!({ "email": email, "password": password });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let cookies: Vec<String> = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let access_token_cookie = cookies.iter()
            .find(|c| c.contains("access_token="))
            .expect("No access_token cookie returned");

        let start = access_token_cookie.find("access_token=").unwrap() + 13;
        let end = access_token_cookie[start..].find(';').unwrap_or(access_token_cookie.len() - start);
        let access_token = access_token_cookie[start..start+end].to_string();

        let body_json = parse_body(response.into_body()).await;
        let csrf_token = body_json["csrfToken"].as_str().expect("No csrfToken in body").to_string();
        let user_id = body_json["user"]["id"].as_str().expect("No user in body").to_string();

        AuthHeaders {
            user_id,
            access_token,
            csrf_token,
        }
    }

    pub async fn login_admin(&self) -> AuthHeaders {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn register_and_login(&self, name: &str) -> AuthHeaders {
        let email = format!("{}-{}@test.local", name.to_lowercase(), &Uuid::new_v4().to_string()[..8]);
        let (status, body) = self.request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({ "name": name, "email": email, "password": "secret-pass" })),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        self.login(&email, "secret-pass").await
    }

    pub async fn create_category(&self, admin: &AuthHeaders, name: &str) -> String {
        let (status, body) = self.request(
            Method::POST,
            "/api/v1/categories",
            Some(admin),
            Some(json!({ "name": name })),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "category create failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Published event with sane defaults; `overrides` replaces individual fields.
    pub async fn create_event(&self, admin: &AuthHeaders, category_id: &str, overrides: Value) -> Value {
        let mut payload = json!({
            "title": "Jazz Night",
            "description": "Live quartet",
            "date": "2030-06-20T19:00:00Z",
            "location": "Blue Hall",
            "categoryId": category_id,
            "price": 50.0,
            "capacity": 100,
            "imageUrl": "https://img.test/jazz.png",
            "isPublished": true,
        });
        if let (Some(base), Some(extra)) = (payload.as_object_mut(), overrides.as_object()) {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
        }

        let (status, body) = self.request(Method::POST, "/api/v1/events", Some(admin), Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED, "event create failed: {}", body);
        body
    }

    pub async fn book(&self, user: &AuthHeaders, event_id: &str, quantity: i32) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/v1/bookings",
            Some(user),
            Some(json!({ "eventId": event_id, "quantity": quantity })),
        ).await
    }

    pub async fn set_booking_status(&self, who: &AuthHeaders, booking_id: &str, status: &str) -> (StatusCode, Value) {
        self.request(
            Method::PATCH,
            "/api/v1/bookings",
            Some(who),
            Some(json!({ "bookingId": booking_id, "status": status })),
        ).await
    }

    pub async fn pay(&self, user: &AuthHeaders, booking_id: &str, amount: f64) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/v1/payments",
            Some(user),
            Some(json!({ "bookingId": booking_id, "amount": amount, "paymentMethod": "card" })),
        ).await
    }
}

pub async fn parse_body(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
