//! Integration tests for Slipdesk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p slipdesk-integration-tests
//! ```
//!
//! The tests drive the full router in-process with [`tower::ServiceExt::oneshot`]
//! over the in-memory stores from `slipdesk_server::testing`, so no database
//! or image store is needed.
//!
//! # Test Categories
//!
//! - `slip_workflow` - Service-level scenarios (create, status, sweep)
//! - `api_slips` - Slip endpoints through the router
//! - `api_users` - Auth and admin user endpoints through the router

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use slipdesk_core::Role;
use slipdesk_server::config::RetentionConfig;
use slipdesk_server::middleware::session_layer_for_store;
use slipdesk_server::models::User;
use slipdesk_server::routes;
use slipdesk_server::state::AppState;
use slipdesk_server::testing::{
    MemoryImageStore, MemorySettingsStore, MemorySlipStore, MemoryUserStore,
};

/// Password given to every user created through [`TestApp::create_user`].
pub const PASSWORD: &str = "correct horse battery";

const BOUNDARY: &str = "slipdesk-test-boundary";

/// Largest response body read by [`TestApp::send`].
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Router and fakes for one test.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub slips: Arc<MemorySlipStore>,
    pub images: Arc<MemoryImageStore>,
    pub users: Arc<MemoryUserStore>,
    pub settings: Arc<MemorySettingsStore>,
}

/// Status, session cookie and JSON body of one response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub cookie: Option<String>,
    pub body: Value,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let slips = Arc::new(MemorySlipStore::default());
        let images = Arc::new(MemoryImageStore::default());
        let users = Arc::new(MemoryUserStore::default());
        let settings = Arc::new(MemorySettingsStore::default());

        let state = AppState::new(
            slips.clone(),
            users.clone(),
            settings.clone(),
            images.clone(),
            RetentionConfig::default(),
        );
        let router = routes::routes()
            .layer(session_layer_for_store(MemoryStore::default(), false))
            .with_state(state.clone());

        Self {
            router,
            state,
            slips,
            images,
            users,
            settings,
        }
    }

    /// Create a user directly through the auth service.
    ///
    /// # Panics
    ///
    /// Panics if the username or email is already taken.
    pub async fn create_user(&self, username: &str, role: Role) -> User {
        self.state
            .auth()
            .create_user(username, &format!("{username}@bakery.test"), PASSWORD, role)
            .await
            .expect("Failed to create test user")
    }

    /// Create a user with `role` and return a signed-in session cookie.
    ///
    /// # Panics
    ///
    /// Panics if user creation or login fails.
    pub async fn sign_in_as(&self, username: &str, role: Role) -> String {
        self.create_user(username, role).await;
        let resp = self
            .send(json_request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(&serde_json::json!({ "login": username, "password": PASSWORD })),
            ))
            .await;
        assert_eq!(resp.status, StatusCode::OK, "login failed: {}", resp.body);
        resp.cookie.expect("login did not set a session cookie")
    }

    /// Send one request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("Failed to read response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            cookie,
            body,
        }
    }
}

/// Build a request with an optional JSON body and session cookie.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn json_request(
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<&Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("Failed to build request")
}

/// Build a multipart slip upload. `image` becomes the `slip` file field.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn multipart_request(
    uri: &str,
    cookie: Option<&str>,
    fields: &[(&str, String)],
    image: Option<&[u8]>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"slip\"; filename=\"slip.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).expect("Failed to build request")
}

/// Text fields of a complete slip upload, delivered on `date`.
#[must_use]
pub fn slip_fields(date: &str) -> Vec<(&'static str, String)> {
    vec![
        ("branch", "khamla".to_string()),
        ("deliveryDate", date.to_string()),
        ("deliveryTime", "5 PM".to_string()),
        ("deliveryType", "delivery".to_string()),
        ("cakeType", "cream".to_string()),
        ("customerName", "Ravi".to_string()),
        ("customerNumber", "9000000000".to_string()),
        ("billNumber", "B-101".to_string()),
        ("hamper", "yes".to_string()),
    ]
}
