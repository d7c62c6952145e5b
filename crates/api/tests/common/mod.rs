//! Test harness: router over in-memory SQLite and a local-fs store.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use coursekit_api::{AppState, create_router};
use coursekit_core::storage::{StagingArea, StorageConfig, StorageProvider, StorageService};
use coursekit_core::user::{ResetNotifier, UserService};
use coursekit_db::UserRepository;
use coursekit_shared::{JwtConfig, JwtService};

pub const BOUNDARY: &str = "coursekit-test-boundary";
pub const ADMIN_EMAIL: &str = "admin@coursekit.test";
pub const PASSWORD: &str = "correct-horse";

/// Keeps reset tokens instead of mailing them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn last_token(&self) -> String {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, token)| token.clone())
            .expect("a reset token was sent")
    }
}

impl ResetNotifier for RecordingNotifier {
    fn send_reset(&self, email: &str, token: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
    }
}

/// Router plus the directories backing it.
pub struct TestApp {
    pub router: Router,
    pub storage: Arc<StorageService>,
    pub storage_dir: TempDir,
    pub staging_dir: TempDir,
    pub notifier: Arc<RecordingNotifier>,
    pub admin_token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_max_file_size(StorageConfig::DEFAULT_MAX_FILE_SIZE).await
    }

    pub async fn with_max_file_size(max_file_size: u64) -> Self {
        let db = coursekit_db::connect_pool("sqlite::memory:", 1, 1)
            .await
            .expect("Failed to connect to database");
        coursekit_db::migrate(&db).await.expect("Failed to migrate");

        let storage_dir = TempDir::new().expect("storage dir");
        let staging_dir = TempDir::new().expect("staging dir");

        let config = StorageConfig::new(StorageProvider::local_fs(storage_dir.path()))
            .with_public_base_url("http://files.test")
            .with_max_file_size(max_file_size);
        let storage = Arc::new(StorageService::from_config(config).expect("storage"));

        let notifier = Arc::new(RecordingNotifier::default());
        UserService::new(Arc::new(UserRepository::new(db.clone())), notifier.clone())
            .ensure_admin(ADMIN_EMAIL, "Admin", PASSWORD)
            .await
            .expect("seed admin");

        let state = AppState {
            db: Arc::new(db),
            storage: storage.clone(),
            staging: Arc::new(StagingArea::new(staging_dir.path(), max_file_size)),
            jwt: Arc::new(JwtService::new(JwtConfig {
                secret: "test-secret".to_string(),
                access_token_expires_minutes: 15,
            })),
            notifier: notifier.clone(),
            reset_token_ttl: chrono::Duration::minutes(30),
        };

        let mut app = Self {
            router: create_router(state),
            storage,
            storage_dir,
            staging_dir,
            notifier,
            admin_token: String::new(),
        };
        app.admin_token = app.login_admin(ADMIN_EMAIL, PASSWORD).await;
        app
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::get(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::delete(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    /// JSON request, optionally carrying a bearer token.
    pub async fn json_as(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(body) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        self.send(request.body(body).expect("request")).await
    }

    pub async fn get_as(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.json_as("GET", uri, Some(token), None).await
    }

    pub async fn delete_as(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.json_as("DELETE", uri, Some(token), None).await
    }

    pub async fn post_json_as(&self, uri: &str, token: &str, body: &Value) -> (StatusCode, Value) {
        self.json_as("POST", uri, Some(token), Some(body)).await
    }

    pub async fn put_as(&self, uri: &str, token: &str, body: Option<&Value>) -> (StatusCode, Value) {
        self.json_as("PUT", uri, Some(token), body).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    pub async fn multipart(&self, method: &str, uri: &str, form: Form) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(form.finish()))
                .expect("request"),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post_json(
            "/api/v1/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn login_admin(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/v1/auth/admin/login",
                &json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["access_token"].as_str().expect("token").to_string()
    }

    /// Registers a regular account and logs it in. Returns (user id, token).
    pub async fn register_user(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .post_json(
                "/api/v1/users",
                &json!({ "email": email, "full_name": "Student", "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["id"].as_str().expect("user id").to_string();

        let (status, body) = self.login(email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (id, body["access_token"].as_str().expect("token").to_string())
    }

    pub async fn create_course(&self, title: &str) -> String {
        let (status, body) = self
            .post_json_as("/api/v1/courses", &self.admin_token, &json!({ "title": title }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().expect("course id").to_string()
    }

    /// Files currently sitting in the staging directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Hand-built multipart body.
#[derive(Default)]
pub struct Form {
    body: Vec<u8>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}
