use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use crate::api;
use crate::core::{config::Settings, state::AppState};
use crate::services::question_bank::PracticeCatalog;

const TEST_SECRET_KEY: &str = "test-secret";
pub(crate) const TEST_PASSWORD: &str = "correct-horse";
pub(crate) const MULTIPART_BOUNDARY: &str = "exameval-test-boundary";

/// Variables a test may override; cleared before every test so values never
/// leak between cases.
const TUNABLE_VARS: &[&str] = &[
    "EXAMEVAL_HOST",
    "EXAMEVAL_PORT",
    "API_V1_STR",
    "BACKEND_CORS_ORIGINS",
    "ACCESS_TOKEN_EXPIRE_MINUTES",
    "ALGORITHM",
    "PRACTICE_QUESTIONS_PER_SESSION",
    "EVALUATION_DELAY_MIN_MS",
    "EVALUATION_DELAY_MAX_MS",
    "UPLOAD_TICK_MS",
    "UPLOAD_STEP_MIN",
    "UPLOAD_STEP_MAX",
    "ANALYSIS_START_DELAY_MS",
    "ANALYSIS_DURATION_MS",
    "RESULT_CLEAR_DELAY_MS",
    "MAX_UPLOAD_SIZE_MB",
    "MAX_UPLOAD_FILES",
    "ALLOWED_UPLOAD_EXTENSIONS",
    "EXAMEVAL_RNG_SEED",
];

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    for name in TUNABLE_VARS {
        std::env::remove_var(name);
    }
    std::env::set_var("EXAMEVAL_ENV", "test");
    std::env::set_var("EXAMEVAL_STRICT_CONFIG", "0");
    std::env::set_var("SECRET_KEY", TEST_SECRET_KEY);
    std::env::set_var("PROMETHEUS_ENABLED", "0");
}

pub(crate) async fn setup_test_context() -> TestContext {
    setup_test_context_with(|| {}).await
}

/// Like `setup_test_context`, but `configure` may set extra variables before
/// settings are loaded.
pub(crate) async fn setup_test_context_with(configure: impl FnOnce()) -> TestContext {
    let guard = env_lock().await;
    set_test_env();
    std::env::set_var("EXAMEVAL_RNG_SEED", "20240601");
    configure();

    let settings = Settings::load().expect("settings");
    let state = AppState::new(settings, PracticeCatalog::builtin(), CancellationToken::new());
    let app = api::router::router(state.clone());

    TestContext { state, app, _guard: guard }
}

/// Registers a user through the API and returns their access token.
pub(crate) async fn register_user(app: &Router, name: &str, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(serde_json::json!({
                "name": name,
                "email": email,
                "password": TEST_PASSWORD,
                "role": "student"
            })),
        ))
        .await
        .expect("register response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    body["access_token"].as_str().expect("access token").to_string()
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

/// One multipart part: `(field name, optional file name + content type, bytes)`.
pub(crate) struct Part<'a> {
    pub(crate) name: &'a str,
    pub(crate) file: Option<(&'a str, &'a str)>,
    pub(crate) data: &'a [u8],
}

impl<'a> Part<'a> {
    pub(crate) fn text(name: &'a str, value: &'a str) -> Self {
        Self { name, file: None, data: value.as_bytes() }
    }

    pub(crate) fn file(file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self { name: "files", file: Some((file_name, content_type)), data }
    }
}

pub(crate) fn multipart_request(uri: &str, token: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match part.file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("multipart request")
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}
