#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Drives the REAL router and state, with only the mail transport replaced
//! by a recording fake. Each test gets its own [`TestApp`]; sessions and
//! transients live in process, so isolation is free.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_sessions::cookie::SameSite;

use recapito_kernel::config::Config;
use recapito_kernel::routes;
use recapito_kernel::services::email::{Mailer, OutgoingMail};
use recapito_kernel::session::create_session_layer;
use recapito_kernel::state::AppState;

/// Mail transport that records instead of sending.
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail_next: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Make the next send attempt fail.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            bail!("simulated transport failure");
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Test application wrapper using the real routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let mailer = Arc::new(RecordingMailer::new());
        let state = AppState::with_mailer(config, Some(mailer.clone() as Arc<dyn Mailer>))
            .expect("failed to build test state");

        let router = routes::router()
            .layer(create_session_layer(SameSite::Strict))
            .with_state(state.clone());

        Self {
            router,
            state,
            mailer,
        }
    }

    /// Perform a GET request, optionally carrying a session cookie.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::empty()).unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Perform a form-encoded POST request.
    pub async fn post_form(
        &self,
        path: &str,
        body: String,
        cookie: Option<&str>,
        referer: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(referer) = referer {
            builder = builder.header(header::REFERER, referer);
        }
        let request = builder.body(Body::from(body)).unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Configuration pointing at the repository templates, mail unset.
pub fn test_config() -> Config {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let templates_dir = Path::new(manifest_dir)
        .parent() // crates/
        .and_then(Path::parent) // project root
        .expect("failed to locate project root")
        .join("templates");

    Config {
        port: 3000,
        site_url: "http://localhost:3000".to_string(),
        site_name: "Recapito Test".to_string(),
        admin_email: "admin@example.com".to_string(),
        privacy_policy_url: "http://localhost:3000/privacy-policy".to_string(),
        templates_dir,
        smtp_host: None,
        smtp_port: 587,
        smtp_username: None,
        smtp_password: None,
        smtp_encryption: "starttls".to_string(),
        antispam_secret: "test-secret".to_string(),
        antispam_window_secs: 4,
        cookie_same_site: "strict".to_string(),
        contact_attributes: HashMap::new(),
    }
}

/// Extract the session cookie (`name=value`) from a response.
pub fn session_cookie(response: &Response) -> Option<String> {
    let raw = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    raw.split(';').next().map(str::to_string)
}

/// Read the full response body as a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Extract the `value` attribute of the input named `name`.
pub fn input_value(html: &str, name: &str) -> Option<String> {
    let pattern = format!(r#"name="{name}"[^>]*value="([^"]*)""#);
    let re = regex::Regex::new(&pattern).unwrap();
    re.captures(html).map(|c| c[1].to_string())
}

/// Extract the content of the textarea named `name`.
pub fn textarea_value(html: &str, name: &str) -> Option<String> {
    let pattern = format!(r#"<textarea[^>]*name="{name}"[^>]*>([^<]*)</textarea>"#);
    let re = regex::Regex::new(&pattern).unwrap();
    re.captures(html).map(|c| c[1].trim().to_string())
}

/// Count rendered alert blocks.
pub fn alert_count(html: &str) -> usize {
    html.matches(r#"class="alert alert-"#).count()
}

/// Build a form-encoded body from key/value pairs.
pub fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// A rendered form: the tokens and cookie needed to submit it.
pub struct RenderedForm {
    pub cookie: String,
    pub csrf_token: String,
    pub antispam_token: String,
    pub html: String,
}

/// GET the contact page and pull out everything a submission needs.
pub async fn render_form(app: &TestApp, cookie: Option<&str>) -> RenderedForm {
    let response = app.get("/", cookie).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let fresh_cookie = session_cookie(&response);
    let cookie = match (fresh_cookie, cookie) {
        (Some(fresh), _) => fresh,
        (None, Some(existing)) => existing.to_string(),
        (None, None) => panic!("no session cookie issued"),
    };

    let html = body_string(response).await;
    let csrf_token = input_value(&html, "_token").expect("missing CSRF token field");
    let antispam_token =
        input_value(&html, "recapito_before").expect("missing anti-spam token field");

    RenderedForm {
        cookie,
        csrf_token,
        antispam_token,
        html,
    }
}
