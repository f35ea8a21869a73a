//! Contact form submission lifecycle.
//!
//! Renders the form (storing per-page mail routing in the transient store),
//! processes submissions (anti-spam gate, validation, mail dispatch), and
//! carries the result across the post/redirect/get boundary.

pub mod csrf;
pub mod process;
pub mod render;
pub mod types;
pub mod validate;

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tower_sessions::Session;
use url::Url;
use uuid::Uuid;

/// Session key holding the identity token that keys the session result.
const SESSION_IDENTITY_KEY: &str = "contact_identity";

#[allow(clippy::unwrap_used)] // pattern is a constant
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Per-request facts the renderer and processor need from the HTTP layer:
/// no handler reaches into globals.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Canonical URL of the page being rendered.
    pub page_url: String,
    /// Referring URL of a submission, as sent by the browser.
    pub referer: Option<String>,
}

impl RequestContext {
    /// Context for a page render at `path`.
    pub fn for_render(site_url: &str, path: &str) -> Self {
        Self {
            page_url: canonical_page_url(site_url, path),
            referer: None,
        }
    }

    /// Context for a submission arriving with the given Referer header.
    pub fn for_submission(referer: Option<&str>) -> Self {
        Self {
            page_url: String::new(),
            referer: referer.map(str::to_string),
        }
    }
}

/// Canonical URL for a page path: site origin plus path, query and fragment
/// dropped. Both the render and submission sides key the page configuration
/// off this value.
pub fn canonical_page_url(site_url: &str, path: &str) -> String {
    match Url::parse(site_url).and_then(|base| base.join(path)) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => format!("{}{path}", site_url.trim_end_matches('/')),
    }
}

/// Canonicalize an absolute URL the same way: drop query and fragment.
pub fn canonical_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => raw.to_string(),
    }
}

/// Strip HTML tags, drop control characters, and collapse whitespace.
///
/// Applied to every submitted field before validation, redisplay, and the
/// mail body.
pub fn sanitize_text_field(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, "");
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// Get the session's identity token, minting one on first use.
///
/// This is the suffix of the transient key under which the submission result
/// is stored and later consumed.
pub async fn identity_token(session: &Session) -> Result<String> {
    if let Some(token) = session.get::<String>(SESSION_IDENTITY_KEY).await? {
        return Ok(token);
    }

    let token = Uuid::now_v7().simple().to_string();
    session.insert(SESSION_IDENTITY_KEY, token.clone()).await?;
    Ok(token)
}
