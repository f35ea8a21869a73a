//! Form rendering.
//!
//! Stores the merged per-page configuration for the submission handler,
//! consumes any pending result from a previous submission, and renders the
//! alert blocks plus the form itself through Tera.

use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;
use tower_sessions::Session;
use tracing::debug;

use super::types::{FormConfig, SessionResult};
use super::{RequestContext, identity_token};
use crate::state::AppState;
use crate::transient::{TRANSIENT_TTL_SECS, page_key, session_key};

/// One rendered alert block.
#[derive(Debug, Serialize)]
struct Alert {
    css_class: String,
    text: &'static str,
}

/// Render the contact form for the page described by `ctx`.
///
/// `attributes` are the host-supplied overrides; `tag` names the invoking
/// host hook. The merged
/// configuration is stored keyed by the page URL hash so the POST handler
/// can retrieve the same mail routing later. Any pending [`SessionResult`]
/// is consumed here; a second render never sees it again.
pub async fn render_form(
    state: &AppState,
    session: &Session,
    attributes: &HashMap<String, String>,
    tag: &str,
    ctx: &RequestContext,
) -> Result<String> {
    debug!(tag = %tag, page = %ctx.page_url, "rendering contact form");

    let config = FormConfig::from_attributes(attributes);
    state
        .transients()
        .set(&page_key(&ctx.page_url), &config, TRANSIENT_TTL_SECS)
        .await;

    // Read-once status and redisplay fields from the previous submission
    let identity = identity_token(session).await?;
    let result: SessionResult = state
        .transients()
        .take(&session_key(&identity))
        .await
        .unwrap_or_default();

    let alerts: Vec<Alert> = result
        .status
        .iter()
        .map(|(severity, code)| Alert {
            css_class: format!("{}{}", config.cssalert, severity.as_str()),
            text: code.text(),
        })
        .collect();

    let csrf_token = super::csrf::generate(session).await?;
    let antispam_token = state.codec().encode(chrono::Utc::now().timestamp());

    let mut context = tera::Context::new();
    context.insert("alerts", &alerts);
    context.insert("fields", &result.fields);
    context.insert("cssbutton", &config.cssbutton);
    context.insert("csrf_token", &csrf_token);
    context.insert("antispam_token", &antispam_token);
    context.insert("action", "/contact");
    context.insert("privacy_url", &state.config().privacy_policy_url);

    state.theme().render("contact/form.html", &context)
}
