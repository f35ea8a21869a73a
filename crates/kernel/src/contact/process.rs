//! Submission processing.
//!
//! Orchestrates the full lifecycle of one POST: CSRF gate, sanitization,
//! per-page configuration lookup, anti-spam check, validation, the single
//! mail dispatch attempt, result persistence, and the redirect decision.
//! Every failure is recovered here into a status message; nothing propagates
//! to an error page.

use anyhow::{Result, bail};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, warn};
use url::Url;

use super::types::{FormConfig, MessageCode, SessionResult, Severity, SubmittedFields};
use super::validate::{AntiSpamVerdict, check_token, validate};
use super::{RequestContext, canonical_url, csrf, identity_token, sanitize_text_field};
use crate::services::email::OutgoingMail;
use crate::state::AppState;
use crate::transient::{TRANSIENT_TTL_SECS, page_key, session_key};

/// Wire format of a form submission.
///
/// The field names are a decoy layout: the visible email input is
/// `recapito_url` and the hidden honeypot, labeled "Homepage", is
/// `recapito_email`. Missing fields default to the empty string.
#[derive(Debug, Deserialize)]
pub struct ContactSubmission {
    #[serde(rename = "recapito_name", default)]
    pub name: String,
    #[serde(rename = "recapito_url", default)]
    pub email: String,
    #[serde(rename = "recapito_message", default)]
    pub message: String,
    #[serde(rename = "recapito_email", default)]
    pub honeypot: String,
    #[serde(rename = "recapito_before", default)]
    pub antispam_token: String,
    #[serde(rename = "_token", default)]
    pub csrf_token: String,
}

/// Terminal decision of the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// CSRF verification failed: no redirect, no state change.
    Ignored,
    /// Redirect the browser to this location.
    Redirect(String),
}

/// Process one submission.
pub async fn process(
    state: &AppState,
    session: &Session,
    ctx: &RequestContext,
    submission: &ContactSubmission,
) -> ProcessOutcome {
    // Silent no-op on a bad or missing form token
    match csrf::verify(session, &submission.csrf_token).await {
        Ok(true) => {}
        Ok(false) => {
            debug!("ignoring submission with invalid form token");
            return ProcessOutcome::Ignored;
        }
        Err(e) => {
            warn!(error = %e, "form token verification failed; ignoring submission");
            return ProcessOutcome::Ignored;
        }
    }

    let fields = SubmittedFields {
        name: sanitize_text_field(&submission.name),
        email: sanitize_text_field(&submission.email),
        message: sanitize_text_field(&submission.message),
    };
    let honeypot = sanitize_text_field(&submission.honeypot);

    let now = chrono::Utc::now().timestamp();
    let verdict = check_token(
        state.codec(),
        &submission.antispam_token,
        now,
        state.config().antispam_window_secs,
    );

    // Mail routing saved when the referring page rendered the form, with
    // site-wide fallbacks for anything unset
    let page_config = lookup_page_config(state, ctx).await;
    let mailto = page_config
        .mailto
        .clone()
        .unwrap_or_else(|| state.config().admin_email.clone());
    let header_mailto = page_config
        .headermailto
        .clone()
        .unwrap_or_else(|| state.config().admin_email.clone());
    let header_name = page_config
        .headername
        .clone()
        .unwrap_or_else(|| state.config().site_name.clone());

    let mut status = validate(&fields, &honeypot, verdict);

    let mut redisplay = fields.clone();
    if verdict == AntiSpamVerdict::Trusted && status.is_empty() {
        match dispatch(state, &fields, &mailto, &header_mailto, &header_name).await {
            Ok(()) => {
                status.push(Severity::Success, MessageCode::Success);
                redisplay = SubmittedFields::default();
            }
            Err(e) => {
                warn!(error = %e, "contact mail dispatch failed");
                status.push(Severity::Danger, MessageCode::Error);
            }
        }
    }

    // Persist the result for the render after the redirect
    match identity_token(session).await {
        Ok(identity) => {
            let result = SessionResult {
                fields: redisplay,
                status,
            };
            state
                .transients()
                .set(&session_key(&identity), &result, TRANSIENT_TTL_SECS)
                .await;
        }
        Err(e) => {
            warn!(error = %e, "failed to resolve session identity; submission result dropped");
        }
    }

    ProcessOutcome::Redirect(redirect_target(
        &state.config().site_url,
        ctx.referer.as_deref(),
    ))
}

/// Look up the form configuration stored when the referring page rendered.
async fn lookup_page_config(state: &AppState, ctx: &RequestContext) -> FormConfig {
    let Some(referer) = ctx.referer.as_deref() else {
        return FormConfig::default();
    };

    let key = page_key(&canonical_url(referer));
    state
        .transients()
        .get::<FormConfig>(&key)
        .await
        .unwrap_or_default()
}

/// Build and send the contact mail. At most one attempt per submission.
async fn dispatch(
    state: &AppState,
    fields: &SubmittedFields,
    mailto: &str,
    header_mailto: &str,
    header_name: &str,
) -> Result<()> {
    let mail = OutgoingMail {
        to: mailto.to_string(),
        subject: format!("Message from {header_name}"),
        body: format!(
            "Name: {}\r\nEmail: {}\r\nMessage: {}",
            fields.name, fields.email, fields.message
        ),
        header_name: header_name.to_string(),
        header_mailto: header_mailto.to_string(),
    };

    let Some(mailer) = state.mailer() else {
        bail!("mail transport not configured");
    };
    mailer.send(&mail).await
}

/// Safe redirect target: the referring URL when it shares the site's origin,
/// the site root otherwise.
fn redirect_target(site_url: &str, referer: Option<&str>) -> String {
    if let (Some(referer), Ok(site)) = (referer, Url::parse(site_url))
        && let Ok(target) = Url::parse(referer)
        && target.scheme() == site.scheme()
        && target.host_str() == site.host_str()
        && target.port_or_known_default() == site.port_or_known_default()
    {
        return referer.to_string();
    }

    site_url.to_string()
}
