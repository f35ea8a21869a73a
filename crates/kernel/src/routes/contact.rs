//! Submission endpoint.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Router};
use tower_sessions::Session;

use crate::contact::RequestContext;
use crate::contact::process::{ContactSubmission, ProcessOutcome, process};
use crate::state::AppState;

/// Create the contact router.
pub fn router() -> Router<AppState> {
    Router::new().route("/contact", post(submit))
}

/// Handle a form submission.
///
/// POST /contact
///
/// Always answers with a 302 back to the referring page (or the site root);
/// the redirect is the terminal action. The one exception is a failed CSRF
/// check, which ends the request with no redirect and no state change.
async fn submit(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(submission): Form<ContactSubmission>,
) -> Response {
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok());
    let ctx = RequestContext::for_submission(referer);

    match process(&state, &session, &ctx, &submission).await {
        ProcessOutcome::Ignored => StatusCode::NO_CONTENT.into_response(),
        ProcessOutcome::Redirect(location) => {
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
    }
}
