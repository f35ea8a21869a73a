//! Pages hosting the contact form.

use axum::extract::State;
use axum::http::Uri;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tower_sessions::Session;

use crate::contact::{RequestContext, render};
use crate::error::AppResult;
use crate::state::AppState;

/// Host hook name passed to the form renderer.
const FORM_TAG: &str = "recapito";

/// Create the front router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(contact_page))
        .route("/contact", get(contact_page))
}

/// Render a page with the embedded contact form.
///
/// The attribute overrides come from configuration.
async fn contact_page(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
) -> AppResult<Html<String>> {
    let ctx = RequestContext::for_render(&state.config().site_url, uri.path());

    let form_html = render::render_form(
        &state,
        &session,
        &state.config().contact_attributes,
        FORM_TAG,
        &ctx,
    )
    .await?;

    let mut context = tera::Context::new();
    context.insert("site_name", &state.config().site_name);
    context.insert("title", "Contact");
    context.insert("content", &form_html);

    let html = state.theme().render("page.html", &context)?;
    Ok(Html(html))
}
