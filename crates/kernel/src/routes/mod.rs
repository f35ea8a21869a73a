//! HTTP route handlers.

pub mod contact;
pub mod front;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Assemble all route modules.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(front::router())
        .merge(contact::router())
        .merge(health::router())
}
