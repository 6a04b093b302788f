pub mod credential;
pub mod photo;
pub mod places;

use axum::routing::{get, post};
use axum::Router;

use crate::server::state::AppState;

/// Relay routes: credential issuance, nearby search, and photo streaming.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ephemeral-key", post(credential::handler))
        .route("/nearby-places", post(places::handler))
        .route("/place-photo", get(photo::handler))
}
