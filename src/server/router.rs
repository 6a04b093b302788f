use axum::middleware;
use axum::Router;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::state::AppState;
use crate::api;
use crate::auth;

/// Build the relay router. Every route sits behind the shared-token gate;
/// the concurrency cap is shared by all routes.
pub fn build(state: AppState) -> Router {
    let max_concurrent = state.config.max_concurrent_requests.max(1);

    api::routes()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ))
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
