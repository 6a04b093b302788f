pub mod router;
pub mod state;

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::error::{ArrivaError, Result};
use crate::upstream::HttpUpstream;

/// Start the relay with the given configuration.
pub async fn start(config: RelayConfig) -> Result<()> {
    // Missing keys are reported but do not stop the relay
    config.report_missing();

    let upstream = Arc::new(HttpUpstream::new(&config));
    tracing::info!(
        model = %config.realtime_model,
        places = %config.places_base_url,
        "Initialized upstream providers"
    );

    let bind_addr = config.bind_address();
    let app_state = state::AppState::new(upstream, Arc::new(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| ArrivaError::Server(format!("Failed to bind to {bind_addr}: {e}")))?;

    tracing::info!("Relay listening on {bind_addr}");

    serve(listener, app_state).await
}

/// Serve the relay routes on an already bound listener.
pub async fn serve(listener: tokio::net::TcpListener, state: state::AppState) -> Result<()> {
    let app = router::build(state);
    axum::serve(listener, app)
        .await
        .map_err(|e| ArrivaError::Server(format!("Server error: {e}")))?;

    Ok(())
}
