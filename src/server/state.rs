use std::sync::Arc;

use crate::config::RelayConfig;
use crate::upstream::Upstream;

/// Shared application state accessible to all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn Upstream>,
    pub config: Arc<RelayConfig>,
}

impl AppState {
    pub fn new(upstream: Arc<dyn Upstream>, config: Arc<RelayConfig>) -> Self {
        Self { upstream, config }
    }
}
