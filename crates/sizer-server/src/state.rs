//! Application State

use std::sync::Arc;

use kelly_sizer::KellyOptimizer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Sizing engine; configuration only, safe to share across requests
    pub optimizer: Arc<KellyOptimizer>,
}

impl AppState {
    pub fn new(optimizer: KellyOptimizer) -> Self {
        Self {
            optimizer: Arc::new(optimizer),
        }
    }
}
