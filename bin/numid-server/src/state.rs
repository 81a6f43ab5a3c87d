//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use numid_core::Dispatcher;

use crate::config::Config;

/// State shared across all HTTP handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// The upstream model.
    pub dispatcher: Arc<dyn Dispatcher>,
}

impl AppState {
    /// The request's model, or the configured default.
    pub fn model_or_default(&self, model: Option<String>) -> String {
        model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.config.default_model.clone())
    }
}
