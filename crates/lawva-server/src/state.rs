//! Shared application state for the Lawva server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`.

use std::sync::Arc;

use crate::repository::CertificationRepository;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Certification lookups for the data endpoint and pages.
    pub repository: Arc<dyn CertificationRepository>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
