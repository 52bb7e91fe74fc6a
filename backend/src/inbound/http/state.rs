//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O. Everything is
//! constructor-injected; there are no module-level singletons.

use std::sync::Arc;

use crate::domain::ports::{AccountService, FeedbackService, TaxonomyService, TokenCodec};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, login and profile operations.
    pub accounts: Arc<dyn AccountService>,
    /// Feedback list and mutation operations.
    pub feedback: Arc<dyn FeedbackService>,
    /// Category/status reads and category creation.
    pub taxonomy: Arc<dyn TaxonomyService>,
    /// Token verification for the bearer extractors.
    pub tokens: Arc<dyn TokenCodec>,
}

impl HttpState {
    /// Bundle the given port implementations.
    pub fn new(
        accounts: Arc<dyn AccountService>,
        feedback: Arc<dyn FeedbackService>,
        taxonomy: Arc<dyn TaxonomyService>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            accounts,
            feedback,
            taxonomy,
            tokens,
        }
    }
}
