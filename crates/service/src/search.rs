//! Unified search: a single downstream search with degrade-to-empty
//! semantics. Unlike the full-view aggregation, even the lone downstream call
//! is best-effort here: "found nothing" and "backend unreachable" are the
//! same externally observable outcome for this endpoint.

use std::sync::Arc;

use tracing::{instrument, warn};

use models::Experience;

use crate::errors::ServiceError;
use crate::store::ExperienceStore;

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub query: String,
    pub items: Vec<Experience>,
    pub total_found: usize,
    /// True when the downstream failed and the empty item list is a
    /// degradation rather than a genuine miss. Not part of the response body;
    /// feeds logs and metrics only.
    pub degraded: bool,
}

pub struct UnifiedSearchCoordinator<S: ExperienceStore> {
    store: Arc<S>,
}

impl<S: ExperienceStore> UnifiedSearchCoordinator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Search experiences by free text.
    ///
    /// An empty (post-trim) query is a local precondition failure and is
    /// rejected before any downstream call.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::search::UnifiedSearchCoordinator;
    /// use service::store::mock::MockExperienceStore;
    /// let svc = UnifiedSearchCoordinator::new(Arc::new(MockExperienceStore::default()));
    /// let outcome = tokio_test::block_on(svc.search("  coffee  ")).unwrap();
    /// assert_eq!(outcome.query, "coffee");
    /// assert_eq!(outcome.total_found, 0);
    /// ```
    #[instrument(skip(self, raw_query))]
    pub async fn search(&self, raw_query: &str) -> Result<SearchOutcome, ServiceError> {
        let query = raw_query.trim();
        if query.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "search query must not be empty".into(),
            ));
        }

        let (items, degraded) = match self.store.search(query).await {
            Ok(items) => (items, false),
            Err(err) => {
                warn!(error = %err, "search backend unavailable; returning empty result");
                (Vec::new(), true)
            }
        };

        Ok(SearchOutcome {
            query: query.to_string(),
            total_found: items.len(),
            items,
            degraded,
        })
    }
}
