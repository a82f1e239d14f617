//! Composite "full experience" read across the experience and review
//! services.
//!
//! The primary fetch is load-bearing: its failure aborts the operation and no
//! side fetch is issued. Side fetches run concurrently once the primary is in
//! hand; each one degrades to an absent branch on failure or timeout instead
//! of failing the request. A composite read must not become unavailable
//! because one best-effort dependency is down, but it must never fabricate
//! primary data.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{instrument, warn};
use uuid::Uuid;

use models::{Experience, Review, ReviewStats};

use crate::errors::ServiceError;
use crate::store::{ExperienceStore, ReviewStore, StoreError};

pub const DEFAULT_SIDE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Merged view with missing-branch states as explicit variants rather than
/// absent keys in an open map.
#[derive(Debug, Clone)]
pub enum AggregatedView {
    PrimaryOnly {
        experience: Experience,
    },
    WithReviews {
        experience: Experience,
        reviews: Vec<Review>,
    },
    WithStats {
        experience: Experience,
        stats: ReviewStats,
    },
    Full {
        experience: Experience,
        reviews: Vec<Review>,
        stats: ReviewStats,
    },
}

impl AggregatedView {
    fn compose(
        experience: Experience,
        reviews: Option<Vec<Review>>,
        stats: Option<ReviewStats>,
    ) -> Self {
        match (reviews, stats) {
            (Some(reviews), Some(stats)) => Self::Full { experience, reviews, stats },
            (Some(reviews), None) => Self::WithReviews { experience, reviews },
            (None, Some(stats)) => Self::WithStats { experience, stats },
            (None, None) => Self::PrimaryOnly { experience },
        }
    }

    pub fn experience(&self) -> &Experience {
        match self {
            Self::PrimaryOnly { experience }
            | Self::WithReviews { experience, .. }
            | Self::WithStats { experience, .. }
            | Self::Full { experience, .. } => experience,
        }
    }

    /// Reviews branch; empty when that side fetch degraded.
    pub fn reviews(&self) -> &[Review] {
        match self {
            Self::WithReviews { reviews, .. } | Self::Full { reviews, .. } => reviews,
            _ => &[],
        }
    }

    /// Stats branch; `None` when that side fetch degraded.
    pub fn stats(&self) -> Option<&ReviewStats> {
        match self {
            Self::WithStats { stats, .. } | Self::Full { stats, .. } => Some(stats),
            _ => None,
        }
    }

    /// Number of side branches that degraded to empty.
    pub fn degraded_sides(&self) -> usize {
        match self {
            Self::Full { .. } => 0,
            Self::WithReviews { .. } | Self::WithStats { .. } => 1,
            Self::PrimaryOnly { .. } => 2,
        }
    }
}

/// Run one best-effort branch of a composite read: a failure or timeout is
/// logged and collapses to `None`, never to an operation error.
pub async fn side_fetch<T, F>(label: &'static str, timeout: Duration, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            warn!(fetch = label, error = %err, "side fetch failed; degrading to empty");
            None
        }
        Err(_) => {
            warn!(fetch = label, timeout_secs = timeout.as_secs(), "side fetch timed out; degrading to empty");
            None
        }
    }
}

pub struct AggregationOrchestrator<E: ExperienceStore, R: ReviewStore> {
    experiences: Arc<E>,
    reviews: Arc<R>,
    side_timeout: Duration,
}

impl<E: ExperienceStore, R: ReviewStore> AggregationOrchestrator<E, R> {
    pub fn new(experiences: Arc<E>, reviews: Arc<R>) -> Self {
        Self { experiences, reviews, side_timeout: DEFAULT_SIDE_FETCH_TIMEOUT }
    }

    pub fn with_side_timeout(mut self, side_timeout: Duration) -> Self {
        self.side_timeout = side_timeout;
        self
    }

    /// Fetch an experience and enrich it with its reviews and review stats.
    ///
    /// The primary fetch is awaited first; only on success are the side
    /// fetches issued, concurrently, each under its own timeout.
    #[instrument(skip(self), fields(experience_id = %id))]
    pub async fn get_full_view(&self, id: Uuid) -> Result<AggregatedView, ServiceError> {
        let experience = self.experiences.get(id).await.map_err(|e| match e {
            StoreError::NotFound => ServiceError::NotFound(format!("experience {id}")),
            other => ServiceError::from(other),
        })?;

        let (reviews, stats) = tokio::join!(
            side_fetch("reviews", self.side_timeout, self.reviews.list_for_experience(id)),
            side_fetch("review_stats", self.side_timeout, self.reviews.stats_for_experience(id)),
        );

        Ok(AggregatedView::compose(experience, reviews, stats))
    }
}
