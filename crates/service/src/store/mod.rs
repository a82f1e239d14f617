//! Entity store abstraction over the downstream services.
//!
//! Each downstream is a read-only HTTP collaborator; the traits here keep the
//! composite services independent of the transport, and `StoreError` keeps
//! "record does not exist" distinct from "service was unreachable" so a
//! timeout can never be mistaken for a missing row.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use models::{Experience, Review, ReviewStats};

pub mod http;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity not found")]
    NotFound,
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
    #[error("upstream rejected request with status {0}")]
    Rejected(u16),
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

/// Read access to the experience service.
#[async_trait]
pub trait ExperienceStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Experience, StoreError>;
    /// Full candidate set for proximity scans. No spatial index is assumed.
    async fn list_all(&self) -> Result<Vec<Experience>, StoreError>;
    async fn search(&self, query: &str) -> Result<Vec<Experience>, StoreError>;
}

/// Read access to the review service.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn list_for_experience(&self, experience_id: Uuid) -> Result<Vec<Review>, StoreError>;
    async fn stats_for_experience(&self, experience_id: Uuid) -> Result<ReviewStats, StoreError>;
}

/// In-memory stores for tests and doc examples.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    pub struct MockExperienceStore {
        experiences: Vec<Experience>,
        unavailable: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockExperienceStore {
        pub fn with_experiences(experiences: Vec<Experience>) -> Self {
            Self { experiences, ..Self::default() }
        }

        /// Make every subsequent call fail as if the service were down.
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn check_available(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.unavailable.load(Ordering::SeqCst) {
                Err(StoreError::Unavailable("mock store is down".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ExperienceStore for MockExperienceStore {
        async fn get(&self, id: Uuid) -> Result<Experience, StoreError> {
            self.check_available()?;
            self.experiences
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .ok_or(StoreError::NotFound)
        }

        async fn list_all(&self) -> Result<Vec<Experience>, StoreError> {
            self.check_available()?;
            Ok(self.experiences.clone())
        }

        async fn search(&self, query: &str) -> Result<Vec<Experience>, StoreError> {
            self.check_available()?;
            let needle = query.to_lowercase();
            Ok(self
                .experiences
                .iter()
                .filter(|e| {
                    e.name.to_lowercase().contains(&needle)
                        || e.description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(&needle))
                        || e.address
                            .as_deref()
                            .is_some_and(|a| a.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub struct MockReviewStore {
        reviews: Vec<Review>,
        reviews_unavailable: AtomicBool,
        stats_unavailable: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockReviewStore {
        pub fn with_reviews(reviews: Vec<Review>) -> Self {
            Self { reviews, ..Self::default() }
        }

        pub fn set_reviews_unavailable(&self, unavailable: bool) {
            self.reviews_unavailable.store(unavailable, Ordering::SeqCst);
        }

        pub fn set_stats_unavailable(&self, unavailable: bool) {
            self.stats_unavailable.store(unavailable, Ordering::SeqCst);
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReviewStore for MockReviewStore {
        async fn list_for_experience(
            &self,
            experience_id: Uuid,
        ) -> Result<Vec<Review>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.reviews_unavailable.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("mock review store is down".into()));
            }
            Ok(self
                .reviews
                .iter()
                .filter(|r| r.experience_id == experience_id)
                .cloned()
                .collect())
        }

        async fn stats_for_experience(
            &self,
            experience_id: Uuid,
        ) -> Result<ReviewStats, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.stats_unavailable.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("mock review store is down".into()));
            }
            let reviews = self
                .reviews
                .iter()
                .filter(|r| r.experience_id == experience_id)
                .cloned()
                .collect::<Vec<_>>();
            Ok(ReviewStats::from_reviews(experience_id, &reviews))
        }
    }
}
