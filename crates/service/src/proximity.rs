//! "Experiences near a coordinate": linear scan over the candidate set with
//! radius and attribute filters and a deterministic ordering.
//!
//! No geo-indexed store is assumed. The radius and limit ceilings keep the
//! scan acceptable at this scale; a spatially indexed store could replace
//! `ExperienceStore::list_all` behind the same contract.

use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use models::{Coordinate, Experience};

use crate::errors::ServiceError;
use crate::geo::{haversine_km, round2};
use crate::store::{ExperienceStore, StoreError};

pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const MAX_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 100;

/// One nearby-search request. Built per request, discarded after use.
#[derive(Debug, Clone)]
pub struct ProximityQuery {
    pub origin: Coordinate,
    pub radius_km: f64,
    pub limit: usize,
    pub category_id: Option<Uuid>,
    pub min_rating: Option<f64>,
}

impl ProximityQuery {
    pub fn new(origin: Coordinate) -> Self {
        Self {
            origin,
            radius_km: DEFAULT_RADIUS_KM,
            limit: DEFAULT_LIMIT,
            category_id: None,
            min_rating: None,
        }
    }

    /// Radius after clamping to the hard ceiling. Oversized values are
    /// silently bounded, never rejected.
    pub fn effective_radius_km(&self) -> f64 {
        self.radius_km.clamp(0.0, MAX_RADIUS_KM)
    }

    /// Limit after clamping to the hard ceiling.
    pub fn effective_limit(&self) -> usize {
        self.limit.min(MAX_LIMIT)
    }
}

/// An experience paired with its distance from the query origin, rounded to
/// two decimals for presentation.
#[derive(Debug, Clone)]
pub struct ProximityResult {
    pub experience: Experience,
    pub distance_km: f64,
}

pub struct ProximityResolver<S: ExperienceStore> {
    store: Arc<S>,
}

impl<S: ExperienceStore> ProximityResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Find experiences within the (clamped) radius of the query origin,
    /// ordered by ascending distance with entity id as the tie-break key.
    ///
    /// An unreachable store fails the whole operation: an empty result must
    /// mean "correctly found nothing", never "the store was down".
    #[instrument(skip(self, query), fields(radius_km = query.effective_radius_km(), limit = query.effective_limit()))]
    pub async fn find_nearby(
        &self,
        query: &ProximityQuery,
    ) -> Result<Vec<ProximityResult>, ServiceError> {
        let radius_km = query.effective_radius_km();
        let limit = query.effective_limit();

        let candidates = self.store.list_all().await.map_err(|e| match e {
            StoreError::NotFound => {
                ServiceError::UpstreamUnavailable("candidate listing returned not found".into())
            }
            other => ServiceError::from(other),
        })?;

        let mut hits: Vec<(f64, Experience)> = candidates
            .into_iter()
            .filter(|exp| {
                query.category_id.map_or(true, |cat| exp.category_id == Some(cat))
            })
            .filter(|exp| {
                query.min_rating.map_or(true, |min| exp.average_rating >= min)
            })
            .filter_map(|exp| {
                let distance = haversine_km(query.origin, exp.coordinates);
                (distance <= radius_km).then_some((distance, exp))
            })
            .collect();

        // Equidistant candidates order by id so results stay deterministic.
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
        hits.truncate(limit);

        debug!(found = hits.len(), "proximity scan complete");
        Ok(hits
            .into_iter()
            .map(|(distance, experience)| ProximityResult {
                experience,
                distance_km: round2(distance),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::MockExperienceStore;
    use serde_json::Value;

    fn origin() -> Coordinate {
        Coordinate::new(-23.5505, -46.6333).unwrap()
    }

    /// Place a candidate due north of the origin at an exact great-circle
    /// distance: along a meridian the haversine reduces to R * dlat.
    fn at_distance_km(origin: Coordinate, km: f64) -> Coordinate {
        let dlat = (km / crate::geo::EARTH_RADIUS_KM).to_degrees();
        Coordinate::new(origin.latitude + dlat, origin.longitude).unwrap()
    }

    fn experience(id: Uuid, coordinates: Coordinate) -> Experience {
        Experience {
            id,
            name: format!("exp-{id}"),
            description: None,
            category_id: None,
            category: None,
            address: None,
            coordinates,
            phone: None,
            website_url: None,
            instagram_handle: None,
            opening_hours: Value::Null,
            price_range: None,
            average_rating: 0.0,
            total_reviews: 0,
            is_hidden_gem: false,
            is_verified: false,
            authenticity_score: 0.0,
            photos: Vec::new(),
            created_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn candidates_at(distances: &[f64]) -> Vec<Experience> {
        distances
            .iter()
            .map(|&d| experience(Uuid::new_v4(), at_distance_km(origin(), d)))
            .collect()
    }

    #[tokio::test]
    async fn filters_by_radius_and_orders_ascending() {
        let store = Arc::new(MockExperienceStore::with_experiences(candidates_at(&[
            9.9, 25.0, 2.0, 10.1,
        ])));
        let resolver = ProximityResolver::new(store);
        let mut query = ProximityQuery::new(origin());
        query.radius_km = 10.0;

        let results = resolver.find_nearby(&query).await.unwrap();
        let distances: Vec<f64> = results.iter().map(|r| r.distance_km).collect();
        assert_eq!(distances, vec![2.0, 9.9]);
    }

    #[tokio::test]
    async fn every_result_is_within_the_clamped_radius() {
        let store = Arc::new(MockExperienceStore::with_experiences(candidates_at(&[
            1.0, 4.0, 49.0, 60.0, 120.0,
        ])));
        let resolver = ProximityResolver::new(store);
        let mut query = ProximityQuery::new(origin());
        query.radius_km = 500.0; // clamped to 50

        let results = resolver.find_nearby(&query).await.unwrap();
        assert_eq!(results.len(), 3);
        for r in &results {
            assert!(r.distance_km <= MAX_RADIUS_KM);
        }
    }

    #[tokio::test]
    async fn oversized_radius_behaves_like_the_ceiling() {
        let experiences = candidates_at(&[1.0, 30.0, 49.5, 55.0]);
        let resolver_a = ProximityResolver::new(Arc::new(
            MockExperienceStore::with_experiences(experiences.clone()),
        ));
        let resolver_b = ProximityResolver::new(Arc::new(
            MockExperienceStore::with_experiences(experiences),
        ));

        let mut huge = ProximityQuery::new(origin());
        huge.radius_km = 500.0;
        let mut capped = ProximityQuery::new(origin());
        capped.radius_km = MAX_RADIUS_KM;

        let a: Vec<Uuid> = resolver_a
            .find_nearby(&huge)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.experience.id)
            .collect();
        let b: Vec<Uuid> = resolver_b
            .find_nearby(&capped)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.experience.id)
            .collect();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn oversized_limit_behaves_like_the_ceiling() {
        let distances: Vec<f64> = (1..=120).map(|i| i as f64 * 0.1).collect();
        let store = Arc::new(MockExperienceStore::with_experiences(candidates_at(&distances)));
        let resolver = ProximityResolver::new(store);
        let mut query = ProximityQuery::new(origin());
        query.radius_km = 50.0;
        query.limit = 1000; // clamped to 100

        let results = resolver.find_nearby(&query).await.unwrap();
        assert_eq!(results.len(), MAX_LIMIT);
        // non-decreasing in distance
        for pair in results.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
    }

    #[tokio::test]
    async fn equidistant_candidates_order_by_id() {
        let spot = at_distance_km(origin(), 3.0);
        let mut ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let experiences: Vec<Experience> =
            ids.iter().map(|&id| experience(id, spot)).collect();
        let resolver =
            ProximityResolver::new(Arc::new(MockExperienceStore::with_experiences(experiences)));

        let results = resolver.find_nearby(&ProximityQuery::new(origin())).await.unwrap();
        ids.sort();
        let got: Vec<Uuid> = results.into_iter().map(|r| r.experience.id).collect();
        assert_eq!(got, ids);
    }

    #[tokio::test]
    async fn applies_category_and_min_rating_filters() {
        let cat = Uuid::new_v4();
        let mut a = experience(Uuid::new_v4(), at_distance_km(origin(), 1.0));
        a.category_id = Some(cat);
        a.average_rating = 4.5;
        let mut b = experience(Uuid::new_v4(), at_distance_km(origin(), 1.5));
        b.category_id = Some(cat);
        b.average_rating = 3.0;
        let c = experience(Uuid::new_v4(), at_distance_km(origin(), 2.0));

        let resolver = ProximityResolver::new(Arc::new(MockExperienceStore::with_experiences(
            vec![a.clone(), b, c],
        )));
        let mut query = ProximityQuery::new(origin());
        query.category_id = Some(cat);
        query.min_rating = Some(4.0);

        let results = resolver.find_nearby(&query).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].experience.id, a.id);
    }

    #[tokio::test]
    async fn empty_candidate_set_is_an_empty_success() {
        let resolver =
            ProximityResolver::new(Arc::new(MockExperienceStore::with_experiences(Vec::new())));
        let results = resolver.find_nearby(&ProximityQuery::new(origin())).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_upstream_unavailable() {
        let store = Arc::new(MockExperienceStore::with_experiences(candidates_at(&[1.0])));
        store.set_unavailable(true);
        let resolver = ProximityResolver::new(store);

        let err = resolver.find_nearby(&ProximityQuery::new(origin())).await.unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamUnavailable(_)));
    }
}
