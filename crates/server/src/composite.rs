//! Handlers for the three composite read operations.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::{Coordinate, Experience, Review};
use service::errors::ServiceError;
use service::proximity::ProximityQuery;

use crate::errors::ApiError;
use crate::observability::{
    REQUESTS_TOTAL, REQUEST_DURATION, SEARCH_DEGRADED_TOTAL, SIDE_FETCH_DEGRADED_TOTAL,
};
use crate::startup::ServerState;

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub limit: Option<usize>,
    pub category_id: Option<Uuid>,
    pub min_rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct NearbyItem {
    #[serde(flatten)]
    pub experience: Experience,
    pub distance_km: f64,
}

/// Effective parameters echoed back so callers can see the clamped values.
#[derive(Debug, Serialize)]
pub struct SearchParamsEcho {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub limit: usize,
    pub category_id: Option<Uuid>,
    pub min_rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub experiences: Vec<NearbyItem>,
    pub search_params: SearchParamsEcho,
    pub total_found: usize,
}

pub async fn nearby(
    State(state): State<ServerState>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<NearbyResponse>, ApiError> {
    REQUESTS_TOTAL.inc();
    let started = Instant::now();

    let (latitude, longitude) = match (params.latitude, params.longitude) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => {
            return Err(ServiceError::InvalidArgument(
                "latitude and longitude are required".into(),
            )
            .into())
        }
    };
    let origin = Coordinate::new(latitude, longitude).map_err(ServiceError::from)?;

    let mut query = ProximityQuery::new(origin);
    if let Some(radius_km) = params.radius_km {
        query.radius_km = radius_km;
    }
    if let Some(limit) = params.limit {
        query.limit = limit;
    }
    query.category_id = params.category_id;
    query.min_rating = params.min_rating;

    let results = state.resolver.find_nearby(&query).await?;
    REQUEST_DURATION.observe(started.elapsed().as_secs_f64());
    info!(found = results.len(), "nearby search served");

    let search_params = SearchParamsEcho {
        latitude,
        longitude,
        radius_km: query.effective_radius_km(),
        limit: query.effective_limit(),
        category_id: query.category_id,
        min_rating: query.min_rating,
    };
    let experiences: Vec<NearbyItem> = results
        .into_iter()
        .map(|r| NearbyItem { experience: r.experience, distance_km: r.distance_km })
        .collect();
    Ok(Json(NearbyResponse {
        total_found: experiences.len(),
        experiences,
        search_params,
    }))
}

#[derive(Debug, Serialize)]
pub struct FullViewResponse {
    #[serde(flatten)]
    pub experience: Experience,
    /// Empty when the reviews side fetch degraded.
    pub reviews: Vec<Review>,
    /// `{}` when the stats side fetch degraded.
    pub review_stats: serde_json::Value,
}

pub async fn full_view(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FullViewResponse>, ApiError> {
    REQUESTS_TOTAL.inc();
    let started = Instant::now();

    let view = state.orchestrator.get_full_view(id).await?;
    REQUEST_DURATION.observe(started.elapsed().as_secs_f64());

    let degraded = view.degraded_sides();
    if degraded > 0 {
        SIDE_FETCH_DEGRADED_TOTAL.inc_by(degraded as u64);
    }
    info!(experience_id = %id, degraded_sides = degraded, "full view served");

    let review_stats = view
        .stats()
        .map(|s| serde_json::to_value(s).unwrap_or_else(|_| serde_json::json!({})))
        .unwrap_or_else(|| serde_json::json!({}));
    let reviews = view.reviews().to_vec();
    let experience = view.experience().clone();
    Ok(Json(FullViewResponse { experience, reviews, review_stats }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub items: Vec<Experience>,
    pub total_found: usize,
}

pub async fn unified_search(
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    REQUESTS_TOTAL.inc();
    let started = Instant::now();

    let outcome = state.search.search(params.q.as_deref().unwrap_or("")).await?;
    REQUEST_DURATION.observe(started.elapsed().as_secs_f64());

    if outcome.degraded {
        SEARCH_DEGRADED_TOTAL.inc();
    }
    info!(query = %outcome.query, found = outcome.total_found, degraded = outcome.degraded, "unified search served");

    Ok(Json(SearchResponse {
        query: outcome.query,
        items: outcome.items,
        total_found: outcome.total_found,
    }))
}
