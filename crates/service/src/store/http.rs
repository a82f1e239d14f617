//! reqwest-backed entity store speaking the downstream services' envelopes.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use models::{Experience, Review, ReviewStats};

use super::{ExperienceStore, ReviewStore, StoreError};
use async_trait::async_trait;

/// Candidate listing walks pagination; cap the walk so a misbehaving
/// downstream cannot keep us looping.
const MAX_CANDIDATE_PAGES: u32 = 50;
const CANDIDATE_PAGE_SIZE: u32 = 100;

/// HTTP client for one downstream service, bound to a single base URL at
/// construction. Timeouts live on the shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpEntityStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEntityStore {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Deserialize)]
struct ExperienceEnvelope {
    experience: Experience,
}

#[derive(Deserialize)]
struct ExperienceListEnvelope {
    #[serde(default)]
    experiences: Vec<Experience>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct Pagination {
    #[serde(default)]
    has_next: bool,
}

#[derive(Deserialize)]
struct ReviewListEnvelope {
    #[serde(default)]
    reviews: Vec<Review>,
}

fn transport_error(err: reqwest::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

/// Map the response by status class: 2xx decodes, 404 is a typed miss, other
/// 4xx means we sent something the downstream rejects, 5xx counts as
/// unavailability.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return resp.json::<T>().await.map_err(|e| StoreError::Decode(e.to_string()));
    }
    match status {
        StatusCode::NOT_FOUND => Err(StoreError::NotFound),
        s if s.is_client_error() => Err(StoreError::Rejected(s.as_u16())),
        s => Err(StoreError::Unavailable(format!("upstream returned {s}"))),
    }
}

#[async_trait]
impl ExperienceStore for HttpEntityStore {
    async fn get(&self, id: Uuid) -> Result<Experience, StoreError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/experiences/{id}")))
            .send()
            .await
            .map_err(transport_error)?;
        let envelope: ExperienceEnvelope = decode(resp).await?;
        Ok(envelope.experience)
    }

    async fn list_all(&self) -> Result<Vec<Experience>, StoreError> {
        let mut all = Vec::new();
        let mut page = 1u32;
        loop {
            let resp = self
                .client
                .get(self.url("/api/experiences"))
                .query(&[("page", page.to_string()), ("per_page", CANDIDATE_PAGE_SIZE.to_string())])
                .send()
                .await
                .map_err(transport_error)?;
            let envelope: ExperienceListEnvelope = decode(resp).await?;
            all.extend(envelope.experiences);

            let has_next = envelope.pagination.map(|p| p.has_next).unwrap_or(false);
            if !has_next || page >= MAX_CANDIDATE_PAGES {
                break;
            }
            page += 1;
        }
        debug!(candidates = all.len(), pages = page, "fetched proximity candidate set");
        Ok(all)
    }

    async fn search(&self, query: &str) -> Result<Vec<Experience>, StoreError> {
        let resp = self
            .client
            .get(self.url("/api/experiences"))
            .query(&[("search", query)])
            .send()
            .await
            .map_err(transport_error)?;
        let envelope: ExperienceListEnvelope = decode(resp).await?;
        Ok(envelope.experiences)
    }
}

#[async_trait]
impl ReviewStore for HttpEntityStore {
    async fn list_for_experience(&self, experience_id: Uuid) -> Result<Vec<Review>, StoreError> {
        let resp = self
            .client
            .get(self.url("/api/reviews"))
            .query(&[
                ("experience_id", experience_id.to_string()),
                ("include_user_info", "true".to_string()),
            ])
            .send()
            .await
            .map_err(transport_error)?;
        let envelope: ReviewListEnvelope = decode(resp).await?;
        Ok(envelope.reviews)
    }

    async fn stats_for_experience(&self, experience_id: Uuid) -> Result<ReviewStats, StoreError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/experiences/{experience_id}/reviews/stats")))
            .send()
            .await
            .map_err(transport_error)?;
        decode(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let store = HttpEntityStore::new(reqwest::Client::new(), "http://exp:3002/");
        assert_eq!(store.url("/api/experiences"), "http://exp:3002/api/experiences");
    }
}
