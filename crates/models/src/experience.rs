use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::category::Category;
use crate::coordinate::Coordinate;

/// An experience record as the experience service publishes it. The gateway
/// never mutates one; timestamps stay opaque strings since nothing here
/// computes on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub address: Option<String>,
    pub coordinates: Coordinate,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub instagram_handle: Option<String>,
    #[serde(default)]
    pub opening_hours: Value,
    #[serde(default)]
    pub price_range: Option<u8>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_reviews: u64,
    #[serde(default)]
    pub is_hidden_gem: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub authenticity_score: f64,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_minimal_document() {
        let exp: Experience = serde_json::from_str(
            r#"{
                "id": "6f2b9a2e-1111-4222-8333-444455556666",
                "name": "Hidden Garden Cafe",
                "coordinates": {"latitude": -23.55, "longitude": -46.63}
            }"#,
        )
        .unwrap();
        assert_eq!(exp.name, "Hidden Garden Cafe");
        assert_eq!(exp.average_rating, 0.0);
        assert!(exp.photos.is_empty());
        assert!(!exp.is_hidden_gem);
    }

    #[test]
    fn rejects_invalid_coordinates_in_document() {
        let res: Result<Experience, _> = serde_json::from_str(
            r#"{
                "id": "6f2b9a2e-1111-4222-8333-444455556666",
                "name": "Broken",
                "coordinates": {"latitude": -123.0, "longitude": -46.63}
            }"#,
        );
        assert!(res.is_err());
    }
}
