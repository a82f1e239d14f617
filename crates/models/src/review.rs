use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub experience_id: Uuid,
    pub user_id: Uuid,
    pub rating: u8,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub visit_date: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub authenticity_score: f64,
    #[serde(default)]
    pub helpful_votes: u64,
    #[serde(default)]
    pub user: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Histogram of star ratings. Serialized with string bucket keys ("1".."5")
/// to match the review service's wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingDistribution {
    #[serde(rename = "1", default)]
    pub one: u64,
    #[serde(rename = "2", default)]
    pub two: u64,
    #[serde(rename = "3", default)]
    pub three: u64,
    #[serde(rename = "4", default)]
    pub four: u64,
    #[serde(rename = "5", default)]
    pub five: u64,
}

impl RatingDistribution {
    fn bump(&mut self, rating: u8) {
        match rating {
            1 => self.one += 1,
            2 => self.two += 1,
            3 => self.three += 1,
            4 => self.four += 1,
            5 => self.five += 1,
            _ => {}
        }
    }
}

/// Per-experience review aggregate. Never persisted: recomputed on demand
/// from the current review collection, so there is no staleness to reason
/// about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStats {
    pub experience_id: Uuid,
    pub total_reviews: u64,
    pub average_rating: f64,
    pub rating_distribution: RatingDistribution,
    pub verified_reviews: u64,
    pub average_authenticity_score: f64,
}

impl ReviewStats {
    pub fn empty(experience_id: Uuid) -> Self {
        Self {
            experience_id,
            total_reviews: 0,
            average_rating: 0.0,
            rating_distribution: RatingDistribution::default(),
            verified_reviews: 0,
            average_authenticity_score: 0.0,
        }
    }

    pub fn from_reviews(experience_id: Uuid, reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self::empty(experience_id);
        }

        let total = reviews.len() as u64;
        let mut distribution = RatingDistribution::default();
        let mut rating_sum = 0u64;
        let mut authenticity_sum = 0.0;
        let mut verified = 0u64;
        for review in reviews {
            distribution.bump(review.rating);
            rating_sum += u64::from(review.rating);
            authenticity_sum += review.authenticity_score;
            if review.is_verified {
                verified += 1;
            }
        }

        Self {
            experience_id,
            total_reviews: total,
            average_rating: round2(rating_sum as f64 / total as f64),
            rating_distribution: distribution,
            verified_reviews: verified,
            average_authenticity_score: round2(authenticity_sum / total as f64),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: u8, verified: bool, authenticity: f64) -> Review {
        Review {
            id: Uuid::new_v4(),
            experience_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            rating,
            title: None,
            content: None,
            photos: Vec::new(),
            visit_date: None,
            is_verified: verified,
            authenticity_score: authenticity,
            helpful_votes: 0,
            user: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn empty_collection_yields_zeroed_stats() {
        let id = Uuid::new_v4();
        let stats = ReviewStats::from_reviews(id, &[]);
        assert_eq!(stats.experience_id, id);
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.rating_distribution, RatingDistribution::default());
    }

    #[test]
    fn aggregates_counts_means_and_histogram() {
        let id = Uuid::new_v4();
        let reviews = vec![
            review(5, true, 0.9),
            review(4, false, 0.5),
            review(4, true, 0.7),
        ];
        let stats = ReviewStats::from_reviews(id, &reviews);
        assert_eq!(stats.total_reviews, 3);
        assert_eq!(stats.average_rating, 4.33);
        assert_eq!(stats.rating_distribution.four, 2);
        assert_eq!(stats.rating_distribution.five, 1);
        assert_eq!(stats.verified_reviews, 2);
        assert_eq!(stats.average_authenticity_score, 0.7);
    }

    #[test]
    fn distribution_serializes_with_string_bucket_keys() {
        let stats = ReviewStats::from_reviews(Uuid::new_v4(), &[review(3, false, 0.0)]);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["rating_distribution"]["3"], 1);
        assert_eq!(json["rating_distribution"]["1"], 0);
    }
}
