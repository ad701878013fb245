use serde::{Deserialize, Serialize};

pub mod query;
pub mod restaurant;
pub mod scored;
pub mod signals;
pub mod tags;

pub use query::{MealTime, QueryIntent, QueryMode};
pub use restaurant::{City, Coordinates, Restaurant, RestaurantId, Status};
pub use scored::{Reason, ReasonKind, ScoredResult};
pub use signals::{Confidence, ExperienceSignal, PublicSignal, WouldRecommend};
pub use tags::{parse_tags, BestForTag, Dealbreaker, FoodTag, VibeTag};

/// The three tables joined on restaurant id
///
/// Missing experience or public rows are represented by their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    pub restaurant: Restaurant,
    pub experience: ExperienceSignal,
    pub public: PublicSignal,
}

impl RestaurantRecord {
    pub fn new(restaurant: Restaurant) -> Self {
        Self {
            restaurant,
            experience: ExperienceSignal::default(),
            public: PublicSignal::default(),
        }
    }

    pub fn id(&self) -> &RestaurantId {
        &self.restaurant.id
    }

    /// Public price tier, falling back to the master table's
    pub fn price_tier(&self) -> Option<u8> {
        self.public.price_tier.or(self.restaurant.price_tier)
    }
}

// ============================================================================
// Recommendation API Types
// ============================================================================

/// Request for recommendations
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    /// Free-text query, e.g. "romantic dinner in SoHo"
    pub message: String,
    /// City picked explicitly by the client
    #[serde(default)]
    pub city: Option<City>,
    /// Restaurant ids or names to leave out (used to swap a suggestion)
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl RecommendationRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            city: None,
            exclude: Vec::new(),
        }
    }
}

/// Ordered, explained recommendations for one query
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub text_summary: String,
    /// Short label for the request, e.g. "Romantic dinner"
    pub category: Option<String>,
    pub mode: QueryMode,
    pub intent: QueryIntent,
    pub results: Vec<RecommendedRestaurant>,
}

/// One ranked result with display fields
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedRestaurant {
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub city: City,
    pub neighborhood: Option<String>,
    pub status: Status,
    pub total_score: f64,
    pub match_score: f64,
    pub taste_score: f64,
    pub public_score: f64,
    pub rationale: Vec<String>,
    pub url: Option<String>,
    pub note: String,
    pub price_tier: Option<u8>,
    pub public_rating: Option<f64>,
    pub public_review_count: Option<u32>,
    pub public_vibe: Option<String>,
    pub distance_km: Option<f64>,
}

impl RecommendedRestaurant {
    /// Joins a score with the record it was computed from
    pub fn from_scored(scored: &ScoredResult, record: &RestaurantRecord) -> Self {
        let restaurant = &record.restaurant;
        Self {
            restaurant_id: scored.restaurant_id.clone(),
            name: restaurant.name.clone(),
            city: restaurant.city,
            neighborhood: restaurant.neighborhood.clone(),
            status: scored.status,
            total_score: round_to_tenth(scored.total_score),
            match_score: round_to_tenth(scored.match_score),
            taste_score: round_to_tenth(scored.taste_score),
            public_score: round_to_tenth(scored.public_score),
            rationale: scored.rationale_lines(),
            url: restaurant.url.clone(),
            note: restaurant.note.clone(),
            price_tier: record.price_tier(),
            public_rating: record.public.rating,
            public_review_count: record.public.review_count,
            public_vibe: record.public.public_vibe.clone(),
            distance_km: scored.distance_km.map(round_to_tenth),
        }
    }
}

/// Compact listing entry
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantSummary {
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub city: City,
    pub neighborhood: Option<String>,
    pub status: Status,
}

impl From<&RestaurantRecord> for RestaurantSummary {
    fn from(record: &RestaurantRecord) -> Self {
        Self {
            restaurant_id: record.restaurant.id.clone(),
            name: record.restaurant.name.clone(),
            city: record.restaurant.city,
            neighborhood: record.restaurant.neighborhood.clone(),
            status: record.restaurant.status,
        }
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_price_tier_prefers_public() {
        let mut restaurant = Restaurant::new("nyc_raku", "Raku", City::Nyc, Status::Tried);
        restaurant.price_tier = Some(3);
        let mut record = RestaurantRecord::new(restaurant);
        assert_eq!(record.price_tier(), Some(3));

        record.public.price_tier = Some(2);
        assert_eq!(record.price_tier(), Some(2));
    }

    #[test]
    fn test_recommendation_request_defaults() {
        let request: RecommendationRequest =
            serde_json::from_str(r#"{"message": "pasta in Brera"}"#).unwrap();
        assert_eq!(request.message, "pasta in Brera");
        assert!(request.city.is_none());
        assert!(request.exclude.is_empty());
    }

    #[test]
    fn test_recommendation_request_with_city() {
        let request: RecommendationRequest =
            serde_json::from_str(r#"{"message": "ramen", "city": "NYC"}"#).unwrap();
        assert_eq!(request.city, Some(City::Nyc));
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(0.84), 0.8);
        assert_eq!(round_to_tenth(12.36), 12.4);
    }
}
