use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{BestForTag, City, Coordinates, RestaurantId, VibeTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealTime {
    Lunch,
    Dinner,
}

/// How a query is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Score every candidate in the city and rank them
    Ranked,
    /// The query named a restaurant; return just that one
    DirectLookup,
}

/// Structured reading of a free-text query
///
/// Built fresh for every request and dropped once the response is produced.
/// Every field may be empty: an intent with nothing set means "no preference".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub city: Option<City>,
    /// Canonical neighborhood name from the gazetteer
    pub neighborhood: Option<String>,
    pub vibes: BTreeSet<VibeTag>,
    pub best_for: BTreeSet<BestForTag>,
    pub meal_time: Option<MealTime>,
    /// Highest acceptable price tier (1-4)
    pub budget: Option<u8>,
    /// Lowercased cuisine or dish keywords
    pub cuisines: BTreeSet<String>,
    /// Restaurant explicitly named in the query
    pub mentioned: Option<RestaurantId>,
    /// Geocoded query location, filled in after parsing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
}

impl QueryIntent {
    pub fn mode(&self) -> QueryMode {
        if self.mentioned.is_some() {
            QueryMode::DirectLookup
        } else {
            QueryMode::Ranked
        }
    }

    /// True when `id` is the restaurant the query named
    pub fn mentions(&self, id: &RestaurantId) -> bool {
        self.mentioned.as_ref() == Some(id)
    }

    /// Text handed to the geocoder: "neighborhood, city"
    pub fn location_text(&self) -> Option<String> {
        match (&self.neighborhood, self.city) {
            (Some(hood), Some(city)) => Some(format!("{}, {}", hood, city.as_str())),
            (Some(hood), None) => Some(hood.clone()),
            (None, Some(city)) => Some(city.as_str().to_string()),
            (None, None) => None,
        }
    }
}
