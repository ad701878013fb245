use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;

/// Cities covered by the curated dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum City {
    Milan,
    #[serde(rename = "NYC")]
    Nyc,
}

impl City {
    /// Canonical display name, also used in the snapshot tables
    pub fn as_str(&self) -> &'static str {
        match self {
            City::Milan => "Milan",
            City::Nyc => "NYC",
        }
    }

    /// Parses a city name as written in the tables or by a client
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "milan" | "milano" => Some(City::Milan),
            "nyc" | "new york" | "new york city" => Some(City::Nyc),
            _ => None,
        }
    }
}

impl Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the curator has been to the restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Tried,
    WantToTry,
}

impl Status {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "tried" => Some(Status::Tried),
            "want_to_try" | "want" | "want to try" => Some(Status::WantToTry),
            _ => None,
        }
    }
}

/// Stable restaurant identifier, derived from city and name at ingestion
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestaurantId(pub String);

impl RestaurantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives `"{city}_{name_slug}"`, appending `_2`, `_3`... until the id
    /// is not in `taken`. The chosen id is inserted into `taken`.
    pub fn derive(city: City, name: &str, taken: &mut HashSet<RestaurantId>) -> Self {
        let mut slug = String::new();
        let mut pending_sep = false;
        for ch in name.chars() {
            if ch.is_alphanumeric() || ch == '_' {
                if pending_sep && !slug.is_empty() {
                    slug.push('_');
                }
                pending_sep = false;
                slug.extend(ch.to_lowercase());
            } else if ch.is_whitespace() || ch == '-' {
                pending_sep = true;
            }
        }
        let slug = slug.trim_matches('_');
        let slug = if slug.is_empty() { "unknown" } else { slug };

        let base = format!("{}_{}", city.as_str().to_lowercase(), slug);
        let mut candidate = RestaurantId(base.clone());
        let mut counter = 1;
        while taken.contains(&candidate) {
            counter += 1;
            candidate = RestaurantId(format!("{}_{}", base, counter));
        }
        taken.insert(candidate.clone());
        candidate
    }
}

impl Display for RestaurantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// WGS84 point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Master attributes of a curated restaurant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub city: City,
    pub neighborhood: Option<String>,
    pub status: Status,
    /// Free-text note written by the curator
    pub note: String,
    pub url: Option<String>,
    /// 1 (cheapest) to 4
    pub price_tier: Option<u8>,
    /// Lowercased cuisine keywords (e.g. "italian", "korean")
    pub cuisines: Vec<String>,
    pub coordinates: Option<Coordinates>,
}

impl Restaurant {
    /// Creates a restaurant with only the required attributes set
    pub fn new(id: impl Into<String>, name: impl Into<String>, city: City, status: Status) -> Self {
        Self {
            id: RestaurantId::new(id),
            name: name.into(),
            city,
            neighborhood: None,
            status,
            note: String::new(),
            url: None,
            price_tier: None,
            cuisines: Vec::new(),
            coordinates: None,
        }
    }
}
