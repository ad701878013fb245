//! Raw rows of the three snapshot tables and their conversion into typed
//! records.
//!
//! A table missing a required column, or holding a row serde cannot read,
//! aborts the load. Optional columns may be absent or blank and default per
//! field.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{
        parse_tags, BestForTag, City, Confidence, Coordinates, Dealbreaker, ExperienceSignal,
        FoodTag, PublicSignal, Restaurant, RestaurantId, Status, VibeTag, WouldRecommend,
    },
};

pub const MASTER_FILE: &str = "restaurants_master.csv";
pub const EXPERIENCE_FILE: &str = "experience_signals.csv";
pub const PUBLIC_FILE: &str = "public_signals.csv";

#[derive(Debug, Deserialize)]
pub struct MasterRow {
    /// May be blank, in which case an id is derived from city and name
    pub restaurant_id: String,
    pub name: String,
    pub city: String,
    pub status: String,
    #[serde(default)]
    pub your_note: String,
    #[serde(default)]
    pub google_maps_url: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub price_tier: String,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
}

#[derive(Debug, Deserialize)]
pub struct ExperienceRow {
    pub restaurant_id: String,
    #[serde(default)]
    pub would_recommend: String,
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub best_for: String,
    #[serde(default)]
    pub vibe: String,
    #[serde(default)]
    pub food_strength: String,
    #[serde(default)]
    pub dealbreakers: String,
}

#[derive(Debug, Deserialize)]
pub struct PublicRow {
    pub restaurant_id: String,
    #[serde(default)]
    pub public_rating: String,
    #[serde(default)]
    pub public_review_count: String,
    #[serde(default)]
    pub price_tier: String,
    #[serde(default)]
    pub public_vibe: String,
}

pub const MASTER_REQUIRED: &[&str] = &["restaurant_id", "name", "city", "status"];
pub const SIGNAL_REQUIRED: &[&str] = &["restaurant_id"];

/// Reads every row of a CSV table, failing on a missing required column or
/// the first malformed row
pub fn read_table<T: serde::de::DeserializeOwned>(
    path: &Path,
    required: &[&str],
) -> AppResult<Vec<T>> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| AppError::Load(format!("cannot open {}: {}", file_name, e)))?;

    let headers = reader.headers()?.clone();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(AppError::Load(format!(
                "{} is missing required column '{}'",
                file_name, column
            )));
        }
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize().enumerate() {
        let row = result.map_err(|e| {
            AppError::Load(format!("{} row {}: {}", file_name, idx + 1, e))
        })?;
        rows.push(row);
    }

    Ok(rows)
}

impl MasterRow {
    /// Converts the row, deriving an id when the column is blank
    pub fn into_restaurant(
        self,
        row_number: usize,
        taken: &mut HashSet<RestaurantId>,
    ) -> AppResult<Restaurant> {
        let city = City::parse(&self.city).ok_or_else(|| {
            AppError::Load(format!(
                "{} row {}: unknown city '{}'",
                MASTER_FILE, row_number, self.city
            ))
        })?;
        let status = Status::parse(&self.status).ok_or_else(|| {
            AppError::Load(format!(
                "{} row {}: unknown status '{}'",
                MASTER_FILE, row_number, self.status
            ))
        })?;

        let name = self.name.trim().to_string();
        let id = match non_blank(&self.restaurant_id) {
            Some(raw) => {
                let id = RestaurantId::new(raw);
                if !taken.insert(id.clone()) {
                    return Err(AppError::Load(format!(
                        "{} row {}: duplicate restaurant_id '{}'",
                        MASTER_FILE, row_number, id
                    )));
                }
                id
            }
            None => RestaurantId::derive(city, &name, taken),
        };

        let coordinates = match (parse_f64(&self.latitude), parse_f64(&self.longitude)) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        };

        Ok(Restaurant {
            id,
            name,
            city,
            neighborhood: non_blank(&self.neighborhood),
            status,
            note: note_text(&self.your_note),
            url: non_blank(&self.google_maps_url),
            price_tier: parse_price_tier(&self.price_tier),
            cuisines: self
                .cuisine
                .split(['|', ','])
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
            coordinates,
        })
    }
}

impl ExperienceRow {
    pub fn into_signal(self) -> (RestaurantId, ExperienceSignal) {
        let signal = ExperienceSignal {
            would_recommend: WouldRecommend::parse(&self.would_recommend),
            confidence: Confidence::parse(&self.confidence),
            best_for: parse_tags(&self.best_for, BestForTag::parse),
            vibe: parse_tags(&self.vibe, VibeTag::parse),
            food_strength: parse_tags(&self.food_strength, FoodTag::parse),
            dealbreakers: parse_tags(&self.dealbreakers, Dealbreaker::parse),
        };
        (RestaurantId::new(self.restaurant_id.trim()), signal)
    }
}

impl PublicRow {
    pub fn into_signal(self) -> (RestaurantId, PublicSignal) {
        let signal = PublicSignal {
            rating: parse_f64(&self.public_rating).filter(|r| (0.0..=5.0).contains(r)),
            review_count: self.public_review_count.trim().parse::<u32>().ok(),
            price_tier: parse_price_tier(&self.price_tier),
            public_vibe: non_blank(&self.public_vibe),
        };
        (RestaurantId::new(self.restaurant_id.trim()), signal)
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// "-" is the curator's placeholder for "no note"
fn note_text(raw: &str) -> String {
    match raw.trim() {
        "-" => String::new(),
        note => note.to_string(),
    }
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accepts "2", "2.0" or "$$"
fn parse_price_tier(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    let tier = if !raw.is_empty() && raw.chars().all(|c| c == '$') {
        raw.len() as f64
    } else {
        raw.parse::<f64>().ok()?
    };
    if (1.0..=4.0).contains(&tier) {
        Some(tier.round() as u8)
    } else {
        None
    }
}
