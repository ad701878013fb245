use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{BestForTag, Dealbreaker, FoodTag, VibeTag};

/// Curator's verdict, inferred from the note at ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WouldRecommend {
    Yes,
    No,
    Maybe,
    #[default]
    Unknown,
}

impl WouldRecommend {
    /// Lenient parse; anything unrecognized is `Unknown`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "yes" => WouldRecommend::Yes,
            "no" => WouldRecommend::No,
            "maybe" => WouldRecommend::Maybe,
            _ => WouldRecommend::Unknown,
        }
    }
}

/// Strength of the experiential signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl Confidence {
    /// Lenient parse; anything unrecognized is `Medium`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "high" => Confidence::High,
            "low" => Confidence::Low,
            _ => Confidence::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Personal taste metadata for one restaurant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSignal {
    pub would_recommend: WouldRecommend,
    pub confidence: Confidence,
    pub best_for: BTreeSet<BestForTag>,
    pub vibe: BTreeSet<VibeTag>,
    pub food_strength: BTreeSet<FoodTag>,
    pub dealbreakers: BTreeSet<Dealbreaker>,
}

/// Third-party metadata for one restaurant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicSignal {
    /// 0.0 to 5.0
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    /// 1 (cheapest) to 4
    pub price_tier: Option<u8>,
    /// One-sentence public summary
    pub public_vibe: Option<String>,
}
