use serde::{Deserialize, Serialize};

use super::{RestaurantId, Status};

/// Category of a rationale line.
///
/// Declaration order is the order reasons are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    TasteBasis,
    Recommendation,
    PersonalNote,
    Dealbreaker,
    Vibe,
    BestFor,
    Cuisine,
    Neighborhood,
    Budget,
    Distance,
    PublicRating,
}

/// One short justification line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub kind: ReasonKind,
    pub text: String,
}

impl Reason {
    pub fn new(kind: ReasonKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Score of one restaurant against one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub restaurant_id: RestaurantId,
    pub status: Status,
    /// 0-40
    pub match_score: f64,
    /// 0-40
    pub taste_score: f64,
    /// 0-20
    pub public_score: f64,
    /// Sum of the sub-scores after hard rules
    pub total_score: f64,
    /// Distance from the query location, when known
    pub distance_km: Option<f64>,
    /// Used as a ranking tie-break
    pub review_count: u32,
    pub rationale: Vec<Reason>,
}

impl ScoredResult {
    /// Rationale as plain strings, in display order
    pub fn rationale_lines(&self) -> Vec<String> {
        self.rationale.iter().map(|r| r.text.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_kind_order_is_display_order() {
        let mut kinds = vec![
            ReasonKind::PublicRating,
            ReasonKind::Distance,
            ReasonKind::Vibe,
            ReasonKind::Recommendation,
            ReasonKind::TasteBasis,
        ];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![
                ReasonKind::TasteBasis,
                ReasonKind::Recommendation,
                ReasonKind::Vibe,
                ReasonKind::Distance,
                ReasonKind::PublicRating,
            ]
        );
    }
}
