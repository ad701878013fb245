//! Orders scored candidates and applies the result-list limits.

use std::cmp::Ordering;

use crate::{
    models::{QueryIntent, RestaurantId, ScoredResult, Status},
    services::scorer::Scorer,
};

/// Limits on a returned list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingPolicy {
    /// Maximum number of results
    pub top_k: usize,
    /// Maximum number of want-to-try results among them
    pub max_want_to_try: usize,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            top_k: 6,
            max_want_to_try: 1,
        }
    }
}

pub struct Ranker<'a> {
    scorer: &'a Scorer<'a>,
    policy: RankingPolicy,
}

impl<'a> Ranker<'a> {
    pub fn new(scorer: &'a Scorer<'a>, policy: RankingPolicy) -> Self {
        Self { scorer, policy }
    }

    /// Scores every candidate and returns at most `top_k` of them, best first.
    ///
    /// Ids unknown to the store are skipped.
    pub fn rank(&self, intent: &QueryIntent, candidate_ids: &[RestaurantId]) -> Vec<ScoredResult> {
        let scored: Vec<ScoredResult> = candidate_ids
            .iter()
            .filter_map(|id| {
                let result = self.scorer.score(intent, id);
                if result.is_none() {
                    tracing::debug!(restaurant_id = %id, "Candidate not in store, skipped");
                }
                result
            })
            .collect();

        let ranked = order_and_limit(scored, self.policy);

        tracing::debug!(
            candidates = candidate_ids.len(),
            returned = ranked.len(),
            "Ranked candidates"
        );

        ranked
    }
}

/// Total score descending, then tried before want-to-try, then more public
/// reviews, then restaurant id ascending
pub fn compare(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| status_rank(a.status).cmp(&status_rank(b.status)))
        .then_with(|| b.review_count.cmp(&a.review_count))
        .then_with(|| a.restaurant_id.cmp(&b.restaurant_id))
}

fn status_rank(status: Status) -> u8 {
    match status {
        Status::Tried => 0,
        Status::WantToTry => 1,
    }
}

/// Sorts, then walks the list keeping want-to-try entries only while the
/// quota allows. Skipped entries are backfilled by the next ones down, so
/// fewer than `top_k` results only happen when candidates run out.
pub fn order_and_limit(mut scored: Vec<ScoredResult>, policy: RankingPolicy) -> Vec<ScoredResult> {
    scored.sort_by(compare);

    let mut want_to_try = 0;
    let mut kept = Vec::with_capacity(policy.top_k.min(scored.len()));
    for result in scored {
        if kept.len() == policy.top_k {
            break;
        }
        if result.status == Status::WantToTry {
            if want_to_try == policy.max_want_to_try {
                continue;
            }
            want_to_try += 1;
        }
        kept.push(result);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            City, Confidence, Restaurant, RestaurantRecord, VibeTag, WouldRecommend,
        },
        services::{distance::HaversineResolver, parser::QueryParser},
        store::SignalStore,
    };
    use std::collections::BTreeSet;

    fn result(id: &str, status: Status, total: f64, reviews: u32) -> ScoredResult {
        ScoredResult {
            restaurant_id: RestaurantId::new(id),
            status,
            match_score: 0.0,
            taste_score: 0.0,
            public_score: 0.0,
            total_score: total,
            distance_km: None,
            review_count: reviews,
            rationale: Vec::new(),
        }
    }

    fn ids(results: &[ScoredResult]) -> Vec<&str> {
        results.iter().map(|r| r.restaurant_id.as_str()).collect()
    }

    #[test]
    fn test_quota_keeps_one_want_to_try() {
        let mut scored = Vec::new();
        for i in 0..6 {
            // want-to-try entries outscore every tried one
            scored.push(result(&format!("w{i}"), Status::WantToTry, 90.0 - i as f64, 0));
            scored.push(result(&format!("t{i}"), Status::Tried, 50.0 - i as f64, 0));
        }

        let ranked = order_and_limit(scored, RankingPolicy::default());
        assert_eq!(ranked.len(), 6);
        assert_eq!(ids(&ranked), vec!["w0", "t0", "t1", "t2", "t3", "t4"]);
        let wishes = ranked.iter().filter(|r| r.status == Status::WantToTry).count();
        assert!(wishes <= 1);
    }

    #[test]
    fn test_quota_can_leave_list_short() {
        let scored = vec![
            result("w0", Status::WantToTry, 30.0, 0),
            result("w1", Status::WantToTry, 20.0, 0),
            result("t0", Status::Tried, 10.0, 0),
        ];
        let ranked = order_and_limit(scored, RankingPolicy::default());
        assert_eq!(ids(&ranked), vec!["w0", "t0"]);
    }

    #[test]
    fn test_tie_breaks() {
        let scored = vec![
            result("b", Status::Tried, 50.0, 10),
            result("a", Status::Tried, 50.0, 10),
            result("c", Status::Tried, 50.0, 900),
            result("w", Status::WantToTry, 50.0, 5000),
            result("top", Status::Tried, 51.0, 0),
        ];
        let ranked = order_and_limit(scored, RankingPolicy::default());
        assert_eq!(ids(&ranked), vec!["top", "c", "a", "b", "w"]);
    }

    #[test]
    fn test_fewer_candidates_than_k() {
        let scored = vec![result("a", Status::Tried, 1.0, 0)];
        let ranked = order_and_limit(scored, RankingPolicy::default());
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_custom_policy() {
        let scored = (0..5)
            .map(|i| result(&format!("w{i}"), Status::WantToTry, i as f64, 0))
            .collect();
        let policy = RankingPolicy {
            top_k: 3,
            max_want_to_try: 2,
        };
        let ranked = order_and_limit(scored, policy);
        assert_eq!(ids(&ranked), vec!["w4", "w3"]);
    }

    #[test]
    fn test_romantic_dinner_in_nyc_ranks_nyc_first() {
        let mut a = RestaurantRecord::new(Restaurant::new("nyc_a", "Alpha", City::Nyc, Status::Tried));
        a.experience.confidence = Confidence::High;
        a.experience.would_recommend = WouldRecommend::Yes;
        a.experience.vibe = BTreeSet::from([VibeTag::Romantic]);
        a.public.rating = Some(4.6);
        a.public.review_count = Some(500);

        let mut b = RestaurantRecord::new(Restaurant::new(
            "milan_b",
            "Bravo",
            City::Milan,
            Status::WantToTry,
        ));
        b.experience.vibe = BTreeSet::from([VibeTag::Romantic]);

        let store = SignalStore::from_records(vec![a, b]).unwrap();
        let scorer = Scorer::new(&store, &HaversineResolver);
        let intent = QueryParser::new(&store).parse("romantic dinner in NYC", None);

        // B is still scored when handed in as a candidate; it must land last
        let candidates = store.ids_for_city(None);
        let ranked = Ranker::new(&scorer, RankingPolicy::default()).rank(&intent, &candidates);

        assert_eq!(ranked[0].restaurant_id.as_str(), "nyc_a");
        assert_eq!(ranked[0].taste_score, 40.0);
        assert_eq!(ranked.last().unwrap().restaurant_id.as_str(), "milan_b");
    }

    #[test]
    fn test_rank_skips_unknown_ids() {
        let store = SignalStore::from_records(vec![RestaurantRecord::new(Restaurant::new(
            "nyc_a",
            "Alpha",
            City::Nyc,
            Status::Tried,
        ))])
        .unwrap();
        let scorer = Scorer::new(&store, &HaversineResolver);
        let ranked = Ranker::new(&scorer, RankingPolicy::default()).rank(
            &QueryIntent::default(),
            &[RestaurantId::new("nyc_a"), RestaurantId::new("nyc_ghost")],
        );
        assert_eq!(ids(&ranked), vec!["nyc_a"]);
    }
}
