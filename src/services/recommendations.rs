use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    models::{
        MealTime, QueryIntent, RecommendationRequest, RecommendationResponse,
        RecommendedRestaurant, RestaurantId, ScoredResult, Status, VibeTag, WouldRecommend,
    },
    services::{
        distance::{locate_query, DistanceResolver},
        parser::QueryParser,
        providers::Geocoder,
        ranker::{Ranker, RankingPolicy},
        scorer::Scorer,
    },
    store::SignalStore,
};

/// Answers free-text queries against the loaded store
///
/// Holds only shared, read-only handles, so one instance serves every
/// request concurrently.
pub struct Recommender {
    store: Arc<SignalStore>,
    geocoder: Arc<dyn Geocoder>,
    distance: Arc<dyn DistanceResolver>,
    policy: RankingPolicy,
    geocode_timeout: Duration,
}

impl Recommender {
    pub fn new(
        store: Arc<SignalStore>,
        geocoder: Arc<dyn Geocoder>,
        distance: Arc<dyn DistanceResolver>,
        policy: RankingPolicy,
        geocode_timeout: Duration,
    ) -> Self {
        Self {
            store,
            geocoder,
            distance,
            policy,
            geocode_timeout,
        }
    }

    /// Parses the message, then either looks up the restaurant it names or
    /// ranks every candidate in the target city
    pub async fn handle_query(&self, request: RecommendationRequest) -> RecommendationResponse {
        let excluded = self.excluded_ids(&request.exclude);
        let mut intent = QueryParser::new(&self.store).parse(&request.message, request.city);

        if intent
            .mentioned
            .as_ref()
            .is_some_and(|id| excluded.contains(id))
        {
            tracing::debug!("Named restaurant is excluded, ranking instead");
            intent.mentioned = None;
        }

        intent.location =
            locate_query(self.geocoder.as_ref(), &intent, self.geocode_timeout).await;

        let scorer = Scorer::new(&self.store, self.distance.as_ref());
        let scored: Vec<ScoredResult> = match &intent.mentioned {
            Some(id) => scorer.score(&intent, id).into_iter().collect(),
            None => {
                let candidates: Vec<RestaurantId> = self
                    .store
                    .ids_for_city(intent.city)
                    .into_iter()
                    .filter(|id| !excluded.contains(id))
                    .collect();
                Ranker::new(&scorer, self.policy).rank(&intent, &candidates)
            }
        };

        tracing::info!(
            mode = ?intent.mode(),
            city = ?intent.city,
            located = intent.location.is_some(),
            results = scored.len(),
            "Answered recommendation query"
        );

        self.respond(intent, &scored)
    }

    /// Resolves exclusion entries given as ids or names; unknown ones are ignored
    fn excluded_ids(&self, exclude: &[String]) -> HashSet<RestaurantId> {
        exclude
            .iter()
            .filter_map(|key| self.store.lookup(key))
            .map(|record| record.id().clone())
            .collect()
    }

    fn respond(&self, intent: QueryIntent, scored: &[ScoredResult]) -> RecommendationResponse {
        let results: Vec<RecommendedRestaurant> = scored
            .iter()
            .filter_map(|result| {
                self.store
                    .resolve(&result.restaurant_id)
                    .map(|record| RecommendedRestaurant::from_scored(result, record))
            })
            .collect();

        let text_summary = match intent.mentioned.as_ref().and_then(|id| self.store.resolve(id)) {
            Some(record) => lookup_summary(
                &record.restaurant.name,
                record.restaurant.status,
                record.experience.would_recommend,
            ),
            None => ranked_summary(&intent, &results),
        };

        RecommendationResponse {
            text_summary,
            category: category(&intent),
            mode: intent.mode(),
            intent,
            results,
        }
    }
}

fn lookup_summary(name: &str, status: Status, verdict: WouldRecommend) -> String {
    match (status, verdict) {
        (Status::WantToTry, _) => format!("{} is on my want-to-try list.", name),
        (Status::Tried, WouldRecommend::Yes) => {
            format!("I've been to {} and would recommend it.", name)
        }
        (Status::Tried, WouldRecommend::Maybe) => {
            format!("I've been to {}. It's worth it for the right occasion.", name)
        }
        (Status::Tried, WouldRecommend::No) => {
            format!("I've been to {}, but I wouldn't go back.", name)
        }
        (Status::Tried, WouldRecommend::Unknown) => format!("I've been to {}.", name),
    }
}

fn ranked_summary(intent: &QueryIntent, results: &[RecommendedRestaurant]) -> String {
    let place = intent
        .neighborhood
        .as_deref()
        .or(intent.city.map(|city| city.as_str()))
        .map(|place| format!(" in {}", place))
        .unwrap_or_default();

    if results.is_empty() {
        return format!("I couldn't find anything on my list{}.", place);
    }

    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    let listed = match names.as_slice() {
        [only] => only.to_string(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
        [] => String::new(),
    };
    let noun = if results.len() == 1 { "pick" } else { "picks" };
    format!("My top {}{}: {}.", noun, place, listed)
}

/// Short label for the request, e.g. "Romantic dinner"
fn category(intent: &QueryIntent) -> Option<String> {
    const LABELS: &[(VibeTag, &str)] = &[
        (VibeTag::Romantic, "Romantic dinner"),
        (VibeTag::Upscale, "Fine dining"),
        (VibeTag::Casual, "Casual dining"),
    ];

    if let Some((_, label)) = LABELS.iter().find(|(tag, _)| intent.vibes.contains(tag)) {
        return Some(label.to_string());
    }
    if let Some(vibe) = intent.vibes.iter().next() {
        let name = vibe.as_str();
        let mut chars = name.chars();
        return chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect());
    }
    if intent.budget == Some(1) {
        return Some("Budget-friendly".to_string());
    }
    intent.meal_time.map(|meal| {
        match meal {
            MealTime::Lunch => "Lunch",
            MealTime::Dinner => "Dinner",
        }
        .to_string()
    })
}
