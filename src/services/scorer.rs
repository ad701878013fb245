//! Scores one restaurant against one query.
//!
//! The total is the sum of three bounded parts:
//! - match (0-40): how well the restaurant fits what was asked for
//! - taste (0-40): what the curator thinks of it
//! - public (0-20): rating and review volume
//!
//! Scoring is a pure function of the intent and the joined record; the same
//! inputs always produce the same result.

use crate::{
    models::{
        Confidence, QueryIntent, Reason, ReasonKind, RestaurantId, RestaurantRecord, ScoredResult,
        Status, WouldRecommend,
    },
    services::{distance::DistanceResolver, gazetteer},
    store::SignalStore,
    text,
};

pub const MATCH_MAX: f64 = 40.0;
pub const TASTE_MAX: f64 = 40.0;
pub const PUBLIC_MAX: f64 = 20.0;

const CITY_POINTS: f64 = 15.0;
const NEIGHBORHOOD_EXACT_POINTS: f64 = 10.0;
const NEIGHBORHOOD_ANY_POINTS: f64 = 5.0;
const NEIGHBORHOOD_NEARBY_POINTS: f64 = 4.0;
const VIBE_POINTS: f64 = 5.0;
const VIBE_CAP: f64 = 15.0;
const BEST_FOR_POINTS: f64 = 5.0;
const BEST_FOR_CAP: f64 = 10.0;
const CUISINE_POINTS: f64 = 3.0;
const CUISINE_CAP: f64 = 9.0;
const BUDGET_POINTS: f64 = 4.0;

const RATING_MAX: f64 = 12.0;
const RATING_FLOOR: f64 = 3.5;
const RATING_CEILING: f64 = 5.0;
const REVIEWS_MAX: f64 = 8.0;

/// Total for a restaurant the curator would not recommend, unless asked for by name
pub const NOT_RECOMMENDED_CAP: f64 = 10.0;

/// Contributions smaller than this don't get a rationale line
const REASON_THRESHOLD: f64 = 0.5;

/// Phrases in the curator's note and the reason they become. An entry
/// matches when every word of any one of its alternatives is in the note;
/// the first matching entry wins.
const NOTE_PHRASES: &[(&[&[&str]], &str)] = &[
    (&[&["favorite"], &["favourite"], &["fav"], &["favs"]], "one of my favorites"),
    (&[&["love"], &["loved"], &["loves"]], "I loved it"),
    (&[&["really good"], &["super good"]], "really good food"),
    (&[&["best"]], "the best"),
    (&[&["cute", "vibe"], &["cute", "vibes"]], "super cute vibes"),
    (&[&["authentic"]], "authentic"),
    (&[&["cheap"], &["affordable"]], "great value"),
];

/// Notes without a known phrase are quoted, up to this many words
const NOTE_QUOTE_WORDS: usize = 5;

pub struct Scorer<'a> {
    store: &'a SignalStore,
    distance: &'a dyn DistanceResolver,
}

impl<'a> Scorer<'a> {
    pub fn new(store: &'a SignalStore, distance: &'a dyn DistanceResolver) -> Self {
        Self { store, distance }
    }

    /// Scores `id`, or `None` when the store has no such restaurant
    pub fn score(&self, intent: &QueryIntent, id: &RestaurantId) -> Option<ScoredResult> {
        self.store
            .resolve(id)
            .map(|record| self.score_record(intent, record))
    }

    pub fn score_record(&self, intent: &QueryIntent, record: &RestaurantRecord) -> ScoredResult {
        let distance_km = intent
            .location
            .zip(record.restaurant.coordinates)
            .and_then(|(origin, destination)| self.distance.resolve_distance(origin, destination));

        let mut reasons = Vec::new();
        let match_score = match_score(intent, record, distance_km, &mut reasons);
        let taste_score = taste_score(record, &mut reasons);
        let public_score = public_score(record, &mut reasons);

        let mut total_score = match_score + taste_score + public_score;
        if record.experience.would_recommend == WouldRecommend::No && !intent.mentions(record.id())
        {
            total_score = total_score.min(NOT_RECOMMENDED_CAP);
        }

        // Stable: lines of one kind keep the order they were pushed in
        reasons.sort_by_key(|reason| reason.kind);

        ScoredResult {
            restaurant_id: record.id().clone(),
            status: record.restaurant.status,
            match_score,
            taste_score,
            public_score,
            total_score,
            distance_km,
            review_count: record.public.review_count.unwrap_or(0),
            rationale: reasons,
        }
    }
}

/// Distance bonus: within 2km, 5km and 10km
pub fn distance_bonus(km: f64) -> f64 {
    if km <= 2.0 {
        10.0
    } else if km <= 5.0 {
        5.0
    } else if km <= 10.0 {
        2.0
    } else {
        0.0
    }
}

fn push_reason(reasons: &mut Vec<Reason>, points: f64, kind: ReasonKind, text: impl Into<String>) {
    if points.abs() >= REASON_THRESHOLD {
        reasons.push(Reason::new(kind, text));
    }
}

fn overlap_points(count: usize, per_item: f64, cap: f64) -> f64 {
    (count as f64 * per_item).min(cap)
}

fn match_score(
    intent: &QueryIntent,
    record: &RestaurantRecord,
    distance_km: Option<f64>,
    reasons: &mut Vec<Reason>,
) -> f64 {
    let restaurant = &record.restaurant;
    let experience = &record.experience;
    let mut points = 0.0;

    if intent.city.map_or(true, |city| city == restaurant.city) {
        points += CITY_POINTS;
    }

    points += neighborhood_points(intent, record, reasons);

    let vibes: Vec<&str> = intent
        .vibes
        .intersection(&experience.vibe)
        .map(|tag| tag.as_str())
        .collect();
    let vibe_points = overlap_points(vibes.len(), VIBE_POINTS, VIBE_CAP);
    push_reason(
        reasons,
        vibe_points,
        ReasonKind::Vibe,
        format!("matches vibe: {}", vibes.join(", ")),
    );
    points += vibe_points;

    let occasions: Vec<String> = intent
        .best_for
        .intersection(&experience.best_for)
        .map(|tag| tag.as_str().replace('_', " "))
        .collect();
    let best_for_points = overlap_points(occasions.len(), BEST_FOR_POINTS, BEST_FOR_CAP);
    push_reason(
        reasons,
        best_for_points,
        ReasonKind::BestFor,
        format!("good for: {}", occasions.join(", ")),
    );
    points += best_for_points;

    let dishes: Vec<&str> = intent
        .cuisines
        .iter()
        .filter(|keyword| {
            experience
                .food_strength
                .iter()
                .any(|tag| tag.as_str() == keyword.as_str())
                || restaurant.cuisines.iter().any(|c| c == *keyword)
        })
        .map(String::as_str)
        .collect();
    let cuisine_points = overlap_points(dishes.len(), CUISINE_POINTS, CUISINE_CAP);
    push_reason(
        reasons,
        cuisine_points,
        ReasonKind::Cuisine,
        format!("known for: {}", dishes.join(", ")),
    );
    points += cuisine_points;

    if let (Some(ceiling), Some(tier)) = (intent.budget, record.price_tier()) {
        if tier <= ceiling {
            points += BUDGET_POINTS;
            push_reason(
                reasons,
                BUDGET_POINTS,
                ReasonKind::Budget,
                format!("within budget ({})", "$".repeat(tier as usize)),
            );
        }
    }

    if let Some(km) = distance_km {
        let bonus = distance_bonus(km);
        push_reason(reasons, bonus, ReasonKind::Distance, format!("{:.1}km away", km));
        points += bonus;
    }

    points.clamp(0.0, MATCH_MAX)
}

fn neighborhood_points(
    intent: &QueryIntent,
    record: &RestaurantRecord,
    reasons: &mut Vec<Reason>,
) -> f64 {
    let Some(wanted) = intent.neighborhood.as_deref() else {
        return NEIGHBORHOOD_ANY_POINTS;
    };
    let Some(actual) = record.restaurant.neighborhood.as_deref() else {
        return 0.0;
    };

    match gazetteer::find(wanted) {
        Some(hood) => {
            if hood.is_named_in(actual) {
                push_reason(
                    reasons,
                    NEIGHBORHOOD_EXACT_POINTS,
                    ReasonKind::Neighborhood,
                    format!("in {}", hood.name),
                );
                NEIGHBORHOOD_EXACT_POINTS
            } else if hood.city == record.restaurant.city
                && gazetteer::nearby(hood).any(|other| other.is_named_in(actual))
            {
                push_reason(
                    reasons,
                    NEIGHBORHOOD_NEARBY_POINTS,
                    ReasonKind::Neighborhood,
                    format!("near {}", hood.name),
                );
                NEIGHBORHOOD_NEARBY_POINTS
            } else {
                0.0
            }
        }
        // Not in the gazetteer: plain phrase match
        None if text::contains_phrase(&text::normalize(actual), &text::normalize(wanted)) => {
            push_reason(
                reasons,
                NEIGHBORHOOD_EXACT_POINTS,
                ReasonKind::Neighborhood,
                format!("in {}", wanted),
            );
            NEIGHBORHOOD_EXACT_POINTS
        }
        None => 0.0,
    }
}

fn taste_score(record: &RestaurantRecord, reasons: &mut Vec<Reason>) -> f64 {
    let experience = &record.experience;

    let (base, basis) = match record.restaurant.status {
        Status::WantToTry => (12.0, "want to try".to_string()),
        Status::Tried => {
            let base = match experience.confidence {
                Confidence::High => 40.0,
                Confidence::Medium => 28.0,
                Confidence::Low => 18.0,
            };
            (base, format!("tried, {} confidence", experience.confidence.as_str()))
        }
    };
    reasons.push(Reason::new(ReasonKind::TasteBasis, basis));

    let adjustment = match experience.would_recommend {
        WouldRecommend::Yes => 6.0,
        WouldRecommend::Maybe => 2.0,
        WouldRecommend::No => -30.0,
        WouldRecommend::Unknown => 0.0,
    };
    let recommendation = match experience.would_recommend {
        WouldRecommend::Yes => "would recommend",
        WouldRecommend::Maybe => "might recommend",
        WouldRecommend::No => "would not recommend",
        WouldRecommend::Unknown => "",
    };
    push_reason(reasons, adjustment, ReasonKind::Recommendation, recommendation);

    if let Some(line) = personal_note(&record.restaurant.note) {
        reasons.push(Reason::new(ReasonKind::PersonalNote, line));
    }

    if experience.would_recommend == WouldRecommend::No {
        let warning = if experience.dealbreakers.is_empty() {
            "dealbreaker: would not go back".to_string()
        } else {
            let tags: Vec<String> = experience
                .dealbreakers
                .iter()
                .map(|tag| tag.as_str().replace('_', " "))
                .collect();
            format!("dealbreaker: {}", tags.join(", "))
        };
        reasons.push(Reason::new(ReasonKind::Dealbreaker, warning));
    }

    (base + adjustment).clamp(0.0, TASTE_MAX)
}

/// The curator's own words: a known phrase, or the start of the note when it
/// is at least three words long
fn personal_note(note: &str) -> Option<String> {
    let normalized = text::normalize(note);
    if normalized.is_empty() {
        return None;
    }

    let phrase = NOTE_PHRASES.iter().find(|(alternatives, _)| {
        alternatives.iter().any(|words| {
            words
                .iter()
                .all(|word| text::contains_phrase(&normalized, word))
        })
    });
    if let Some((_, line)) = phrase {
        return Some(line.to_string());
    }

    let words: Vec<&str> = note.split_whitespace().take(NOTE_QUOTE_WORDS).collect();
    (words.len() >= 3).then(|| words.join(" ").to_lowercase())
}

fn public_score(record: &RestaurantRecord, reasons: &mut Vec<Reason>) -> f64 {
    let public = &record.public;

    let rating_points = public.rating.map_or(0.0, |rating| {
        ((rating - RATING_FLOOR) / (RATING_CEILING - RATING_FLOOR) * RATING_MAX)
            .clamp(0.0, RATING_MAX)
    });
    // 100 reviews or fewer earn nothing; a million earn the maximum
    let review_points = public.review_count.map_or(0.0, |count| {
        (((count.max(100) as f64).log10() - 2.0) * 2.0).clamp(0.0, REVIEWS_MAX)
    });
    let points = rating_points + review_points;

    let line = match (public.rating, public.review_count) {
        (Some(rating), Some(count)) => {
            format!("rated {:.1} ({} reviews)", rating, thousands(count))
        }
        (Some(rating), None) => format!("rated {:.1}", rating),
        (None, Some(count)) => format!("{} public reviews", thousands(count)),
        (None, None) => String::new(),
    };
    push_reason(reasons, points, ReasonKind::PublicRating, line);

    points.clamp(0.0, PUBLIC_MAX)
}

/// 12345 -> "12,345"
fn thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
