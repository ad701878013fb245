//! Turns free text into a [`QueryIntent`].
//!
//! Parsing never fails: anything unrecognized is simply left out of the
//! intent, which the scorer treats as "no preference".

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::{
    models::{BestForTag, City, MealTime, QueryIntent, VibeTag},
    services::gazetteer::{self, Neighborhood},
    store::SignalStore,
    text,
};

const CITY_NAMES: &[(&str, City)] = &[
    ("nyc", City::Nyc),
    ("new york", City::Nyc),
    ("new york city", City::Nyc),
    ("manhattan", City::Nyc),
    ("brooklyn", City::Nyc),
    ("milan", City::Milan),
    ("milano", City::Milan),
];

const VIBE_KEYWORDS: &[(VibeTag, &[&str])] = &[
    (VibeTag::Romantic, &["romantic", "romance", "date", "date night", "intimate"]),
    (VibeTag::Cozy, &["cozy", "cosy", "cute", "warm", "intimate"]),
    (VibeTag::Casual, &["casual", "chill", "relaxed", "laid back"]),
    (VibeTag::Trendy, &["trendy", "vibey", "hip", "cool"]),
    (VibeTag::Upscale, &["upscale", "fancy", "fine dining", "elegant", "sophisticated"]),
    (VibeTag::Loud, &["loud", "lively"]),
    (VibeTag::Buzzing, &["buzzing", "energetic", "busy"]),
    (VibeTag::Classic, &["classic", "traditional", "old school"]),
    (VibeTag::Modern, &["modern", "contemporary"]),
    (VibeTag::Tiny, &["tiny", "hole in the wall"]),
];

const BEST_FOR_KEYWORDS: &[(BestForTag, &[&str])] = &[
    (BestForTag::Date, &["date", "date night", "romantic", "romance", "intimate"]),
    (BestForTag::Friends, &["friends", "group", "gang"]),
    (BestForTag::Solo, &["solo", "alone", "by myself"]),
    (BestForTag::Parents, &["parents", "family", "mom", "dad"]),
    (
        BestForTag::Celebration,
        &["celebration", "celebrate", "birthday", "anniversary", "special occasion"],
    ),
    (BestForTag::WorkMeeting, &["work", "business", "meeting", "client"]),
    (BestForTag::QuickBite, &["quick", "fast", "grab", "quick bite", "takeout"]),
    (BestForTag::LateNight, &["late night", "after hours"]),
];

/// Cuisine keywords, with synonyms mapped onto the keyword they stand for
const CUISINE_KEYWORDS: &[(&str, &[&str])] = &[
    ("italian", &["italian"]),
    ("pasta", &["pasta"]),
    ("pizza", &["pizza", "pizzeria"]),
    ("chinese", &["chinese"]),
    ("korean", &["korean"]),
    ("japanese", &["japanese"]),
    ("sushi", &["sushi", "omakase"]),
    ("thai", &["thai"]),
    ("indian", &["indian"]),
    ("french", &["french", "bistro"]),
    ("mexican", &["mexican"]),
    ("tacos", &["tacos", "taco"]),
    ("bbq", &["bbq", "barbecue", "kbbq"]),
    ("seafood", &["seafood", "fish", "oysters"]),
    ("steak", &["steak", "steakhouse"]),
    ("ramen", &["ramen"]),
    ("dumplings", &["dumplings", "dumpling"]),
    ("mediterranean", &["mediterranean"]),
    ("cafe", &["cafe", "coffee"]),
    ("cocktails", &["cocktails", "cocktail", "drinks"]),
    ("wine", &["wine", "wine bar"]),
    ("dessert", &["dessert", "desserts", "sweets"]),
    ("bakery", &["bakery", "pastry", "pastries"]),
];

const MEAL_KEYWORDS: &[(MealTime, &[&str])] = &[
    (MealTime::Lunch, &["lunch"]),
    (MealTime::Dinner, &["dinner", "supper"]),
];

const CHEAP_WORDS: &[&str] = &["cheap", "budget", "inexpensive", "cheap eats"];
const MODERATE_WORDS: &[&str] = &["affordable", "not too expensive", "reasonably priced"];

/// "under 40", "less than 75pp", "max 30". Runs on normalized text, so
/// currency symbols are already gone.
static AMOUNT_CEILING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:under|below|max|less than) ?(\d+)").expect("valid amount ceiling regex")
});

/// Words that put the following city name in the place being asked about
const LOCATION_WORDS: &[&str] = &["in", "near", "around"];

pub struct QueryParser<'a> {
    store: &'a SignalStore,
}

impl<'a> QueryParser<'a> {
    pub fn new(store: &'a SignalStore) -> Self {
        Self { store }
    }

    /// Parses `query`, trusting `explicit_city` over anything in the text
    pub fn parse(&self, query: &str, explicit_city: Option<City>) -> QueryIntent {
        let normalized = text::normalize(query);

        let named_city = explicit_city.or_else(|| find_city_name(&normalized));
        let neighborhood = find_neighborhood(&normalized, named_city);
        let city = named_city.or(neighborhood.map(|hood| hood.city));

        let intent = QueryIntent {
            city,
            neighborhood: neighborhood.map(|hood| hood.name.to_string()),
            vibes: matching_tags(&normalized, VIBE_KEYWORDS),
            best_for: matching_tags(&normalized, BEST_FOR_KEYWORDS),
            meal_time: find_meal_time(&normalized),
            budget: find_budget(&normalized),
            cuisines: matching_tags(&normalized, CUISINE_KEYWORDS)
                .into_iter()
                .map(str::to_string)
                .collect(),
            mentioned: self.store.find_mentioned(query, city).cloned(),
            location: None,
        };

        tracing::debug!(
            city = ?intent.city,
            neighborhood = ?intent.neighborhood,
            vibes = intent.vibes.len(),
            cuisines = intent.cuisines.len(),
            mode = ?intent.mode(),
            "Parsed query"
        );

        intent
    }
}

/// City named in the text. One right after "in"/"near" wins ("new york
/// style pizza in milan"), otherwise the earliest one.
fn find_city_name(normalized: &str) -> Option<City> {
    let mentions: Vec<(usize, City)> = CITY_NAMES
        .iter()
        .filter_map(|(name, city)| text::find_phrase(normalized, name).map(|pos| (pos, *city)))
        .collect();

    let after_location_word = |pos: usize| {
        normalized[..pos]
            .split_whitespace()
            .next_back()
            .is_some_and(|word| LOCATION_WORDS.contains(&word))
    };

    mentions
        .iter()
        .filter(|(pos, _)| after_location_word(*pos))
        .min_by_key(|(pos, _)| *pos)
        .or_else(|| mentions.iter().min_by_key(|(pos, _)| *pos))
        .map(|(_, city)| *city)
}

/// Longest neighborhood spelling in the text; the earliest one on a tie
fn find_neighborhood(normalized: &str, city: Option<City>) -> Option<&'static Neighborhood> {
    let mut best: Option<(usize, usize, &'static Neighborhood)> = None;

    for hood in gazetteer::NEIGHBORHOODS {
        if city.is_some_and(|city| city != hood.city) {
            continue;
        }
        for spelling in hood.spellings() {
            let Some(pos) = text::find_phrase(normalized, &spelling) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((len, start, _)) => {
                    spelling.len() > len || (spelling.len() == len && pos < start)
                }
            };
            if better {
                best = Some((spelling.len(), pos, hood));
            }
        }
    }

    best.map(|(_, _, hood)| hood)
}

fn matching_tags<T: Ord + Copy>(normalized: &str, dictionary: &[(T, &[&str])]) -> BTreeSet<T> {
    dictionary
        .iter()
        .filter(|(_, words)| words.iter().any(|w| text::contains_phrase(normalized, w)))
        .map(|(tag, _)| *tag)
        .collect()
}

/// First meal word in the text wins
fn find_meal_time(normalized: &str) -> Option<MealTime> {
    MEAL_KEYWORDS
        .iter()
        .flat_map(|(meal, words)| {
            words
                .iter()
                .filter_map(move |w| text::find_phrase(normalized, w).map(|pos| (pos, *meal)))
        })
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, meal)| meal)
}

/// Price-tier ceiling, from "under $40" style amounts or price words
fn find_budget(normalized: &str) -> Option<u8> {
    if let Some(amount) = find_amount_ceiling(normalized) {
        return Some(match amount {
            0..=25 => 1,
            26..=50 => 2,
            51..=80 => 3,
            _ => 4,
        });
    }
    if MODERATE_WORDS.iter().any(|w| text::contains_phrase(normalized, w)) {
        return Some(2);
    }
    if CHEAP_WORDS.iter().any(|w| text::contains_phrase(normalized, w)) {
        return Some(1);
    }
    None
}

/// First amount following a ceiling word; a unit suffix ("40pp") is ignored
fn find_amount_ceiling(normalized: &str) -> Option<u32> {
    AMOUNT_CEILING_RE
        .captures_iter(normalized)
        .find_map(|caps| caps.get(1)?.as_str().parse().ok())
}
