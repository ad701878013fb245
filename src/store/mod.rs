//! Read-only join of the master, experience and public tables.
//!
//! The store is built once at startup and shared by reference afterwards;
//! nothing mutates it while queries are being answered.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{City, RestaurantId, RestaurantRecord},
    text,
};

pub mod snapshot;

use snapshot::{
    read_table, ExperienceRow, MasterRow, PublicRow, EXPERIENCE_FILE, MASTER_FILE,
    MASTER_REQUIRED, PUBLIC_FILE, SIGNAL_REQUIRED,
};

/// Names shorter than this never trigger a direct lookup
const MIN_MENTION_CHARS: usize = 3;

/// Names shorter than this (spaces removed) only match exactly
const MIN_FUZZY_CHARS: usize = 5;

/// Jaro-Winkler similarity a query window needs to count as a typo of a name
const FUZZY_THRESHOLD: f64 = 0.92;

/// Name characters per allowed edit (Damerau-Levenshtein), at least one.
/// Jaro-Winkler rewards shared prefixes, so "carbonara" scores 0.94 against
/// "carbone bar"; the edit budget rejects it.
const CHARS_PER_EDIT: usize = 8;

#[derive(Debug)]
pub struct SignalStore {
    records: HashMap<RestaurantId, RestaurantRecord>,
    /// Ids per city, sorted ascending
    by_city: BTreeMap<City, Vec<RestaurantId>>,
    /// Normalized names, longest first
    names: Vec<(String, RestaurantId)>,
    loaded_at: DateTime<Utc>,
}

impl SignalStore {
    /// Loads and joins the three snapshot tables from `data_dir`
    pub fn load(data_dir: &Path) -> AppResult<Self> {
        let master: Vec<MasterRow> = read_table(&data_dir.join(MASTER_FILE), MASTER_REQUIRED)?;
        let experience: Vec<ExperienceRow> =
            read_table(&data_dir.join(EXPERIENCE_FILE), SIGNAL_REQUIRED)?;
        let public: Vec<PublicRow> = read_table(&data_dir.join(PUBLIC_FILE), SIGNAL_REQUIRED)?;

        let mut taken = HashSet::new();
        let mut records = Vec::with_capacity(master.len());
        for (idx, row) in master.into_iter().enumerate() {
            let restaurant = row.into_restaurant(idx + 1, &mut taken)?;
            records.push(RestaurantRecord::new(restaurant));
        }

        let index: HashMap<RestaurantId, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id().clone(), i))
            .collect();

        let mut orphaned = 0;
        let mut seen = HashSet::new();
        for row in experience {
            let (id, signal) = row.into_signal();
            let Some(&i) = index.get(&id) else {
                orphaned += 1;
                continue;
            };
            if seen.insert(id.clone()) {
                records[i].experience = signal;
            } else {
                tracing::warn!(restaurant_id = %id, table = EXPERIENCE_FILE, "Duplicate signal row ignored");
            }
        }

        seen.clear();
        for row in public {
            let (id, signal) = row.into_signal();
            let Some(&i) = index.get(&id) else {
                orphaned += 1;
                continue;
            };
            if seen.insert(id.clone()) {
                records[i].public = signal;
            } else {
                tracing::warn!(restaurant_id = %id, table = PUBLIC_FILE, "Duplicate signal row ignored");
            }
        }

        if orphaned > 0 {
            tracing::warn!(
                orphaned,
                "Signal rows reference restaurants missing from the master table"
            );
        }

        let store = Self::from_records(records)?;
        tracing::info!(
            restaurants = store.len(),
            data_dir = %data_dir.display(),
            "Signal store loaded"
        );
        Ok(store)
    }

    /// Builds a store from already-joined records
    pub fn from_records(records: Vec<RestaurantRecord>) -> AppResult<Self> {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut by_city: BTreeMap<City, Vec<RestaurantId>> = BTreeMap::new();
        let mut names = Vec::with_capacity(records.len());

        for record in records {
            let id = record.id().clone();
            if by_id.contains_key(&id) {
                return Err(AppError::Load(format!("duplicate restaurant_id '{}'", id)));
            }
            by_city
                .entry(record.restaurant.city)
                .or_default()
                .push(id.clone());

            let normalized = text::normalize(&record.restaurant.name);
            if normalized.chars().filter(|c| *c != ' ').count() >= MIN_MENTION_CHARS {
                names.push((normalized, id.clone()));
            }
            by_id.insert(id, record);
        }

        for ids in by_city.values_mut() {
            ids.sort();
        }
        names.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.1.cmp(&b.1)));

        Ok(Self {
            records: by_id,
            by_city,
            names,
            loaded_at: Utc::now(),
        })
    }

    /// Joined record for `id`, with default signals where a table had no row
    pub fn resolve(&self, id: &RestaurantId) -> Option<&RestaurantRecord> {
        self.records.get(id)
    }

    /// Ids in `city`, or in every city when `None`, sorted ascending
    pub fn ids_for_city(&self, city: Option<City>) -> Vec<RestaurantId> {
        match city {
            Some(city) => self.by_city.get(&city).cloned().unwrap_or_default(),
            None => {
                let mut ids: Vec<RestaurantId> =
                    self.by_city.values().flatten().cloned().collect();
                ids.sort();
                ids
            }
        }
    }

    /// Restaurant whose name appears in `query`.
    ///
    /// An exact word-boundary match wins: the longest matching name, then
    /// one in `prefer_city`, then the smallest id. Without one, runs of query
    /// words are compared to names with spaces removed, so typos ("via
    /// carrota") and missing spaces ("viacarota") still resolve. The most
    /// similar name wins, given a Jaro-Winkler score of at least 0.92 and at
    /// most one edit per eight name characters.
    pub fn find_mentioned(&self, query: &str, prefer_city: Option<City>) -> Option<&RestaurantId> {
        let haystack = text::normalize(query);
        self.find_exact_mention(&haystack, prefer_city)
            .or_else(|| self.find_fuzzy_mention(&haystack, prefer_city))
    }

    fn find_exact_mention(
        &self,
        haystack: &str,
        prefer_city: Option<City>,
    ) -> Option<&RestaurantId> {
        let mut best: Option<(usize, &RestaurantId)> = None;

        for (name, id) in &self.names {
            if let Some((len, _)) = best {
                if name.len() < len {
                    break;
                }
            }
            if !text::contains_phrase(haystack, name) {
                continue;
            }
            match best {
                None => best = Some((name.len(), id)),
                Some((_, current)) => {
                    if self.is_preferred(id, current, prefer_city) {
                        best = Some((name.len(), id));
                    }
                }
            }
        }

        best.map(|(_, id)| id)
    }

    fn find_fuzzy_mention(
        &self,
        haystack: &str,
        prefer_city: Option<City>,
    ) -> Option<&RestaurantId> {
        let words: Vec<&str> = haystack.split(' ').filter(|w| !w.is_empty()).collect();
        let mut best: Option<(f64, &RestaurantId)> = None;

        for (name, id) in &self.names {
            let compact_name: String = name.split(' ').collect();
            if compact_name.chars().count() < MIN_FUZZY_CHARS {
                continue;
            }
            let edit_budget = (compact_name.chars().count() / CHARS_PER_EDIT).max(1);
            let name_words = name.split(' ').count();
            let score = (name_words.saturating_sub(1).max(1)..=name_words + 1)
                .flat_map(|size| words.windows(size))
                .map(|window| window.concat())
                .map(|candidate| (strsim::jaro_winkler(&candidate, &compact_name), candidate))
                .filter(|(similarity, candidate)| {
                    *similarity >= FUZZY_THRESHOLD
                        && strsim::damerau_levenshtein(candidate, &compact_name) <= edit_budget
                })
                .map(|(similarity, _)| similarity)
                .fold(0.0, f64::max);
            if score < FUZZY_THRESHOLD {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_score, current)) => {
                    score > best_score
                        || (score == best_score && self.is_preferred(id, current, prefer_city))
                }
            };
            if better {
                best = Some((score, id));
            }
        }

        if let Some((score, id)) = best {
            tracing::debug!(restaurant_id = %id, score, "Fuzzy restaurant mention");
        }
        best.map(|(_, id)| id)
    }

    /// `candidate` replaces `current` only when it is in the preferred city
    /// and `current` is not
    fn is_preferred(
        &self,
        candidate: &RestaurantId,
        current: &RestaurantId,
        prefer_city: Option<City>,
    ) -> bool {
        prefer_city.is_some()
            && self.city_of(current) != prefer_city
            && self.city_of(candidate) == prefer_city
    }

    fn city_of(&self, id: &RestaurantId) -> Option<City> {
        self.records.get(id).map(|r| r.restaurant.city)
    }

    /// Looks an entry up by id, or by exact (normalized) name
    pub fn lookup(&self, key: &str) -> Option<&RestaurantRecord> {
        if let Some(record) = self.records.get(&RestaurantId::new(key)) {
            return Some(record);
        }
        let wanted = text::normalize(key);
        self.names
            .iter()
            .find(|(name, _)| *name == wanted)
            .and_then(|(_, id)| self.records.get(id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Restaurant, Status, VibeTag, WouldRecommend};
    use std::fs;
    use tempfile::TempDir;

    fn record(id: &str, name: &str, city: City) -> RestaurantRecord {
        RestaurantRecord::new(Restaurant::new(id, name, city, Status::Tried))
    }

    fn write_snapshots(dir: &TempDir, master: &str, experience: &str, public: &str) {
        fs::write(dir.path().join(MASTER_FILE), master).unwrap();
        fs::write(dir.path().join(EXPERIENCE_FILE), experience).unwrap();
        fs::write(dir.path().join(PUBLIC_FILE), public).unwrap();
    }

    const MASTER: &str = "\
restaurant_id,name,city,status,your_note,google_maps_url,neighborhood,price_tier,cuisine,latitude,longitude
nyc_raku,Raku,NYC,tried,amazing udon,https://maps.example/raku,SoHo / West Village,2,japanese,40.7262,-74.0026
nyc_misi,Misi,NYC,want_to_try,-,,Williamsburg (Brooklyn),,,,
,Pasticceria Marchesi,Milan,tried,cute vibes,,Brera,,,,
";

    #[test]
    fn test_load_joins_three_tables() {
        let dir = TempDir::new().unwrap();
        write_snapshots(
            &dir,
            MASTER,
            "restaurant_id,status,your_note,would_recommend,best_for,vibe,food_strength,dealbreakers,confidence\n\
             nyc_raku,tried,amazing udon,yes,date,romantic|cozy,,long_wait,high\n\
             nyc_ghost,tried,,no,,,,,low\n\
             nyc_raku,tried,,no,,loud,,,low\n",
            "restaurant_id,public_rating,public_review_count,price_tier,source\n\
             nyc_raku,4.6,1520,,google_maps\n\
             nyc_raku,3.1,12,4,google_maps\n",
        );

        let store = SignalStore::load(dir.path()).unwrap();
        assert_eq!(store.len(), 3);

        let raku = store.resolve(&RestaurantId::new("nyc_raku")).unwrap();
        assert_eq!(raku.experience.would_recommend, WouldRecommend::Yes);
        assert!(raku.experience.vibe.contains(&VibeTag::Romantic));
        assert_eq!(raku.public.rating, Some(4.6));
        assert_eq!(raku.public.review_count, Some(1520));
        assert_eq!(raku.price_tier(), Some(2));
        assert!(raku.restaurant.coordinates.is_some());

        // Duplicate signal rows: the first occurrence is kept
        assert_eq!(raku.experience.confidence, crate::models::Confidence::High);
        assert!(!raku.experience.vibe.contains(&VibeTag::Loud));

        // No signal rows: defaults, not an error
        let misi = store.resolve(&RestaurantId::new("nyc_misi")).unwrap();
        assert_eq!(misi.experience.would_recommend, WouldRecommend::Unknown);
        assert!(misi.public.rating.is_none());
        assert_eq!(misi.restaurant.note, "");

        // Blank id derived from city + name
        assert!(store
            .resolve(&RestaurantId::new("milan_pasticceria_marchesi"))
            .is_some());
    }

    #[test]
    fn test_load_fails_on_missing_table() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MASTER_FILE), MASTER).unwrap();
        let err = SignalStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::Load(_)));
        assert!(err.to_string().contains(EXPERIENCE_FILE));
    }

    #[test]
    fn test_load_fails_on_missing_required_column() {
        let dir = TempDir::new().unwrap();
        write_snapshots(
            &dir,
            "restaurant_id,name,status\nnyc_raku,Raku,tried\n",
            "restaurant_id\n",
            "restaurant_id\n",
        );
        let err = SignalStore::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("'city'"));
    }

    #[test]
    fn test_ids_for_city_sorted() {
        let store = SignalStore::from_records(vec![
            record("nyc_zz", "Zz Clam Bar", City::Nyc),
            record("milan_a", "Alla Collina", City::Milan),
            record("nyc_aa", "Via Carota", City::Nyc),
        ])
        .unwrap();

        let nyc = store.ids_for_city(Some(City::Nyc));
        assert_eq!(nyc, vec![RestaurantId::new("nyc_aa"), RestaurantId::new("nyc_zz")]);
        assert_eq!(store.ids_for_city(None).len(), 3);
    }

    #[test]
    fn test_from_records_rejects_duplicates() {
        let result = SignalStore::from_records(vec![
            record("nyc_raku", "Raku", City::Nyc),
            record("nyc_raku", "Raku", City::Nyc),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_find_mentioned_prefers_longest_name() {
        let store = SignalStore::from_records(vec![
            record("nyc_carbone", "Carbone", City::Nyc),
            record("nyc_carbone_bar", "Carbone Bar", City::Nyc),
        ])
        .unwrap();

        let found = store.find_mentioned("is carbone bar any good?", None);
        assert_eq!(found, Some(&RestaurantId::new("nyc_carbone_bar")));

        let found = store.find_mentioned("what about CARBONE", None);
        assert_eq!(found, Some(&RestaurantId::new("nyc_carbone")));
    }

    #[test]
    fn test_find_mentioned_prefers_city_on_name_clash() {
        let store = SignalStore::from_records(vec![
            record("milan_ramen", "Ramen Ya", City::Milan),
            record("nyc_ramen", "Ramen Ya", City::Nyc),
        ])
        .unwrap();

        let found = store.find_mentioned("ramen ya tonight", Some(City::Nyc));
        assert_eq!(found, Some(&RestaurantId::new("nyc_ramen")));
        let found = store.find_mentioned("ramen ya tonight", None);
        assert_eq!(found, Some(&RestaurantId::new("milan_ramen")));
    }

    #[test]
    fn test_find_mentioned_ignores_short_names_and_partial_words() {
        let store = SignalStore::from_records(vec![
            record("nyc_ok", "OK", City::Nyc),
            record("nyc_raku", "Raku", City::Nyc),
        ])
        .unwrap();
        assert_eq!(store.find_mentioned("ok so where should we eat", None), None);
        assert_eq!(store.find_mentioned("rakunana", None), None);
    }

    fn typo_store() -> SignalStore {
        SignalStore::from_records(vec![
            record("nyc_via_carota", "Via Carota", City::Nyc),
            record("nyc_carbone", "Carbone", City::Nyc),
            record("nyc_carbone_bar", "Carbone Bar", City::Nyc),
        ])
        .unwrap()
    }

    #[test]
    fn test_find_mentioned_tolerates_typos() {
        let store = typo_store();
        assert_eq!(
            store.find_mentioned("is via carrota worth it?", None),
            Some(&RestaurantId::new("nyc_via_carota"))
        );
        assert_eq!(
            store.find_mentioned("what about carbonne", None),
            Some(&RestaurantId::new("nyc_carbone"))
        );
    }

    #[test]
    fn test_find_mentioned_tolerates_missing_space() {
        let store = typo_store();
        assert_eq!(
            store.find_mentioned("thoughts on ViaCarota", None),
            Some(&RestaurantId::new("nyc_via_carota"))
        );
    }

    #[test]
    fn test_find_mentioned_fuzzy_rejects_unrelated_words() {
        let store = typo_store();
        // close by Jaro-Winkler alone, but two edits from "carbone bar"
        assert_eq!(store.find_mentioned("carbonara in the village", None), None);
        assert_eq!(store.find_mentioned("romantic dinner near carroll gardens", None), None);
    }

    #[test]
    fn test_find_mentioned_exact_beats_fuzzy() {
        let store = typo_store();
        assert_eq!(
            store.find_mentioned("carbone bar or carbonne?", None),
            Some(&RestaurantId::new("nyc_carbone_bar"))
        );
    }

    #[test]
    fn test_lookup_by_id_or_name() {
        let store = SignalStore::from_records(vec![record(
            "nyc_lindustrie",
            "L'industrie Pizzeria",
            City::Nyc,
        )])
        .unwrap();
        assert!(store.lookup("nyc_lindustrie").is_some());
        assert!(store.lookup("l'industrie pizzeria").is_some());
        assert!(store.lookup("lindustrie").is_none());
    }
}
