use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Declares a closed tag vocabulary.
///
/// Each variant maps to exactly one snake_case wire name. Parsing is
/// case-insensitive and returns `None` for anything outside the vocabulary,
/// which lets ingestion drop unknown tags without failing.
macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Wire name of the tag
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            /// Parses a single tag, ignoring case and surrounding whitespace
            pub fn parse(raw: &str) -> Option<Self> {
                let raw = raw.trim().to_lowercase();
                match raw.as_str() {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Atmosphere descriptor
    VibeTag {
        Cozy => "cozy",
        Loud => "loud",
        Trendy => "trendy",
        Romantic => "romantic",
        Casual => "casual",
        Upscale => "upscale",
        Tiny => "tiny",
        Buzzing => "buzzing",
        Classic => "classic",
        Modern => "modern",
    }
}

vocabulary! {
    /// Occasion a restaurant suits
    BestForTag {
        Date => "date",
        Friends => "friends",
        Solo => "solo",
        Parents => "parents",
        Celebration => "celebration",
        WorkMeeting => "work_meeting",
        QuickBite => "quick_bite",
        LateNight => "late_night",
    }
}

vocabulary! {
    /// What the kitchen does best
    FoodTag {
        Pasta => "pasta",
        Steak => "steak",
        Sushi => "sushi",
        Pizza => "pizza",
        Seafood => "seafood",
        Bbq => "bbq",
        Dumplings => "dumplings",
        Ramen => "ramen",
        Tacos => "tacos",
        Thai => "thai",
        Indian => "indian",
        Mediterranean => "mediterranean",
        Cafe => "cafe",
        Cocktails => "cocktails",
        Wine => "wine",
        Dessert => "dessert",
        Bakery => "bakery",
    }
}

vocabulary! {
    /// Reasons the curator would warn someone off
    Dealbreaker {
        TooLoud => "too_loud",
        Touristy => "touristy",
        Overpriced => "overpriced",
        LongWait => "long_wait",
        BadService => "bad_service",
        HardToBook => "hard_to_book",
    }
}

/// Parses a pipe-separated tag list, silently dropping unknown tags.
pub fn parse_tags<T: Ord>(raw: &str, parse: impl Fn(&str) -> Option<T>) -> BTreeSet<T> {
    raw.split('|')
        .filter(|part| !part.trim().is_empty())
        .filter_map(parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(VibeTag::parse(" Romantic "), Some(VibeTag::Romantic));
        assert_eq!(BestForTag::parse("WORK_MEETING"), Some(BestForTag::WorkMeeting));
    }

    #[test]
    fn test_parse_tags_drops_unknown_tags() {
        let tags = parse_tags("cozy|dreamy||romantic", VibeTag::parse);
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&VibeTag::Cozy));
        assert!(tags.contains(&VibeTag::Romantic));
    }

    #[test]
    fn test_parse_tags_empty() {
        let tags = parse_tags("", Dealbreaker::parse);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_tag_serialization_matches_wire_name() {
        let json = serde_json::to_string(&Dealbreaker::HardToBook).unwrap();
        assert_eq!(json, "\"hard_to_book\"");
        assert_eq!(Dealbreaker::HardToBook.as_str(), "hard_to_book");
    }
}
