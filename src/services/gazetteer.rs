//! Known neighborhoods, their city, spelling aliases, and which ones count
//! as "nearby" each other.

use crate::{models::City, text};

#[derive(Debug, PartialEq, Eq)]
pub struct Neighborhood {
    /// Canonical display name
    pub name: &'static str,
    pub city: City,
    /// Extra normalized spellings, e.g. "lic"
    pub aliases: &'static [&'static str],
    /// Neighborhoods sharing a group are adjacent
    pub group: u8,
}

impl Neighborhood {
    /// Normalized spellings: the canonical name followed by the aliases
    pub fn spellings(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(text::normalize(self.name))
            .chain(self.aliases.iter().map(|a| a.to_string()))
    }

    /// True when a free-text restaurant neighborhood (e.g. "SoHo / West
    /// Village") names this neighborhood
    pub fn is_named_in(&self, restaurant_neighborhood: &str) -> bool {
        let haystack = text::normalize(restaurant_neighborhood);
        self.spellings()
            .any(|spelling| text::contains_phrase(&haystack, &spelling))
    }
}

macro_rules! hood {
    ($name:literal, $city:expr, $group:literal) => {
        hood!($name, $city, $group, [])
    };
    ($name:literal, $city:expr, $group:literal, [$($alias:literal),*]) => {
        Neighborhood {
            name: $name,
            city: $city,
            aliases: &[$($alias),*],
            group: $group,
        }
    };
}

pub static NEIGHBORHOODS: &[Neighborhood] = &[
    // NYC
    hood!("SoHo", City::Nyc, 1),
    hood!("West Village", City::Nyc, 1),
    hood!("Greenwich Village", City::Nyc, 1),
    hood!("Lower East Side", City::Nyc, 2, ["les"]),
    hood!("East Village", City::Nyc, 2),
    hood!("Chinatown", City::Nyc, 2),
    hood!("Williamsburg", City::Nyc, 3),
    hood!("Greenpoint", City::Nyc, 3),
    hood!("Brooklyn Heights", City::Nyc, 4),
    hood!("DUMBO", City::Nyc, 4),
    hood!("Long Island City", City::Nyc, 5, ["lic"]),
    hood!("Flushing", City::Nyc, 6),
    hood!("Midtown", City::Nyc, 7),
    hood!("Chelsea", City::Nyc, 7),
    hood!("Flatiron", City::Nyc, 7),
    hood!("Koreatown", City::Nyc, 7, ["ktown", "k town"]),
    hood!("Upper East Side", City::Nyc, 8, ["ues"]),
    hood!("Upper West Side", City::Nyc, 9, ["uws"]),
    hood!("Tribeca", City::Nyc, 10),
    // Milan
    hood!("Brera", City::Milan, 20),
    hood!("Duomo", City::Milan, 20),
    hood!("Centro", City::Milan, 20, ["centro storico"]),
    hood!("Navigli", City::Milan, 21),
    hood!("Porta Genova", City::Milan, 21),
    hood!("Bocconi", City::Milan, 22),
    hood!("Porta Romana", City::Milan, 22),
    hood!("Porta Nuova", City::Milan, 23),
    hood!("Garibaldi", City::Milan, 23),
    hood!("Isola", City::Milan, 23),
];

/// Looks a neighborhood up by canonical name or alias
pub fn find(name: &str) -> Option<&'static Neighborhood> {
    let wanted = text::normalize(name);
    NEIGHBORHOODS
        .iter()
        .find(|hood| hood.spellings().any(|spelling| spelling == wanted))
}

/// Other neighborhoods adjacent to `hood`
pub fn nearby(hood: &'static Neighborhood) -> impl Iterator<Item = &'static Neighborhood> {
    NEIGHBORHOODS
        .iter()
        .filter(move |other| other.group == hood.group && other.name != hood.name)
}
