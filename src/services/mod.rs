pub mod distance;
pub mod gazetteer;
pub mod parser;
pub mod providers;
pub mod ranker;
pub mod recommendations;
pub mod scorer;

pub use distance::{DistanceResolver, HaversineResolver};
pub use parser::QueryParser;
pub use ranker::{Ranker, RankingPolicy};
pub use recommendations::Recommender;
pub use scorer::Scorer;
