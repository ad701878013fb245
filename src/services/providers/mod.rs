//! Geocoding providers
//!
//! A provider turns a free-text location ("SoHo, NYC") into coordinates. The
//! recommender calls one at most once per query and treats every failure as
//! "distance unavailable".
use crate::{error::AppResult, models::Coordinates};

pub mod google;
pub mod noop;

pub use google::GoogleGeocoder;
pub use noop::NoopGeocoder;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Coordinates for `location`, or `None` when the provider knows no match
    async fn geocode(&self, location: &str) -> AppResult<Option<Coordinates>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
