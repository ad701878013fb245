use crate::{error::AppResult, models::Coordinates, services::providers::Geocoder};

/// Used when no geocoding API key is configured: every location is unknown,
/// so no restaurant ever gets a distance bonus.
#[derive(Debug, Clone, Default)]
pub struct NoopGeocoder;

#[async_trait::async_trait]
impl Geocoder for NoopGeocoder {
    async fn geocode(&self, _location: &str) -> AppResult<Option<Coordinates>> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
