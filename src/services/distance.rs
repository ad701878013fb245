//! Query location lookup and restaurant distances.

use std::time::Duration;

use crate::{
    models::{Coordinates, QueryIntent},
    services::providers::Geocoder,
};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance between the query location and a restaurant, in kilometers.
///
/// `None` means "distance unavailable" and earns no bonus.
pub trait DistanceResolver: Send + Sync {
    fn resolve_distance(&self, origin: Coordinates, destination: Coordinates) -> Option<f64>;
}

/// Great-circle distance
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineResolver;

impl DistanceResolver for HaversineResolver {
    fn resolve_distance(&self, origin: Coordinates, destination: Coordinates) -> Option<f64> {
        let km = haversine_km(origin, destination);
        km.is_finite().then_some(km)
    }
}

pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Geocodes the intent's location text, giving up after `timeout`.
///
/// Any failure is logged and yields `None`; scoring carries on without
/// distances.
pub async fn locate_query(
    geocoder: &dyn Geocoder,
    intent: &QueryIntent,
    timeout: Duration,
) -> Option<Coordinates> {
    let location = intent.location_text()?;

    match tokio::time::timeout(timeout, geocoder.geocode(&location)).await {
        Ok(Ok(Some(coordinates))) => Some(coordinates),
        Ok(Ok(None)) => {
            tracing::debug!(location = %location, provider = geocoder.name(), "Location not found");
            None
        }
        Ok(Err(e)) => {
            tracing::warn!(
                error = %e,
                location = %location,
                provider = geocoder.name(),
                "Geocoding failed, distance unavailable"
            );
            None
        }
        Err(_) => {
            tracing::warn!(
                location = %location,
                provider = geocoder.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Geocoding timed out, distance unavailable"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::City,
        services::providers::MockGeocoder,
    };

    fn soho_intent() -> QueryIntent {
        QueryIntent {
            city: Some(City::Nyc),
            neighborhood: Some("SoHo".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        let p = Coordinates::new(40.7233, -74.0030);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // SoHo to Williamsburg is about 4km
        let soho = Coordinates::new(40.7233, -74.0030);
        let williamsburg = Coordinates::new(40.7081, -73.9571);
        let km = HaversineResolver.resolve_distance(soho, williamsburg).unwrap();
        assert!((3.0..4.5).contains(&km), "got {km}");
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let km = haversine_km(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 0.0));
        assert!((km - 111.19).abs() < 0.01, "got {km}");
    }

    #[tokio::test]
    async fn test_locate_query_success() {
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_geocode()
            .withf(|location| location.starts_with("SoHo"))
            .times(1)
            .returning(|_| Ok(Some(Coordinates::new(40.7233, -74.0030))));
        geocoder.expect_name().return_const("mock");

        let located = locate_query(&geocoder, &soho_intent(), Duration::from_secs(1)).await;
        assert_eq!(located, Some(Coordinates::new(40.7233, -74.0030)));
    }

    #[tokio::test]
    async fn test_locate_query_error_is_unavailable() {
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_geocode()
            .times(1)
            .returning(|_| Err(AppError::ExternalApi("boom".to_string())));
        geocoder.expect_name().return_const("mock");

        let located = locate_query(&geocoder, &soho_intent(), Duration::from_secs(1)).await;
        assert_eq!(located, None);
    }

    #[tokio::test]
    async fn test_locate_query_without_location_skips_geocoder() {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_geocode().times(0);

        let located =
            locate_query(&geocoder, &QueryIntent::default(), Duration::from_secs(1)).await;
        assert_eq!(located, None);
    }

    struct HangingGeocoder;

    #[async_trait::async_trait]
    impl Geocoder for HangingGeocoder {
        async fn geocode(&self, _location: &str) -> crate::error::AppResult<Option<Coordinates>> {
            std::future::pending().await
        }

        fn name(&self) -> &'static str {
            "hanging"
        }
    }

    #[tokio::test]
    async fn test_locate_query_times_out() {
        let located =
            locate_query(&HangingGeocoder, &soho_intent(), Duration::from_millis(20)).await;
        assert_eq!(located, None);
    }
}
