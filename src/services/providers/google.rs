//! Google Geocoding API provider
//!
//! API Flow:
//! 1. GET /maps/api/geocode/json?address={location}&key={api_key}
//! 2. `status` "OK" → first result's `geometry.location`
//!    `status` "ZERO_RESULTS" → no match
//!    anything else → error
//!
//! Results are cached for a week when a cache is configured, "no match"
//! included: a cached `None` is served without calling the API.
use crate::{
    cache::{Cache, CacheKey},
    cached,
    error::{AppError, AppResult},
    models::Coordinates,
    services::providers::Geocoder,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

const GEOCODE_CACHE_TTL: u64 = 604800; // 1 week

#[derive(Clone)]
pub struct GoogleGeocoder {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GoogleGeocoder {
    pub fn new(api_key: String, api_url: String, cache: Option<Cache>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn fetch(&self, location: &str) -> AppResult<Option<Coordinates>> {
        let url = format!("{}/maps/api/geocode/json", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("address", location), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Geocoding API returned status {}: {}",
                status, body
            )));
        }

        let body: GeocodeResponse = response.json().await?;
        let coordinates = Self::first_location(body)?;

        tracing::debug!(
            location = %location,
            found = coordinates.is_some(),
            "Geocoded location"
        );

        Ok(coordinates)
    }

    fn first_location(body: GeocodeResponse) -> AppResult<Option<Coordinates>> {
        match body.status.as_str() {
            "OK" => Ok(body
                .results
                .first()
                .map(|r| Coordinates::new(r.geometry.location.lat, r.geometry.location.lng))),
            "ZERO_RESULTS" => Ok(None),
            status => Err(AppError::ExternalApi(format!(
                "Geocoding API status {}: {}",
                status,
                body.error_message.unwrap_or_default()
            ))),
        }
    }
}

#[async_trait::async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, location: &str) -> AppResult<Option<Coordinates>> {
        match &self.cache {
            Some(cache) => cached!(
                cache,
                CacheKey::Geocode(location.to_string()),
                GEOCODE_CACHE_TTL,
                self.fetch(location)
            ),
            None => self.fetch(location).await,
        }
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Serves a canned geocoding API on an ephemeral port and returns its base URL
    async fn stub_api() -> String {
        async fn geocode(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
            let address = params.get("address").map(String::as_str).unwrap_or_default();
            let body = match address {
                "SoHo, NYC" => json!({
                    "status": "OK",
                    "results": [
                        {"geometry": {"location": {"lat": 40.7233, "lng": -74.0030}}},
                        {"geometry": {"location": {"lat": 0.0, "lng": 0.0}}}
                    ]
                }),
                "Nowhere" => json!({"status": "ZERO_RESULTS", "results": []}),
                _ => json!({"status": "REQUEST_DENIED", "error_message": "bad key"}),
            };
            Json(body)
        }

        let app = Router::new().route("/maps/api/geocode/json", get(geocode));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_geocode_returns_first_result() {
        let geocoder = GoogleGeocoder::new("key".to_string(), stub_api().await, None);
        let coordinates = geocoder.geocode("SoHo, NYC").await.unwrap();
        assert_eq!(coordinates, Some(Coordinates::new(40.7233, -74.0030)));
    }

    #[tokio::test]
    async fn test_geocode_zero_results_is_none() {
        let geocoder = GoogleGeocoder::new("key".to_string(), stub_api().await, None);
        assert_eq!(geocoder.geocode("Nowhere").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_geocode_denied_is_external_api_error() {
        let geocoder = GoogleGeocoder::new("key".to_string(), stub_api().await, None);
        let err = geocoder.geocode("Brera, Milan").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
        assert!(err.to_string().contains("REQUEST_DENIED"));
    }

    #[tokio::test]
    async fn test_geocode_falls_back_when_cache_unreachable() {
        let client = crate::cache::create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, _handle) = Cache::new(client);
        let geocoder = GoogleGeocoder::new("key".to_string(), stub_api().await, Some(cache));

        let coordinates = geocoder.geocode("SoHo, NYC").await.unwrap();
        assert!(coordinates.is_some());
    }

    #[test]
    fn test_first_location_ok_without_results() {
        let body = GeocodeResponse {
            status: "OK".to_string(),
            results: Vec::new(),
            error_message: None,
        };
        assert_eq!(GoogleGeocoder::first_location(body).unwrap(), None);
    }
}
