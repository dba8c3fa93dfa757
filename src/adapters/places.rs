use crate::core::{Coordinates, MapProvider, PlaceRecord};
use crate::utils::error::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: Option<String>,
    name: String,
    geometry: Geometry,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
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

/// Nearby search against a Places-style JSON endpoint.
///
/// Request: `GET {endpoint}?location=lat,lng&radius=r[&keyword=q][&key=k]`.
/// `OK` and `ZERO_RESULTS` are successful statuses; anything else is a
/// [`ProviderError::Status`] carrying the provider's own message.
#[derive(Debug, Clone)]
pub struct HttpPlacesProvider {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpPlacesProvider {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            client,
        })
    }

    fn request_url(
        &self,
        center: Coordinates,
        radius_meters: u32,
        query: &str,
    ) -> Result<Url, ProviderError> {
        let mut params = vec![
            (
                "location",
                format!("{},{}", center.latitude, center.longitude),
            ),
            ("radius", radius_meters.to_string()),
        ];
        let keyword = query.trim();
        if !keyword.is_empty() {
            params.push(("keyword", keyword.to_string()));
        }
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }

        Url::parse_with_params(&self.endpoint, &params)
            .map_err(|e| ProviderError::Network(format!("invalid endpoint {}: {}", self.endpoint, e)))
    }
}

#[async_trait]
impl MapProvider for HttpPlacesProvider {
    async fn search_nearby(
        &self,
        center: Coordinates,
        radius_meters: u32,
        query: &str,
    ) -> Result<Vec<PlaceRecord>, ProviderError> {
        let url = self.request_url(center, radius_meters, query)?;
        tracing::debug!("Places request to: {}", self.endpoint);

        let response = self.client.get(url).send().await?;
        let http_status = response.status();
        tracing::debug!("Places response status: {}", http_status);

        if !http_status.is_success() {
            return Err(ProviderError::Status {
                status: http_status.as_u16().to_string(),
                reason: http_status
                    .canonical_reason()
                    .unwrap_or("unexpected HTTP status")
                    .to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: PlacesResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        if parsed.status != "OK" && parsed.status != "ZERO_RESULTS" {
            return Err(ProviderError::Status {
                reason: parsed
                    .error_message
                    .unwrap_or_else(|| "no error message".to_string()),
                status: parsed.status,
            });
        }

        let places = parsed
            .results
            .into_iter()
            .map(|result| PlaceRecord {
                place_id: result.place_id,
                name: result.name,
                location: Coordinates::new(result.geometry.location.lat, result.geometry.location.lng),
                raw_metadata: serde_json::Value::Object(result.extra),
            })
            .collect::<Vec<_>>();

        tracing::debug!("Places returned {} results", places.len());
        Ok(places)
    }
}
