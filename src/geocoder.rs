use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::constants;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("geocoder returned status {0}")]
    Status(u16),
    #[error("geocoder returned an unreadable body: {0}")]
    Body(String),
    #[error("geocoder returned an invalid coordinate: {0}")]
    Coordinate(String),
}

/// Resolves free text to the first matching coordinate pair.
///
/// `Ok(None)` means the lookup succeeded but nothing matched.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>, GeocodeError>;
}

// One entry of Nominatim's `/search?format=json` response. Coordinates arrive as strings.
#[derive(Deserialize, Debug)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// [`Geocoder`] backed by the public Nominatim (OpenStreetMap) search API.
pub struct NominatimGeocoder {
    client: Client,
    search_url: String,
    user_agent: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            client: Client::new(),
            search_url: format!("{}/search", base.trim_end_matches('/')),
            user_agent: user_agent.into(),
        }
    }
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new(constants::DEFAULT_GEOCODER_URL, constants::DEFAULT_USER_AGENT)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query), ("format", "json")])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let places: Vec<Place> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Body(e.to_string()))?;
        debug!(%query, results = places.len(), "Geocoding results");

        let Some(first) = places.into_iter().next() else {
            return Ok(None);
        };
        debug!(place = ?first.display_name, lat = %first.lat, lon = %first.lon, "Using first result");

        let latitude = parse_coordinate(&first.lat)?;
        let longitude = parse_coordinate(&first.lon)?;
        Ok(Some(GeoPoint::new(latitude, longitude)))
    }
}

fn parse_coordinate(raw: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| GeocodeError::Coordinate(raw.to_string()))
}
