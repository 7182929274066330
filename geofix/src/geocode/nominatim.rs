//! Nominatim reverse geocoder.
//!
//! Talks to any service implementing the Nominatim `/reverse` endpoint
//! (`format=jsonv2`, `addressdetails=1`). The public OpenStreetMap instance
//! requires an identifying User-Agent and allows at most one request per
//! second, which the single-flight coordinator keeps us well under.

use std::time::Duration;

use serde::Deserialize;

use super::client::{BoxFuture, Geocoder};
use super::error::GeocodeError;
use super::placemark::Placemark;
use crate::coord::Coordinate;

/// Public OpenStreetMap Nominatim endpoint.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`NominatimGeocoder`].
#[derive(Debug, Clone, PartialEq)]
pub struct NominatimConfig {
    /// Full URL of the reverse endpoint.
    pub url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_NOMINATIM_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("geofix/{}", crate::VERSION),
        }
    }
}

/// Reverse geocoder backed by a Nominatim HTTP service.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    url: String,
}

impl NominatimGeocoder {
    /// Build a geocoder from `config`.
    pub fn new(config: &NominatimConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodeError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    async fn fetch(&self, coordinate: Coordinate) -> Result<Vec<Placemark>, GeocodeError> {
        tracing::debug!(url = %self.url, %coordinate, "Reverse geocoding");

        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("format", "jsonv2"),
                ("addressdetails", "1"),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::Http(format!("Failed to read response: {}", e)))?;

        parse_reverse_response(&body)
    }
}

impl Geocoder for NominatimGeocoder {
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> BoxFuture<'_, Result<Vec<Placemark>, GeocodeError>> {
        Box::pin(self.fetch(coordinate))
    }

    fn name(&self) -> &str {
        "nominatim"
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    address: Option<AddressDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct AddressDetails {
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

impl From<AddressDetails> for Placemark {
    fn from(details: AddressDetails) -> Self {
        Placemark {
            sub_thoroughfare: details.house_number,
            thoroughfare: details.road,
            locality: details
                .city
                .or(details.town)
                .or(details.village)
                .or(details.hamlet),
            administrative_area: details.state,
            postal_code: details.postcode,
            country: details.country,
        }
    }
}

/// Parse a `/reverse` response body.
///
/// Nominatim answers "nothing here" (open ocean, for instance) with HTTP 200
/// and `{"error": "Unable to geocode"}`. That is reported as an empty list,
/// not as a failure.
fn parse_reverse_response(body: &str) -> Result<Vec<Placemark>, GeocodeError> {
    let response: ReverseResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Json(e.to_string()))?;

    if let Some(error) = response.error {
        if error.eq_ignore_ascii_case("unable to geocode") {
            return Ok(Vec::new());
        }
        return Err(GeocodeError::Service(error));
    }

    Ok(response
        .address
        .map(Placemark::from)
        .filter(|placemark| !placemark.is_empty())
        .into_iter()
        .collect())
}
