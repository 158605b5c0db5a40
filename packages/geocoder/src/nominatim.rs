//! Nominatim / `OpenStreetMap` free-text geocoder client.
//!
//! The public instance allows at most **1 request per second** and
//! requires an identifying `User-Agent`. Search bars are debounced
//! upstream, so no client-side rate limiting is done here.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use async_trait::async_trait;
use realty_map_listing_models::GeoPoint;

use crate::service_registry::{GeocodingService, ProviderConfig};
use crate::{GeocodeError, Geocoder};

/// Geocoder backed by a Nominatim `/search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    country_codes: Option<String>,
}

impl NominatimGeocoder {
    /// Creates a client for the given endpoint.
    ///
    /// `timeout` bounds every request, so a hung connection resolves to
    /// "no location" instead of stalling the search.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_owned(),
            country_codes: None,
        })
    }

    /// Restricts results to a comma-separated list of ISO country codes.
    #[must_use]
    pub fn with_country_codes(mut self, codes: &str) -> Self {
        self.country_codes = Some(codes.to_owned());
        self
    }

    /// Builds a client from a registry entry.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the client cannot be built.
    pub fn from_service(service: &GeocodingService) -> Result<Self, GeocodeError> {
        let ProviderConfig::Nominatim {
            base_url,
            timeout_secs,
            user_agent,
            country_codes,
        } = &service.provider;

        let geocoder = Self::new(base_url, user_agent, Duration::from_secs(*timeout_secs))?;

        Ok(match country_codes {
            Some(codes) => geocoder.with_country_codes(codes),
            None => geocoder,
        })
    }

    /// The endpoint this client queries.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn try_resolve(&self, query: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        let mut params = vec![("q", query), ("format", "json"), ("limit", "1")];
        if let Some(codes) = &self.country_codes {
            params.push(("countrycodes", codes.as_str()));
        }

        let resp = self.client.get(&self.base_url).query(&params).send().await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nominatim JSON response, returning the first result.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeoPoint>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = parse_coordinate(&first["lat"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lat in Nominatim response".to_string(),
    })?;

    let lng = parse_coordinate(&first["lon"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lon in Nominatim response".to_string(),
    })?;

    Ok(Some(GeoPoint::new(lat, lng)))
}

/// Nominatim returns coordinates as strings; accept bare numbers too.
fn parse_coordinate(value: &serde_json::Value) -> Option<f64> {
    value
        .as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .or_else(|| value.as_f64())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!([{
            "lat": "42.3554334",
            "lon": "-71.0605062",
            "display_name": "Boston, Suffolk County, Massachusetts, United States"
        }, {
            "lat": "40.0",
            "lon": "-70.0"
        }]);
        let point = parse_response(&body).unwrap().unwrap();
        assert!((point.lat - 42.355_433_4).abs() < 1e-6);
        assert!((point.lng - -71.060_506_2).abs() < 1e-6);
    }

    #[test]
    fn parses_nominatim_empty() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_non_array_body() {
        let body = serde_json::json!({ "error": "Unable to geocode" });
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_unparseable_coordinates() {
        let body = serde_json::json!([{ "lat": "north-ish", "lon": "-71.06" }]);
        assert!(parse_response(&body).is_err());

        let body = serde_json::json!([{ "lat": "42.36" }]);
        assert!(parse_response(&body).is_err());
    }

    #[test]
    fn accepts_numeric_coordinates() {
        let body = serde_json::json!([{ "lat": 42.36, "lon": -71.06 }]);
        let point = parse_response(&body).unwrap().unwrap();
        assert!((point.lat - 42.36).abs() < f64::EPSILON);
    }

    #[test]
    fn builds_from_registry() {
        let service = crate::service_registry::enabled_services()
            .into_iter()
            .next()
            .expect("at least one enabled service");
        let geocoder = NominatimGeocoder::from_service(&service).unwrap();
        assert_eq!(geocoder.base_url(), service.base_url());
    }
}
