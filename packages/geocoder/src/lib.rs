#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding for free-text listing searches.
//!
//! Resolves what a user typed into the search bar ("Back Bay", "02108",
//! "Worcester, MA") to a single coordinate that the radius search is
//! centered on. The only provider is Nominatim / `OpenStreetMap`, configured
//! via the TOML file in `services/` (see [`service_registry`]).
//!
//! Geocoding never fails the caller: [`Geocoder::resolve`] logs errors and
//! reports "no location" instead. [`Geocoder::try_resolve`] keeps the error
//! for diagnostics.

pub mod nominatim;
pub mod service_registry;

use async_trait::async_trait;
use realty_map_listing_models::GeoPoint;
use thiserror::Error;

pub use nominatim::NominatimGeocoder;

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed (connection, timeout, or non-2xx status).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// No usable geocoding service is configured.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },
}

/// Resolves free-text queries to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Short provider name for log messages.
    fn name(&self) -> &str;

    /// Resolves `query` to the first matching coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn try_resolve(&self, query: &str) -> Result<Option<GeoPoint>, GeocodeError>;

    /// Resolves `query`, treating every failure as "no location found".
    async fn resolve(&self, query: &str) -> Option<GeoPoint> {
        match self.try_resolve(query).await {
            Ok(Some(point)) => {
                log::debug!(
                    "[{}] Resolved {query:?} to ({}, {})",
                    self.name(),
                    point.lat,
                    point.lng
                );
                Some(point)
            }
            Ok(None) => {
                log::debug!("[{}] No location found for {query:?}", self.name());
                None
            }
            Err(e) => {
                log::warn!("[{}] Failed to geocode {query:?}: {e}", self.name());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl Geocoder for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn try_resolve(&self, _query: &str) -> Result<Option<GeoPoint>, GeocodeError> {
            Err(GeocodeError::RateLimited)
        }
    }

    struct Fixed(Option<GeoPoint>);

    #[async_trait]
    impl Geocoder for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn try_resolve(&self, _query: &str) -> Result<Option<GeoPoint>, GeocodeError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn resolve_swallows_errors() {
        assert!(Failing.try_resolve("Boston").await.is_err());
        assert!(Failing.resolve("Boston").await.is_none());
    }

    #[tokio::test]
    async fn resolve_passes_results_through() {
        let point = GeoPoint::new(42.36, -71.06);
        assert_eq!(Fixed(Some(point)).resolve("Boston").await, Some(point));
        assert!(Fixed(None).resolve("Nowhere").await.is_none());
    }
}
