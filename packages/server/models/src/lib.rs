#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the realty map server.
//!
//! Query parameters use camelCase like the rest of the JSON API. Listings
//! themselves are returned as
//! [`NormalizedProperty`](realty_map_listing_models::NormalizedProperty)
//! values and keep their snake_case shape.

use realty_map_listing_models::{GeoPoint, GeoRadius, NumericRange, SearchFilter};
use realty_map_source::LoadState;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Query parameters for the free-text search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryParams {
    /// The search text.
    #[serde(default)]
    pub q: String,
    /// Match listing text directly instead of geocoding.
    pub direct: Option<bool>,
}

/// Query parameters for the autocomplete endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionQueryParams {
    /// Partial location text.
    #[serde(default)]
    pub q: String,
}

/// Query parameters for the filtered listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyQueryParams {
    /// State code.
    pub state: Option<String>,
    /// City.
    pub city: Option<String>,
    /// ZIP code.
    pub postal_code: Option<String>,
    /// Substring of the address line.
    pub address: Option<String>,
    /// Minimum price.
    pub min_price: Option<f64>,
    /// Maximum price.
    pub max_price: Option<f64>,
    /// Minimum bedrooms.
    pub min_beds: Option<f64>,
    /// Maximum bedrooms.
    pub max_beds: Option<f64>,
    /// Minimum bathrooms.
    pub min_baths: Option<f64>,
    /// Maximum bathrooms.
    pub max_baths: Option<f64>,
    /// Minimum square footage.
    pub min_sqft: Option<f64>,
    /// Maximum square footage.
    pub max_sqft: Option<f64>,
    /// Center latitude for a radius constraint.
    pub lat: Option<f64>,
    /// Center longitude for a radius constraint.
    pub lng: Option<f64>,
    /// Radius in miles (requires `lat` and `lng`).
    pub radius: Option<f64>,
}

impl PropertyQueryParams {
    /// Builds a [`SearchFilter`]. Blank text parameters are ignored. A
    /// radius constraint is added only when both `lat` and `lng` are
    /// present; `default_radius_miles` applies when `radius` is absent.
    #[must_use]
    pub fn to_filter(&self, default_radius_miles: f64) -> SearchFilter {
        let geo = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoRadius {
                center: GeoPoint::new(lat, lng),
                radius_miles: self.radius.unwrap_or(default_radius_miles),
            }),
            _ => None,
        };

        SearchFilter {
            state_code: non_blank(self.state.as_deref()),
            city: non_blank(self.city.as_deref()),
            postal_code: non_blank(self.postal_code.as_deref()),
            address: non_blank(self.address.as_deref()),
            list_price: range(self.min_price, self.max_price),
            beds: range(self.min_beds, self.max_beds),
            baths: range(self.min_baths, self.max_baths),
            sqft: range(self.min_sqft, self.max_sqft),
            geo,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

const fn range(min: Option<f64>, max: Option<f64>) -> Option<NumericRange> {
    if min.is_none() && max.is_none() {
        None
    } else {
        Some(NumericRange { min, max })
    }
}

/// Price prediction for one listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPrediction {
    /// MLS number of the listing.
    pub property_id: String,
    /// Predicted value, or `null` if the service gave none.
    pub prediction: Option<f64>,
}

/// Data store status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatus {
    /// Where the MLS data is loaded from.
    pub source: String,
    /// Current load state.
    pub load: LoadState,
}
