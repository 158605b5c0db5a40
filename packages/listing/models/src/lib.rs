#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Listing types shared across the realty map system.
//!
//! Every MLS export row is parsed into a typed [`RawRecord`], which the
//! format adapter turns into the [`NormalizedProperty`] shape consumed by
//! the API and CLI. Search inputs ([`SearchFilter`]) and autocomplete
//! outputs ([`Suggestion`]) live here too so that every crate speaks the
//! same vocabulary.

mod filter;
mod property;
mod record;
mod suggestion;

pub use filter::{GeoRadius, NumericRange, SearchFilter};
pub use property::{
    Address, BUILDING_SIZE_UNITS, LOT_SIZE_UNITS, Location, Measurement, NormalizedProperty,
    UNKNOWN_PROPERTY_TYPE,
};
pub use record::{CsvValue, RawRecord};
pub use suggestion::{Suggestion, SuggestionType};

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a new point from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}
