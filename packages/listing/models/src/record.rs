//! Typed MLS export rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// A dynamically typed CSV cell, used for columns outside the known MLS
/// schema.
///
/// Numeric-looking cells become numbers, `true`/`false` become booleans,
/// and empty cells become [`CsvValue::Null`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CsvValue {
    /// Boolean cell (`true`/`false`, any case).
    Bool(bool),
    /// Integer cell.
    Integer(i64),
    /// Floating point cell.
    Float(f64),
    /// Anything else, trimmed.
    Text(String),
    /// Empty cell.
    Null,
}

impl CsvValue {
    /// Infers the type of a raw CSV cell.
    #[must_use]
    pub fn infer(raw: &str) -> Self {
        let value = raw.trim();
        if value.is_empty() {
            return Self::Null;
        }
        if value.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if value.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if let Ok(n) = value.parse::<i64>() {
            return Self::Integer(n);
        }
        if let Ok(f) = value.parse::<f64>()
            && f.is_finite()
        {
            return Self::Float(f);
        }
        Self::Text(value.to_owned())
    }

    /// Returns `true` for an empty cell.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// One row of the MLS CSV export.
///
/// The columns the system reads are typed fields; absent or malformed
/// values are `None`. Every other column is kept in [`RawRecord::extra`]
/// so the record serializes back to the full upstream row (this is the
/// `raw_data` payload handed to the price prediction service).
///
/// `LIST_NO` and `ZIP_CODE` are kept as text: MLS numbers and New England
/// ZIP codes carry significant leading zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// MLS listing number, the canonical identifier.
    #[serde(rename = "LIST_NO", default)]
    pub list_no: Option<String>,
    /// Listing (or sold) price in dollars.
    #[serde(rename = "LIST_PRICE", default)]
    pub list_price: Option<f64>,
    /// Street address line (e.g., "10 Elm St").
    #[serde(rename = "ADDRESS", default)]
    pub address: Option<String>,
    /// Town / city name.
    #[serde(rename = "TOWN", default)]
    pub town: Option<String>,
    /// Two-letter state abbreviation.
    #[serde(rename = "STATE", default)]
    pub state: Option<String>,
    /// ZIP code.
    #[serde(rename = "ZIP_CODE", default)]
    pub zip_code: Option<String>,
    /// Number of bedrooms.
    #[serde(rename = "NO_BEDROOMS", default)]
    pub bedrooms: Option<u32>,
    /// Total bathrooms (half baths count as fractions).
    #[serde(rename = "TOTAL_BATHS", default)]
    pub total_baths: Option<f64>,
    /// Living area in square feet.
    #[serde(rename = "SQUARE_FEET", default)]
    pub square_feet: Option<f64>,
    /// Latitude (WGS84).
    #[serde(rename = "LATITUDE", default)]
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    #[serde(rename = "LONGITUDE", default)]
    pub longitude: Option<f64>,
    /// Year the building was built.
    #[serde(rename = "YEAR_BUILT", default)]
    pub year_built: Option<i32>,
    /// Lot size in acres.
    #[serde(rename = "ACRE", default)]
    pub acre: Option<f64>,
    /// Free-text listing remarks.
    #[serde(rename = "REMARKS", default)]
    pub remarks: Option<String>,
    /// Single-family style (e.g., "Colonial").
    #[serde(rename = "STYLE_SF", default)]
    pub style: Option<String>,
    /// All remaining columns, keyed by trimmed header.
    #[serde(flatten)]
    pub extra: BTreeMap<String, CsvValue>,
}

impl RawRecord {
    /// Returns the record's own coordinates. Returns `None` if either is
    /// missing or zero (MLS exports use `0` for "not geocoded").
    #[must_use]
    pub fn coordinates(&self) -> Option<GeoPoint> {
        let lat = self.latitude?;
        let lng = self.longitude?;
        if lat == 0.0 || lng == 0.0 {
            return None;
        }
        Some(GeoPoint::new(lat, lng))
    }

    /// Returns `true` if the row carries no data at all.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.list_no.is_none()
            && self.list_price.is_none()
            && self.address.is_none()
            && self.town.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
            && self.bedrooms.is_none()
            && self.total_baths.is_none()
            && self.square_feet.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.year_built.is_none()
            && self.acre.is_none()
            && self.remarks.is_none()
            && self.style.is_none()
            && self.extra.values().all(CsvValue::is_null)
    }
}
