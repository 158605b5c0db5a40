//! The normalized property shape consumed by the API and CLI.

use serde::{Deserialize, Serialize};

use crate::RawRecord;

/// Units reported for [`NormalizedProperty::building_size`].
pub const BUILDING_SIZE_UNITS: &str = "SQUARE FEET";

/// Units reported for [`NormalizedProperty::lot_size`].
pub const LOT_SIZE_UNITS: &str = "acres";

/// Property type used when the export has no style.
pub const UNKNOWN_PROPERTY_TYPE: &str = "Unknown";

/// A listing in the canonical format, derived one-to-one from a
/// [`RawRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProperty {
    /// MLS listing number.
    pub property_id: Option<String>,
    /// Listing price in dollars.
    pub list_price: Option<f64>,
    /// Postal location.
    pub location: Location,
    /// Listing remarks.
    pub description: Option<String>,
    /// Building style, or [`UNKNOWN_PROPERTY_TYPE`].
    pub property_type: String,
    /// Year built.
    pub year_built: Option<i32>,
    /// Bedrooms.
    pub beds: Option<u32>,
    /// Bathrooms.
    pub baths: Option<f64>,
    /// Living area.
    pub building_size: Measurement,
    /// Lot area.
    pub lot_size: Measurement,
    /// The source row.
    pub raw_data: RawRecord,
}

/// Location wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Postal address.
    pub address: Address,
}

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street line (e.g., "10 Elm St").
    pub line: Option<String>,
    /// City / town.
    pub city: Option<String>,
    /// Two-letter state abbreviation.
    pub state_code: Option<String>,
    /// ZIP code.
    pub postal_code: Option<String>,
}

/// A size with units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Numeric size, if known.
    pub size: Option<f64>,
    /// Units label.
    pub units: String,
}

impl Measurement {
    /// Creates a measurement.
    #[must_use]
    pub fn new(size: Option<f64>, units: &str) -> Self {
        Self {
            size,
            units: units.to_owned(),
        }
    }
}
