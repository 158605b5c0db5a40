//! Conversion of MLS records into the normalized property format.

use realty_map_listing_models::{
    Address, BUILDING_SIZE_UNITS, LOT_SIZE_UNITS, Location, Measurement, NormalizedProperty,
    RawRecord, UNKNOWN_PROPERTY_TYPE,
};

/// Maps a record to a [`NormalizedProperty`].
///
/// Returns `None` only for a blank row. Missing fields are carried through
/// as `None`; nothing else is validated.
#[must_use]
pub fn normalize(raw: &RawRecord) -> Option<NormalizedProperty> {
    if raw.is_blank() {
        return None;
    }

    Some(NormalizedProperty {
        property_id: raw.list_no.clone(),
        list_price: raw.list_price,
        location: Location {
            address: Address {
                line: raw.address.clone(),
                city: raw.town.clone(),
                state_code: raw.state.clone(),
                postal_code: raw.zip_code.clone(),
            },
        },
        description: raw.remarks.clone(),
        property_type: raw
            .style
            .clone()
            .unwrap_or_else(|| UNKNOWN_PROPERTY_TYPE.to_string()),
        year_built: raw.year_built,
        beds: raw.bedrooms,
        baths: raw.total_baths,
        building_size: Measurement::new(raw.square_feet, BUILDING_SIZE_UNITS),
        lot_size: Measurement::new(raw.acre, LOT_SIZE_UNITS),
        raw_data: raw.clone(),
    })
}
