//! Record predicates for the direct text search and the structured filter.

use realty_map_listing_models::{NumericRange, RawRecord, SearchFilter};
use realty_map_spatial::is_within_radius;

/// A lower-cased direct-search query.
///
/// A record matches if its address starts with the whole query, or if
/// every space-separated term occurs somewhere in the record's address,
/// town, state and ZIP joined by single spaces. Terms come from splitting
/// on single spaces, so doubled spaces yield empty terms that match
/// anything.
#[derive(Debug, Clone)]
pub struct DirectQuery {
    lowered: String,
    terms: Vec<String>,
}

impl DirectQuery {
    #[must_use]
    pub fn new(query: &str) -> Self {
        let lowered = query.to_lowercase();
        let terms = lowered.split(' ').map(str::to_owned).collect();
        Self { lowered, terms }
    }

    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    #[must_use]
    pub fn matches(&self, record: &RawRecord) -> bool {
        if let Some(address) = &record.address
            && address.to_lowercase().starts_with(&self.lowered)
        {
            return true;
        }

        let text = searchable_text(record);
        self.terms.iter().all(|term| text.contains(term.as_str()))
    }
}

/// Address, town, state and ZIP, skipping empty parts, lower-cased.
#[must_use]
pub fn searchable_text(record: &RawRecord) -> String {
    [&record.address, &record.town, &record.state, &record.zip_code]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Returns `true` if `record` satisfies every constraint in `filter`.
///
/// Text constraints: state and city are exact case-insensitive matches,
/// the postal code is an exact match, and the address is a
/// case-insensitive substring. A record missing a constrained field never
/// matches. Numeric ranges are inclusive.
#[must_use]
pub fn matches_filter(record: &RawRecord, filter: &SearchFilter) -> bool {
    if let Some(state) = &filter.state_code
        && !eq_ignore_case(record.state.as_deref(), state)
    {
        return false;
    }

    if let Some(city) = &filter.city
        && !eq_ignore_case(record.town.as_deref(), city)
    {
        return false;
    }

    if let Some(postal_code) = &filter.postal_code
        && record.zip_code.as_deref() != Some(postal_code.as_str())
    {
        return false;
    }

    if let Some(address) = &filter.address {
        let needle = address.to_lowercase();
        let found = record
            .address
            .as_deref()
            .is_some_and(|a| a.to_lowercase().contains(&needle));
        if !found {
            return false;
        }
    }

    let ranges = [
        (filter.list_price, record.list_price),
        (filter.beds, record.bedrooms.map(f64::from)),
        (filter.baths, record.total_baths),
        (filter.sqft, record.square_feet),
    ];
    if !ranges
        .into_iter()
        .all(|(range, value)| in_range(range.as_ref(), value))
    {
        return false;
    }

    if let Some(geo) = &filter.geo {
        return record
            .coordinates()
            .is_some_and(|point| is_within_radius(geo.center, point, geo.radius_miles));
    }

    true
}

fn eq_ignore_case(value: Option<&str>, expected: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase() == expected.to_lowercase())
}

fn in_range(range: Option<&NumericRange>, value: Option<f64>) -> bool {
    match range {
        None => true,
        Some(range) if range.is_unbounded() => true,
        Some(range) => value.is_some_and(|v| range.contains(v)),
    }
}
