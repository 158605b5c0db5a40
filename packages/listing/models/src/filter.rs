//! Structured search constraints.

use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// An inclusive numeric range. Either bound may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
}

impl NumericRange {
    /// Range with only a lower bound.
    #[must_use]
    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Range with only an upper bound.
    #[must_use]
    pub const fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Range with both bounds.
    #[must_use]
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Returns `true` if neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Returns `true` if `value` satisfies both bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// A circle on the earth's surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRadius {
    /// Circle center.
    pub center: GeoPoint,
    /// Radius in miles.
    pub radius_miles: f64,
}

/// Optional constraints for the filtered search. Every supplied field must
/// match; absent fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// State code, compared case-insensitively.
    pub state_code: Option<String>,
    /// City, compared case-insensitively.
    pub city: Option<String>,
    /// Exact postal code.
    pub postal_code: Option<String>,
    /// Case-insensitive substring of the address line.
    pub address: Option<String>,
    /// Price range.
    pub list_price: Option<NumericRange>,
    /// Bedroom range.
    pub beds: Option<NumericRange>,
    /// Bathroom range.
    pub baths: Option<NumericRange>,
    /// Square footage range.
    pub sqft: Option<NumericRange>,
    /// Geographic circle.
    pub geo: Option<GeoRadius>,
}

impl SearchFilter {
    /// Returns `true` if no constraint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state_code.is_none()
            && self.city.is_none()
            && self.postal_code.is_none()
            && self.address.is_none()
            && self.list_price.is_none_or(|r| r.is_unbounded())
            && self.beds.is_none_or(|r| r.is_unbounded())
            && self.baths.is_none_or(|r| r.is_unbounded())
            && self.sqft.is_none_or(|r| r.is_unbounded())
            && self.geo.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_inclusive() {
        let range = NumericRange::between(3.0, 5.0);
        assert!(range.contains(3.0));
        assert!(range.contains(5.0));
        assert!(!range.contains(2.9));
        assert!(!range.contains(5.1));
    }

    #[test]
    fn half_open_ranges() {
        assert!(NumericRange::at_least(3.0).contains(1_000.0));
        assert!(!NumericRange::at_least(3.0).contains(2.0));
        assert!(NumericRange::at_most(500_000.0).contains(0.0));
        assert!(!NumericRange::at_most(500_000.0).contains(500_001.0));
    }

    #[test]
    fn zero_is_a_real_bound() {
        assert!(!NumericRange::at_least(0.0).contains(-1.0));
    }

    #[test]
    fn empty_filter_detection() {
        assert!(SearchFilter::default().is_empty());

        let filter = SearchFilter {
            beds: Some(NumericRange::default()),
            ..SearchFilter::default()
        };
        assert!(filter.is_empty());

        let filter = SearchFilter {
            city: Some("Boston".to_string()),
            ..SearchFilter::default()
        };
        assert!(!filter.is_empty());
    }
}
