#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Great-circle distance and radius membership for listing coordinates.
//!
//! [`distance_miles`] is the haversine formula on a sphere of radius
//! [`EARTH_RADIUS_MILES`]. [`RadiusIndex`] holds listing coordinates in an
//! R-tree so that radius searches only run the exact haversine test on
//! points inside the circle's bounding box.

use std::f64::consts::FRAC_PI_2;

use realty_map_listing_models::GeoPoint;
use rstar::{AABB, RTree, RTreeObject};

/// Earth radius used by every distance computation, in miles.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Radius of the geocoded ("near this place") listing search, in miles.
pub const DEFAULT_SEARCH_RADIUS_MILES: f64 = 25.0;

/// Slack added to each side of a query envelope, in degrees, so that
/// floating point rounding never excludes a point the exact test accepts.
const ENVELOPE_PAD_DEGREES: f64 = 1e-6;

/// Returns the haversine distance between two points in miles.
#[must_use]
pub fn distance_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = b.lng.to_radians() - a.lng.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Returns `true` if `point` lies within `radius_miles` of `center`
/// (inclusive).
#[must_use]
pub fn is_within_radius(center: GeoPoint, point: GeoPoint, radius_miles: f64) -> bool {
    distance_miles(center, point) <= radius_miles
}

/// A listing coordinate stored in the R-tree with its position in the
/// source dataset.
struct IndexedPoint {
    position: usize,
    point: GeoPoint,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.lng, self.point.lat])
    }
}

/// Spatial index over listing coordinates.
///
/// Points whose coordinates fall outside the normal `[-90, 90]` /
/// `[-180, 180]` ranges are kept aside and always checked exactly, so
/// [`RadiusIndex::within`] returns the same set as a linear
/// [`is_within_radius`] scan.
pub struct RadiusIndex {
    tree: RTree<IndexedPoint>,
    irregular: Vec<IndexedPoint>,
}

impl RadiusIndex {
    /// Builds the index from `(position, point)` pairs.
    #[must_use]
    pub fn new(points: impl IntoIterator<Item = (usize, GeoPoint)>) -> Self {
        let (regular, irregular): (Vec<_>, Vec<_>) = points
            .into_iter()
            .map(|(position, point)| IndexedPoint { position, point })
            .partition(|p| is_regular(p.point));

        let tree = RTree::bulk_load(regular);
        log::debug!(
            "Built radius index over {} points ({} outside normal ranges)",
            tree.size(),
            irregular.len()
        );

        Self { tree, irregular }
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size() + self.irregular.len()
    }

    /// Returns `true` if no points are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the positions of every point within `radius_miles` of
    /// `center`, in ascending order.
    #[must_use]
    pub fn within(&self, center: GeoPoint, radius_miles: f64) -> Vec<usize> {
        let accept = |p: &&IndexedPoint| is_within_radius(center, p.point, radius_miles);

        let mut positions: Vec<usize> = match query_envelope(center, radius_miles) {
            Some(envelope) => self
                .tree
                .locate_in_envelope_intersecting(&envelope)
                .filter(accept)
                .map(|p| p.position)
                .collect(),
            None => self.tree.iter().filter(accept).map(|p| p.position).collect(),
        };

        positions.extend(self.irregular.iter().filter(accept).map(|p| p.position));
        positions.sort_unstable();
        positions
    }
}

fn is_regular(point: GeoPoint) -> bool {
    (-90.0..=90.0).contains(&point.lat) && (-180.0..=180.0).contains(&point.lng)
}

/// Bounding box of the circle around `center`, in `[lng, lat]` degrees.
///
/// Returns `None` when the circle touches a pole or crosses the
/// antimeridian; callers then scan every point.
fn query_envelope(center: GeoPoint, radius_miles: f64) -> Option<AABB<[f64; 2]>> {
    if !is_regular(center) || !radius_miles.is_finite() || radius_miles < 0.0 {
        return None;
    }

    let angular = radius_miles / EARTH_RADIUS_MILES;
    let lat = center.lat.to_radians();
    let lng = center.lng.to_radians();

    let min_lat = lat - angular;
    let max_lat = lat + angular;
    if min_lat <= -FRAC_PI_2 || max_lat >= FRAC_PI_2 {
        return None;
    }

    let d_lng = (angular.sin() / lat.cos()).asin();
    let min_lng = lng - d_lng;
    let max_lng = lng + d_lng;
    if min_lng < -std::f64::consts::PI || max_lng > std::f64::consts::PI {
        return None;
    }

    Some(AABB::from_corners(
        [
            min_lng.to_degrees() - ENVELOPE_PAD_DEGREES,
            min_lat.to_degrees() - ENVELOPE_PAD_DEGREES,
        ],
        [
            max_lng.to_degrees() + ENVELOPE_PAD_DEGREES,
            max_lat.to_degrees() + ENVELOPE_PAD_DEGREES,
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOSTON: GeoPoint = GeoPoint::new(42.3601, -71.0589);
    const CAMBRIDGE: GeoPoint = GeoPoint::new(42.3736, -71.1097);
    const WORCESTER: GeoPoint = GeoPoint::new(42.2626, -71.8023);
    const NEW_YORK: GeoPoint = GeoPoint::new(40.7128, -74.0060);

    fn assert_close(a: f64, b: f64) {
        let scale = a.abs().max(b.abs()).max(1.0);
        assert!((a - b).abs() <= 1e-9 * scale, "{a} != {b}");
    }

    #[test]
    fn identical_points_are_zero_distance() {
        assert!(distance_miles(BOSTON, BOSTON).abs() < f64::EPSILON);
        assert!(is_within_radius(BOSTON, BOSTON, 0.0));
    }

    #[test]
    fn distance_is_symmetric() {
        for (a, b) in [
            (BOSTON, CAMBRIDGE),
            (BOSTON, NEW_YORK),
            (WORCESTER, NEW_YORK),
            (GeoPoint::new(-33.86, 151.21), GeoPoint::new(51.5, -0.12)),
        ] {
            assert_close(distance_miles(a, b), distance_miles(b, a));
        }
    }

    #[test]
    fn known_distances() {
        // Boston -> New York is roughly 190 miles as the crow flies.
        let d = distance_miles(BOSTON, NEW_YORK);
        assert!((185.0..195.0).contains(&d), "got {d}");

        // Boston -> Cambridge is under 3 miles.
        assert!(distance_miles(BOSTON, CAMBRIDGE) < 3.0);
    }

    #[test]
    fn radius_membership_is_monotonic() {
        let d = distance_miles(BOSTON, WORCESTER);
        assert!(!is_within_radius(BOSTON, WORCESTER, d - 0.01));
        assert!(is_within_radius(BOSTON, WORCESTER, d));
        for r in [d + 0.01, d + 1.0, 1_000.0, f64::MAX] {
            assert!(is_within_radius(BOSTON, WORCESTER, r));
        }
    }

    #[test]
    fn default_radius_keeps_boston_drops_worcester() {
        assert!(is_within_radius(
            BOSTON,
            CAMBRIDGE,
            DEFAULT_SEARCH_RADIUS_MILES
        ));
        assert!(!is_within_radius(
            BOSTON,
            WORCESTER,
            DEFAULT_SEARCH_RADIUS_MILES
        ));
    }

    /// Deterministic pseudo-random points spread over the globe, with a
    /// cluster around Boston and a few out-of-range coordinates.
    fn sample_points() -> Vec<(usize, GeoPoint)> {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        };

        let mut points = Vec::new();
        for i in 0..400 {
            let point = if i % 2 == 0 {
                GeoPoint::new(BOSTON.lat + (next() - 0.5), BOSTON.lng + (next() - 0.5))
            } else {
                GeoPoint::new(next() * 180.0 - 90.0, next() * 360.0 - 180.0)
            };
            points.push((i, point));
        }
        points.push((400, GeoPoint::new(BOSTON.lat, BOSTON.lng + 360.0)));
        points.push((401, GeoPoint::new(89.99, 10.0)));
        points.push((402, GeoPoint::new(10.0, 179.99)));
        points
    }

    fn linear_scan(points: &[(usize, GeoPoint)], center: GeoPoint, radius: f64) -> Vec<usize> {
        points
            .iter()
            .filter(|(_, p)| is_within_radius(center, *p, radius))
            .map(|(i, _)| *i)
            .collect()
    }

    #[test]
    fn index_matches_linear_scan() {
        let points = sample_points();
        let index = RadiusIndex::new(points.iter().copied());
        assert_eq!(index.len(), points.len());

        let centers = [
            BOSTON,
            WORCESTER,
            GeoPoint::new(89.9, 0.0),
            GeoPoint::new(10.0, -179.9),
            GeoPoint::new(0.0, 0.0),
        ];
        for center in centers {
            for radius in [0.0, 1.0, 10.0, DEFAULT_SEARCH_RADIUS_MILES, 500.0, 5_000.0] {
                assert_eq!(
                    index.within(center, radius),
                    linear_scan(&points, center, radius),
                    "center {center:?} radius {radius}"
                );
            }
        }
    }

    #[test]
    fn unnormalized_longitude_is_still_found() {
        let index = RadiusIndex::new([(7, GeoPoint::new(BOSTON.lat, BOSTON.lng + 360.0))]);
        assert_eq!(index.within(BOSTON, 1.0), vec![7]);
    }

    #[test]
    fn negative_radius_matches_nothing() {
        let index = RadiusIndex::new([(0, BOSTON)]);
        assert!(index.within(BOSTON, -1.0).is_empty());
        assert!(!index.is_empty());
    }
}
