//! # Geographic Utilities
//!
//! Distance and extent helpers shared by the filter, detector and session.
//!
//! All thresholds in this crate are expressed in meters, so every proximity
//! decision goes through [`haversine_distance`]. Degree-based comparisons are
//! only used to size R-tree search envelopes, and those are always widened
//! and re-checked with haversine.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two path points |
//! | [`polyline_length`] | Total length of a walked path or ring in meters |
//! | [`search_half_widths`] | Degree extent of a search radius around a point |
//! | [`compute_bounds`] | Bounding box of a point sequence |
//! | [`compute_center`] | Arithmetic centre of a point sequence |
//! | [`offset_point`] | Move a point by east/north offsets in meters |
//!
//! ## Example
//!
//! ```rust
//! use loop_closure::{PathPoint, geo_utils};
//!
//! let start = PathPoint::new(0.3476, 32.5825);
//! let north = geo_utils::offset_point(&start, 0.0, 100.0);
//!
//! let dist = geo_utils::haversine_distance(&start, &north);
//! assert!((dist - 100.0).abs() < 0.01);
//! ```

use geo::{Point, Haversine, Distance};
use crate::{PathPoint, Bounds};

/// Mean Earth radius used by `geo`'s haversine implementation (meters).
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two path points using the Haversine formula.
///
/// Returns the distance in meters along a spherical Earth.
///
/// # Example
///
/// ```rust
/// use loop_closure::{PathPoint, geo_utils};
///
/// let london = PathPoint::new(51.5074, -0.1278);
/// let paris = PathPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &PathPoint, p2: &PathPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Total length of a point sequence in meters.
///
/// Empty or single-point sequences return 0.0.
pub fn polyline_length(points: &[PathPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Half-widths in degrees `(latitude, longitude)` of a box covering every
/// point within `meters` of `center`.
///
/// The longitude half-width is the exact extent of the spherical cap,
/// `asin(sin δ / cos φ)`, so it widens towards the poles without bound. It is
/// `None` when the cap reaches a pole; every longitude is then in range.
pub fn search_half_widths(center: &PathPoint, meters: f64) -> (f64, Option<f64>) {
    let angular = meters.max(0.0) / MEAN_EARTH_RADIUS;
    let lat_half = angular.to_degrees();

    let ratio = angular.sin() / center.latitude.to_radians().cos();
    if angular >= std::f64::consts::FRAC_PI_2 || !(0.0..1.0).contains(&ratio) {
        return (lat_half, None);
    }
    (lat_half, Some(ratio.asin().to_degrees()))
}

/// Return the point `east_m` meters east and `north_m` meters north of `origin`.
///
/// Local equirectangular approximation on the same sphere as
/// [`haversine_distance`]; accurate to centimetres at walking scale.
pub fn offset_point(origin: &PathPoint, east_m: f64, north_m: f64) -> PathPoint {
    let meters_per_degree = MEAN_EARTH_RADIUS.to_radians();
    let latitude = origin.latitude + north_m / meters_per_degree;
    let mid_lat = ((origin.latitude + latitude) / 2.0).to_radians();
    let longitude = origin.longitude + east_m / (meters_per_degree * mid_lat.cos());
    PathPoint::new(latitude, longitude)
}

// =============================================================================
// Extent Functions
// =============================================================================

/// Compute the bounding box of a point sequence.
///
/// For empty input the result has MIN/MAX sentinels (an inverted box); use
/// [`Bounds::from_points`] when the input may be empty.
///
/// ```rust
/// use loop_closure::{PathPoint, geo_utils};
///
/// let points = vec![
///     PathPoint::new(51.5000, -0.1300),
///     PathPoint::new(51.5100, -0.1200),
///     PathPoint::new(51.5050, -0.1250),
/// ];
///
/// let bounds = geo_utils::compute_bounds(&points);
/// assert_eq!(bounds.min_lat, 51.5000);
/// assert_eq!(bounds.max_lng, -0.1200);
/// ```
pub fn compute_bounds(points: &[PathPoint]) -> Bounds {
    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Bounds { min_lat, max_lat, min_lng, max_lng }
}

/// Arithmetic mean of all latitudes and longitudes.
///
/// Suitable for walk-sized polygons; not meaningful across the antimeridian.
/// Returns (0, 0) for empty input.
pub fn compute_center(points: &[PathPoint]) -> PathPoint {
    if points.is_empty() {
        return PathPoint::new(0.0, 0.0);
    }

    let sum_lat: f64 = points.iter().map(|p| p.latitude).sum();
    let sum_lng: f64 = points.iter().map(|p| p.longitude).sum();
    let n = points.len() as f64;

    PathPoint::new(sum_lat / n, sum_lng / n)
}
