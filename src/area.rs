//! # Area Calculation
//!
//! Area of a closed [`Ring`] in square meters, behind the [`AreaCalculator`]
//! trait so the default approximation can be swapped without touching
//! detection or extraction.
//!
//! ## Planar shoelace (default)
//!
//! Shoelace formula over `(longitude, latitude)` degrees, scaled by
//! [`METERS_PER_DEGREE`] squared. Exact at the equator for city-block sized
//! polygons. Away from the equator longitude degrees shrink by `cos(lat)`,
//! so the result overestimates by `1 / cos(lat)`; large polygons add
//! curvature error on top. Use [`SphericalExcess`] where that matters.
//!
//! ## Spherical
//!
//! Chamberlain–Duquette spherical polygon area from `geo`, valid at any
//! latitude.

use geo::{Area, ChamberlainDuquetteArea, Coord, LineString, Polygon};

use crate::extractor::Ring;
use crate::PathPoint;

/// Meters per degree of arc at the equator.
pub const METERS_PER_DEGREE: f64 = 111_319.9;

/// Areas below this are treated as collapsed (collinear or repeated points).
pub const DEGENERATE_AREA_SQ_METERS: f64 = 1e-6;

/// Computes the enclosed area of a ring in square meters.
///
/// Implementations must return a non-negative value that does not depend on
/// the starting vertex or winding direction.
pub trait AreaCalculator: Send + Sync {
    fn area(&self, ring: &Ring) -> f64;
}

/// Shoelace over raw degrees with a fixed equatorial scale factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarShoelace;

impl AreaCalculator for PlanarShoelace {
    fn area(&self, ring: &Ring) -> f64 {
        planar_area(ring.points())
    }
}

/// Spherical polygon area on the WGS84 equatorial radius.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalExcess;

impl AreaCalculator for SphericalExcess {
    fn area(&self, ring: &Ring) -> f64 {
        collapse_degenerate(ring.to_polygon().chamberlain_duquette_unsigned_area())
    }
}

/// Area algorithm selection for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum AreaMethod {
    #[default]
    Planar,
    Spherical,
}

impl AreaMethod {
    pub fn calculator(&self) -> &'static dyn AreaCalculator {
        match self {
            AreaMethod::Planar => &PlanarShoelace,
            AreaMethod::Spherical => &SphericalExcess,
        }
    }
}

/// Planar shoelace area of any point sequence, closed implicitly.
///
/// Fewer than three points, or points that enclose nothing, give 0.
///
/// ```
/// use loop_closure::{area::planar_area, PathPoint};
///
/// // 0.001° x 0.001° cell on the equator ≈ 111 m x 111 m
/// let cell = [
///     PathPoint::new(0.0, 0.0),
///     PathPoint::new(0.0, 0.001),
///     PathPoint::new(0.001, 0.001),
///     PathPoint::new(0.001, 0.0),
/// ];
/// let area = planar_area(&cell);
/// assert!((area - 12_392.1).abs() < 1.0);
/// ```
pub fn planar_area(points: &[PathPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let coords: Vec<Coord> = points
        .iter()
        .map(|p| Coord { x: p.longitude, y: p.latitude })
        .collect();
    let polygon = Polygon::new(LineString::new(coords), vec![]);

    collapse_degenerate(polygon.unsigned_area() * METERS_PER_DEGREE * METERS_PER_DEGREE)
}

fn collapse_degenerate(area: f64) -> f64 {
    if area.is_finite() && area >= DEGENERATE_AREA_SQ_METERS {
        area
    } else {
        0.0
    }
}
