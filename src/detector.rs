//! # Closure Detection
//!
//! Decides whether a live, growing path has closed on itself.
//!
//! ## Algorithm
//! 1. Origin return: the newest point is back within the threshold of the
//!    first point. Closure starts at index 0.
//! 2. Self-intersection: the first pair `(i, j)` (increasing `i`, then `j`)
//!    with `j >= i + skip` whose points lie within the threshold. Closure
//!    starts at `i` and the loop runs to `j`.
//!
//! The most recent `skip` points are never paired with each other, otherwise
//! a slow or stationary walker would close a "loop" on every fix.
//!
//! All distances are haversine meters. Long paths are scanned through an
//! R-tree; both scan strategies return the same pair, including near the
//! poles and across the antimeridian.
//!
//! A resumed session passes the end of its previous loop as a floor to
//! [`check_closure_from`], so only loops ending on newer points are reported.

use log::debug;
use rstar::{RTree, RTreeObject, AABB};

use crate::geo_utils::{haversine_distance, search_half_widths};
use crate::PathPoint;

/// Widening of the R-tree search radius against float error in the
/// degree conversion.
const ENVELOPE_MARGIN: f64 = 1.05;

/// Configuration for closure detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct DetectionConfig {
    /// Maximum distance between two path points to call the path closed.
    /// Default: 50.0 meters
    pub closure_distance_threshold_meters: f64,

    /// The path must hold more than this many points before any check runs.
    /// Default: 20
    pub min_points_before_detection: u32,

    /// Minimum number of most-recent points excluded from pairing.
    /// Default: 5
    pub skip_recent_points: u32,

    /// Fraction of the path length excluded from pairing, if larger than
    /// `skip_recent_points`. Default: 0.10
    pub skip_recent_fraction: f64,

    /// Run the self-intersection scan only when the path length is a
    /// multiple of this. The origin check always runs. Default: 1
    pub self_intersection_interval: u32,

    /// Paths with at least this many points are scanned with an R-tree.
    /// Default: 500
    pub spatial_index_min_points: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            closure_distance_threshold_meters: 50.0,
            min_points_before_detection: 20,
            skip_recent_points: 5,
            skip_recent_fraction: 0.10,
            self_intersection_interval: 1,
            spatial_index_min_points: 500,
        }
    }
}

impl DetectionConfig {
    /// Number of points a partner must trail `i` by, for a path of `len` points.
    pub fn effective_skip(&self, len: usize) -> usize {
        let by_fraction = (len as f64 * self.skip_recent_fraction.max(0.0)).ceil() as usize;
        (self.skip_recent_points as usize).max(by_fraction).max(1)
    }
}

/// Which check declared the closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum ClosureMethod {
    OriginReturn,
    SelfIntersection,
}

/// Outcome of a closure check.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ClosureResult {
    pub closed: bool,
    /// Index where the loop starts (0 when not closed)
    pub closure_index: u32,
    /// Index where the walker came back (0 when not closed)
    pub loop_end_index: u32,
    /// Distance between the two matched points in meters
    pub distance_meters: f64,
    /// `max(0, 1 - distance / threshold)`; diagnostic only
    pub confidence: f64,
    pub method: Option<ClosureMethod>,
}

impl ClosureResult {
    pub fn not_closed() -> Self {
        Self {
            closed: false,
            closure_index: 0,
            loop_end_index: 0,
            distance_meters: 0.0,
            confidence: 0.0,
            method: None,
        }
    }

    fn closed(start: usize, end: usize, distance: f64, threshold: f64, method: ClosureMethod) -> Self {
        let confidence = if threshold > 0.0 {
            (1.0 - distance / threshold).max(0.0)
        } else {
            1.0
        };
        Self {
            closed: true,
            closure_index: start as u32,
            loop_end_index: end as u32,
            distance_meters: distance,
            confidence,
            method: Some(method),
        }
    }
}

/// Check whether `path` has closed into a loop.
///
/// Never fails; "not closed" is the expected answer for most calls.
///
/// # Example
/// ```
/// use loop_closure::{check_closure, geo_utils, DetectionConfig, PathPoint};
///
/// let origin = PathPoint::new(0.3476, 32.5825);
/// // 100 m square with a fix every 10 m, ending 3 m from the start
/// let mut path = Vec::new();
/// for (dx, dy) in [(10.0, 0.0), (0.0, 10.0), (-10.0, 0.0), (0.0, -10.0)] {
///     for _ in 0..10 {
///         let last = path.last().copied().unwrap_or(origin);
///         path.push(geo_utils::offset_point(&last, dx, dy));
///     }
/// }
/// path.insert(0, origin);
/// let end = path.len() - 1;
/// path[end] = geo_utils::offset_point(&origin, 3.0, 0.0);
///
/// let config = DetectionConfig {
///     closure_distance_threshold_meters: 20.0,
///     ..DetectionConfig::default()
/// };
/// let result = check_closure(&path, &config);
/// assert!(result.closed);
/// assert_eq!(result.closure_index, 0);
/// ```
pub fn check_closure(path: &[PathPoint], config: &DetectionConfig) -> ClosureResult {
    check_closure_from(path, config, 0)
}

/// Like [`check_closure`], but only loops ending at index `min_loop_end` or
/// later are reported. The origin check runs only when the newest point is at
/// or past the floor.
pub fn check_closure_from(
    path: &[PathPoint],
    config: &DetectionConfig,
    min_loop_end: usize,
) -> ClosureResult {
    let n = path.len();
    if n <= config.min_points_before_detection as usize || n < 2 || n <= min_loop_end {
        return ClosureResult::not_closed();
    }

    let threshold = config.closure_distance_threshold_meters;

    let origin_distance = haversine_distance(&path[0], &path[n - 1]);
    if origin_distance <= threshold {
        debug!("[Detector] Origin return at {} points ({:.1}m)", n, origin_distance);
        return ClosureResult::closed(0, n - 1, origin_distance, threshold, ClosureMethod::OriginReturn);
    }

    let interval = config.self_intersection_interval.max(1) as usize;
    if n % interval != 0 {
        return ClosureResult::not_closed();
    }

    let skip = config.effective_skip(n);
    let found = if n >= config.spatial_index_min_points as usize {
        scan_indexed(path, skip, min_loop_end, threshold)
    } else {
        scan_brute_force(path, skip, min_loop_end, threshold)
    };

    match found {
        Some((i, j, distance)) => {
            debug!("[Detector] Self-intersection {} -> {} ({:.1}m, skip={})", i, j, distance, skip);
            ClosureResult::closed(i, j, distance, threshold, ClosureMethod::SelfIntersection)
        }
        None => ClosureResult::not_closed(),
    }
}

// =============================================================================
// Self-Intersection Scans
// =============================================================================

/// First `(i, j, distance)` by checking every eligible pair.
fn scan_brute_force(
    points: &[PathPoint],
    skip: usize,
    min_end: usize,
    threshold: f64,
) -> Option<(usize, usize, f64)> {
    let n = points.len();
    if n <= skip || n <= min_end {
        return None;
    }

    let first_partner = |i: usize| {
        let origin = &points[i];
        let start = (i + skip).max(min_end);
        points[start..].iter().enumerate().find_map(|(offset, p)| {
            let distance = haversine_distance(origin, p);
            (distance <= threshold).then_some((i, start + offset, distance))
        })
    };

    #[cfg(feature = "parallel")]
    let found = {
        use rayon::prelude::*;
        (0..n - skip).into_par_iter().find_map_first(first_partner)
    };

    #[cfg(not(feature = "parallel"))]
    let found = (0..n - skip).find_map(first_partner);

    found
}

/// A path point with its index for R-tree queries
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    idx: usize,
    lat: f64,
    lng: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lng])
    }
}

fn build_rtree(points: &[PathPoint]) -> RTree<IndexedPoint> {
    let indexed: Vec<IndexedPoint> = points
        .iter()
        .enumerate()
        .map(|(i, p)| IndexedPoint { idx: i, lat: p.latitude, lng: p.longitude })
        .collect();
    RTree::bulk_load(indexed)
}

/// Boxes covering every point within `meters` of `origin`. A range that
/// crosses ±180° longitude is split in two; a cap over a pole spans all
/// longitudes.
fn search_envelopes(origin: &PathPoint, meters: f64) -> Vec<AABB<[f64; 2]>> {
    let (lat_half, lng_half) = search_half_widths(origin, meters);
    let min_lat = origin.latitude - lat_half;
    let max_lat = origin.latitude + lat_half;

    let lng_half = match lng_half {
        Some(half) => half,
        None => return vec![AABB::from_corners([min_lat, -180.0], [max_lat, 180.0])],
    };

    let min_lng = origin.longitude - lng_half;
    let max_lng = origin.longitude + lng_half;
    let mut envelopes = vec![AABB::from_corners(
        [min_lat, min_lng.max(-180.0)],
        [max_lat, max_lng.min(180.0)],
    )];
    if min_lng < -180.0 {
        envelopes.push(AABB::from_corners([min_lat, min_lng + 360.0], [max_lat, 180.0]));
    }
    if max_lng > 180.0 {
        envelopes.push(AABB::from_corners([min_lat, -180.0], [max_lat, max_lng - 360.0]));
    }
    envelopes
}

/// Same answer as [`scan_brute_force`], visiting only nearby candidates.
fn scan_indexed(
    points: &[PathPoint],
    skip: usize,
    min_end: usize,
    threshold: f64,
) -> Option<(usize, usize, f64)> {
    let n = points.len();
    if n <= skip || n <= min_end {
        return None;
    }

    let tree = build_rtree(points);

    (0..n - skip).find_map(|i| {
        let origin = &points[i];
        let first_partner = (i + skip).max(min_end);
        let envelopes = search_envelopes(origin, threshold * ENVELOPE_MARGIN);

        envelopes
            .iter()
            .flat_map(|envelope| tree.locate_in_envelope_intersecting(envelope))
            .filter(|candidate| candidate.idx >= first_partner)
            .filter_map(|candidate| {
                let distance = haversine_distance(origin, &points[candidate.idx]);
                (distance <= threshold).then_some((candidate.idx, distance))
            })
            .min_by_key(|(j, _)| *j)
            .map(|(j, distance)| (i, j, distance))
    })
}
