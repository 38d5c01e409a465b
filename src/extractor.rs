//! # Polygon Extraction
//!
//! Turns a detected closure into a closed [`Ring`]. Extraction is pure: the
//! path is only read, and callers decide whether to commit the ring.

use geo::{Coord, LineString, Polygon};
use thiserror::Error;

use crate::PathPoint;

/// Why a closure could not be turned into a ring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("loop bounds {start}..={end} are outside a path of {len} points")]
    ClosureIndexOutOfRange { start: usize, end: usize, len: usize },

    #[error("loop has {distinct} distinct points, at least 3 are required")]
    TooFewDistinctPoints { distinct: usize },
}

/// A closed polygon boundary: first point == last point, at least three
/// distinct vertices, so always at least four points.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<PathPoint>,
}

impl Ring {
    /// Build a ring from open vertices, appending the closing repeat.
    ///
    /// A trailing repeat of the first vertex is tolerated and not doubled.
    ///
    /// ```
    /// use loop_closure::{PathPoint, Ring};
    ///
    /// let ring = Ring::from_vertices(vec![
    ///     PathPoint::new(0.0, 0.0),
    ///     PathPoint::new(0.0, 0.001),
    ///     PathPoint::new(0.001, 0.001),
    /// ]).unwrap();
    /// assert_eq!(ring.len(), 4);
    /// assert_eq!(ring.points().first(), ring.points().last());
    /// ```
    pub fn from_vertices(mut vertices: Vec<PathPoint>) -> Result<Self, ExtractionError> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        let distinct = count_distinct(&vertices, 3);
        if distinct < 3 {
            return Err(ExtractionError::TooFewDistinctPoints { distinct });
        }

        let first = vertices[0];
        vertices.push(first);
        Ok(Self { points: vertices })
    }

    /// All points including the closing repeat.
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    /// Vertices without the closing repeat.
    pub fn vertices(&self) -> &[PathPoint] {
        &self.points[..self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Same ring, starting from vertex `k` (mod vertex count).
    pub fn rotated(&self, k: usize) -> Self {
        let mut vertices = self.vertices().to_vec();
        let len = vertices.len();
        vertices.rotate_left(k % len);
        Self::close(vertices)
    }

    /// Same ring, walked the other way round.
    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices().to_vec();
        vertices.reverse();
        Self::close(vertices)
    }

    /// Convert to a `geo` polygon with x = longitude, y = latitude.
    pub fn to_polygon(&self) -> Polygon<f64> {
        let coords: Vec<Coord> = self
            .points
            .iter()
            .map(|p| Coord { x: p.longitude, y: p.latitude })
            .collect();
        Polygon::new(LineString::new(coords), vec![])
    }

    fn close(mut vertices: Vec<PathPoint>) -> Self {
        let first = vertices[0];
        vertices.push(first);
        Self { points: vertices }
    }
}

/// Extract the loop from `closure_index` to the end of the path.
///
/// # Example
/// ```
/// use loop_closure::{extract, PathPoint};
///
/// let path = vec![
///     PathPoint::new(0.0, 0.0),
///     PathPoint::new(0.0, 0.001),
///     PathPoint::new(0.001, 0.001),
///     PathPoint::new(0.001, 0.0),
/// ];
/// let ring = extract(&path, 1).unwrap();
/// assert_eq!(ring.len(), 4);
/// assert_eq!(ring.points()[0], path[1]);
/// ```
pub fn extract(path: &[PathPoint], closure_index: usize) -> Result<Ring, ExtractionError> {
    let end = path.len().saturating_sub(1);
    extract_range(path, closure_index, end)
}

/// Extract `path[start..=end]` and close it back to `path[start]`.
pub fn extract_range(path: &[PathPoint], start: usize, end: usize) -> Result<Ring, ExtractionError> {
    if start >= end || end >= path.len() {
        return Err(ExtractionError::ClosureIndexOutOfRange { start, end, len: path.len() });
    }

    let slice = &path[start..=end];
    let distinct = count_distinct(slice, 3);
    if distinct < 3 {
        return Err(ExtractionError::TooFewDistinctPoints { distinct });
    }

    let mut points = slice.to_vec();
    points.push(path[start]);
    Ok(Ring { points })
}

/// Count distinct points, stopping early once `enough` have been seen.
fn count_distinct(points: &[PathPoint], enough: usize) -> usize {
    let mut seen: Vec<PathPoint> = Vec::with_capacity(enough);
    for p in points {
        if !seen.contains(p) {
            seen.push(*p);
            if seen.len() >= enough {
                break;
            }
        }
    }
    seen.len()
}
