//! Append-only store of accepted path points for one session.

use crate::geo_utils;
use crate::PathPoint;

/// The walked path of a single session, in temporal order.
///
/// Points can only be appended (by the position filter or a session restore)
/// and the whole path can only be cleared by a session reset. Readers get a
/// slice view; nothing outside the crate can reorder or edit points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    points: Vec<PathPoint>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// All accepted points, oldest first.
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PathPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PathPoint> {
        self.points.last()
    }

    /// Walked distance in meters.
    pub fn length_meters(&self) -> f64 {
        geo_utils::polyline_length(&self.points)
    }

    pub(crate) fn append(&mut self, point: PathPoint) {
        self.points.push(point);
    }

    pub(crate) fn clear(&mut self) {
        self.points.clear();
    }
}
