//! # Position Filter
//!
//! Gatekeeper between the location source and the path store. Noisy fixes are
//! routine on phones, so a rejection is a normal outcome and never an error:
//! the fix is dropped, logged at `debug`, and the path is left untouched.

use log::debug;

use crate::geo_utils::haversine_distance;
use crate::path::Path;
use crate::{PathPoint, Position};

/// Configuration for accepting raw GPS fixes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct FilterConfig {
    /// Fixes reporting a horizontal accuracy worse than this are dropped.
    /// Default: 250.0 meters
    pub max_accuracy_meters: f64,

    /// Fixes closer than this to the last accepted point count as no movement.
    /// Exact repeats of the last point are always dropped.
    /// Default: 0.0 meters
    pub min_movement_meters: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_accuracy_meters: 250.0,
            min_movement_meters: 0.0,
        }
    }
}

impl FilterConfig {
    /// Tighter profile for callers that can wait for a good fix.
    pub fn strict() -> Self {
        Self {
            max_accuracy_meters: 100.0,
            min_movement_meters: 2.0,
        }
    }
}

/// Why a fix was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum RejectReason {
    /// Coordinates are NaN, infinite, or outside WGS84 ranges
    InvalidCoordinates,
    /// Reported accuracy exceeds the configured maximum
    LowAccuracy,
    /// No movement since the last accepted point
    Duplicate,
}

/// Result of offering a fix to the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum IngestOutcome {
    Accepted { point: PathPoint },
    Rejected { reason: RejectReason },
}

impl IngestOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, IngestOutcome::Accepted { .. })
    }

    /// The appended point, if the fix was accepted.
    pub fn point(&self) -> Option<PathPoint> {
        match self {
            IngestOutcome::Accepted { point } => Some(*point),
            IngestOutcome::Rejected { .. } => None,
        }
    }
}

/// Validates raw fixes and appends the accepted ones to a [`Path`].
#[derive(Debug, Clone, Default)]
pub struct PositionFilter {
    config: FilterConfig,
}

impl PositionFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Offer a raw fix. On acceptance the point is appended to `path`.
    ///
    /// # Example
    /// ```
    /// use loop_closure::{FilterConfig, Path, Position, PositionFilter};
    ///
    /// let filter = PositionFilter::new(FilterConfig::default());
    /// let mut path = Path::new();
    ///
    /// let good = Position::new(51.5074, -0.1278, 8.0, 1_700_000_000_000);
    /// let noisy = Position::new(51.5080, -0.1290, 900.0, 1_700_000_005_000);
    ///
    /// assert!(filter.accept(&good, &mut path).is_accepted());
    /// assert!(!filter.accept(&noisy, &mut path).is_accepted());
    /// assert_eq!(path.len(), 1);
    /// ```
    pub fn accept(&self, raw: &Position, path: &mut Path) -> IngestOutcome {
        match self.check(raw, path) {
            Ok(point) => {
                path.append(point);
                IngestOutcome::Accepted { point }
            }
            Err(reason) => {
                debug!(
                    "[PositionFilter] Dropped fix ({:.6}, {:.6}) acc={:.1}m: {:?}",
                    raw.latitude, raw.longitude, raw.accuracy_meters, reason
                );
                IngestOutcome::Rejected { reason }
            }
        }
    }

    fn check(&self, raw: &Position, path: &Path) -> Result<PathPoint, RejectReason> {
        let point = raw.point();
        if !point.is_valid() {
            return Err(RejectReason::InvalidCoordinates);
        }

        // NaN accuracy compares false, so test the accepting range explicitly
        let accuracy_ok = raw.accuracy_meters >= 0.0
            && raw.accuracy_meters <= self.config.max_accuracy_meters;
        if !accuracy_ok {
            return Err(RejectReason::LowAccuracy);
        }

        if let Some(last) = path.last() {
            if *last == point || haversine_distance(last, &point) < self.config.min_movement_meters {
                return Err(RejectReason::Duplicate);
            }
        }

        Ok(point)
    }
}
