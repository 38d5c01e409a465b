//! # Tracking Sessions
//!
//! One continuous tracking attempt, from the first fix to finalize or reset.
//!
//! ```text
//!            poll_closure            finalize
//! Tracking ───────────────▶ LoopClosed ────────▶ Finalized
//!    ▲                          │                    │
//!    └──────── resume ──────────┘                    │
//!    ▲                                               │
//!    └──────────── reset (any state) / hand_off ─────┘
//! ```
//!
//! Every mutation is computed first and committed last, so a failed
//! `finalize` leaves the session exactly as it was.

use log::{debug, info, warn};
use thiserror::Error;

use crate::area::{AreaCalculator, AreaMethod};
use crate::detector::{check_closure_from, ClosureResult, DetectionConfig};
use crate::extractor::{extract_range, ExtractionError, Ring};
use crate::filter::{FilterConfig, IngestOutcome, PositionFilter};
use crate::geo_utils;
use crate::path::Path;
use crate::{Bounds, PathPoint, Position};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum SessionState {
    Tracking,
    LoopClosed,
    Finalized,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Tracking => "tracking",
            SessionState::LoopClosed => "loop closed",
            SessionState::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

/// Everything a session needs, supplied when tracking starts.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SessionConfig {
    pub filter: FilterConfig,
    pub detection: DetectionConfig,
    /// Default: planar shoelace
    pub area_method: AreaMethod,
    /// Finalize refuses polygons smaller than this. Default: 0.0 (accept all)
    pub min_area_sq_meters: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error), uniffi(flat_error))]
pub enum SessionError {
    #[error("cannot {operation} while {state}")]
    InvalidState { operation: &'static str, state: SessionState },

    #[error("session is not closed (state: {state})")]
    NotClosed { state: SessionState },

    #[error("polygon extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("polygon area {area:.1} m² is below the minimum of {minimum:.1} m²")]
    AreaBelowMinimum { area: f64, minimum: f64 },

    #[error("restored point {index} has invalid coordinates")]
    InvalidPoint { index: usize },
}

/// A committed polygon with its derived measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedPolygon {
    pub ring: Ring,
    pub area_sq_meters: f64,
    pub perimeter_meters: f64,
    pub bounds: Bounds,
    pub center: PathPoint,
    /// The closure this polygon was cut from
    pub closure: ClosureResult,
}

impl FinalizedPolygon {
    fn new(ring: Ring, area_sq_meters: f64, closure: ClosureResult) -> Self {
        let perimeter_meters = geo_utils::polyline_length(ring.points());
        let bounds = geo_utils::compute_bounds(ring.points());
        let center = geo_utils::compute_center(ring.vertices());
        Self { ring, area_sq_meters, perimeter_meters, bounds, center, closure }
    }

    /// Hand-off form for the persistence pipeline.
    pub fn payload(&self) -> PolygonPayload {
        PolygonPayload {
            ring: self.ring.points().to_vec(),
            area_sq_meters: self.area_sq_meters,
            perimeter_meters: self.perimeter_meters,
            bounds: self.bounds,
            center: self.center,
        }
    }
}

/// What leaves the engine: a closed ring of `{lat, lon}` pairs and its area.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolygonPayload {
    pub ring: Vec<PathPoint>,
    pub area_sq_meters: f64,
    pub perimeter_meters: f64,
    pub bounds: Bounds,
    pub center: PathPoint,
}

#[cfg(feature = "json")]
impl PolygonPayload {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Read-only view of a session for observers (UI, diagnostics).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: SessionState,
    pub point_count: u32,
    pub rejected_count: u32,
    pub path_length_meters: f64,
    pub last_point: Option<PathPoint>,
    pub closure: Option<ClosureResult>,
    pub polygon: Option<PolygonPayload>,
}

/// A single tracking attempt.
///
/// # Example
/// ```
/// use loop_closure::{geo_utils, DetectionConfig, PathPoint, Position, Session, SessionConfig, SessionState};
///
/// let config = SessionConfig {
///     detection: DetectionConfig {
///         closure_distance_threshold_meters: 20.0,
///         ..DetectionConfig::default()
///     },
///     ..SessionConfig::default()
/// };
/// let mut session = Session::new("walk-1", config);
///
/// // Walk a 100 m square, one fix every 10 m
/// let origin = PathPoint::new(0.0, 32.5825);
/// let corners = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0), (0.0, 0.0)];
/// let mut t = 0;
/// for leg in corners.windows(2) {
///     let ((x0, y0), (x1, y1)) = (leg[0], leg[1]);
///     for k in 0..10 {
///         let f = k as f64 / 10.0;
///         let p = geo_utils::offset_point(&origin, x0 + (x1 - x0) * f, y0 + (y1 - y0) * f);
///         session.ingest(&Position::new(p.latitude, p.longitude, 5.0, t)).unwrap();
///         t += 1000;
///         if session.poll_closure().closed {
///             break;
///         }
///     }
/// }
///
/// assert_eq!(session.state(), SessionState::LoopClosed);
/// let polygon = session.finalize().unwrap();
/// assert!((polygon.area_sq_meters - 10_000.0).abs() < 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    state: SessionState,
    path: Path,
    filter: PositionFilter,
    config: SessionConfig,
    closure: Option<ClosureResult>,
    polygon: Option<FinalizedPolygon>,
    rejected_count: u32,
    /// Loops must end at or after this index; raised by `resume`
    min_loop_end: usize,
}

impl Session {
    /// Start tracking with an empty path.
    pub fn new(id: impl Into<String>, config: SessionConfig) -> Self {
        let id = id.into();
        debug!("[Session {}] Created", id);
        Self {
            id,
            state: SessionState::Tracking,
            path: Path::new(),
            filter: PositionFilter::new(config.filter.clone()),
            config,
            closure: None,
            polygon: None,
            rejected_count: 0,
            min_loop_end: 0,
        }
    }

    /// Continue tracking on top of a previously saved path.
    ///
    /// Saved points were already filtered once, so only coordinate validity
    /// is checked here.
    pub fn restore(
        id: impl Into<String>,
        points: Vec<PathPoint>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        if let Some(index) = points.iter().position(|p| !p.is_valid()) {
            return Err(SessionError::InvalidPoint { index });
        }

        let mut session = Self::new(id, config);
        for point in points {
            session.path.append(point);
        }
        info!("[Session {}] Restored {} saved points", session.id, session.path.len());
        Ok(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The detected closure, while `LoopClosed` or `Finalized`.
    pub fn closure(&self) -> Option<&ClosureResult> {
        self.closure.as_ref()
    }

    /// The committed polygon, while `Finalized`.
    pub fn polygon(&self) -> Option<&FinalizedPolygon> {
        self.polygon.as_ref()
    }

    /// Fixes dropped by the filter since the session started or was reset.
    pub fn rejected_count(&self) -> u32 {
        self.rejected_count
    }

    /// Offer a raw fix. Only `Tracking` sessions take new points.
    pub fn ingest(&mut self, raw: &Position) -> Result<IngestOutcome, SessionError> {
        self.require(SessionState::Tracking, "ingest")?;

        let outcome = self.filter.accept(raw, &mut self.path);
        if !outcome.is_accepted() {
            self.rejected_count = self.rejected_count.saturating_add(1);
        }
        Ok(outcome)
    }

    /// Run closure detection over the current path.
    ///
    /// While tracking, a detected closure moves the session to `LoopClosed`.
    /// Afterwards the stored closure is returned unchanged.
    pub fn poll_closure(&mut self) -> ClosureResult {
        if self.state != SessionState::Tracking {
            return self.closure.clone().unwrap_or_else(ClosureResult::not_closed);
        }

        let result =
            check_closure_from(self.path.points(), &self.config.detection, self.min_loop_end);
        if result.closed {
            info!(
                "[Session {}] Loop closed {} -> {} via {:?} ({:.1}m, confidence {:.2})",
                self.id,
                result.closure_index,
                result.loop_end_index,
                result.method,
                result.distance_meters,
                result.confidence
            );
            self.closure = Some(result.clone());
            self.state = SessionState::LoopClosed;
        }
        result
    }

    /// Extract the ring and compute its area with the configured method.
    pub fn finalize(&mut self) -> Result<&FinalizedPolygon, SessionError> {
        let calculator = self.config.area_method.calculator();
        self.finalize_with(calculator)
    }

    /// Like [`finalize`](Self::finalize) with a caller-supplied area algorithm.
    ///
    /// On error the session stays `LoopClosed`; the caller may `resume` to
    /// collect more points or `reset`.
    pub fn finalize_with(
        &mut self,
        calculator: &dyn AreaCalculator,
    ) -> Result<&FinalizedPolygon, SessionError> {
        let closure = match (&self.state, &self.closure) {
            (SessionState::LoopClosed, Some(closure)) => closure.clone(),
            _ => return Err(SessionError::NotClosed { state: self.state }),
        };

        let ring = extract_range(
            self.path.points(),
            closure.closure_index as usize,
            closure.loop_end_index as usize,
        )
        .map_err(|e| {
            warn!("[Session {}] Extraction failed: {}", self.id, e);
            e
        })?;

        let area = calculator.area(&ring);
        let minimum = self.config.min_area_sq_meters;
        if minimum > 0.0 && area < minimum {
            warn!("[Session {}] Polygon too small: {:.1} m² < {:.1} m²", self.id, area, minimum);
            return Err(SessionError::AreaBelowMinimum { area, minimum });
        }

        let polygon = FinalizedPolygon::new(ring, area, closure);
        info!(
            "[Session {}] Finalized: {} points, {:.1} m², {:.0}m perimeter",
            self.id,
            polygon.ring.len(),
            polygon.area_sq_meters,
            polygon.perimeter_meters
        );

        self.state = SessionState::Finalized;
        Ok(self.polygon.insert(polygon))
    }

    /// Keep walking after a closure without finalizing it.
    ///
    /// The collected path is kept; the closure is discarded. Later polls only
    /// report loops that end on points added after the discarded one.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::LoopClosed, "resume")?;
        if let Some(closure) = self.closure.take() {
            self.min_loop_end = self.min_loop_end.max(closure.loop_end_index as usize + 1);
        }
        self.polygon = None;
        self.state = SessionState::Tracking;
        debug!(
            "[Session {}] Resumed tracking at {} points (loops end at {} or later)",
            self.id,
            self.path.len(),
            self.min_loop_end
        );
        Ok(())
    }

    /// Discard everything and start over with an empty path.
    pub fn reset(&mut self) {
        info!("[Session {}] Reset from {} ({} points)", self.id, self.state, self.path.len());
        self.path.clear();
        self.closure = None;
        self.polygon = None;
        self.rejected_count = 0;
        self.min_loop_end = 0;
        self.state = SessionState::Tracking;
    }

    /// Release the finalized polygon to persistence and reset the session.
    pub fn hand_off(&mut self) -> Result<PolygonPayload, SessionError> {
        self.require(SessionState::Finalized, "hand off")?;
        let payload = match &self.polygon {
            Some(polygon) => polygon.payload(),
            None => return Err(SessionError::NotClosed { state: self.state }),
        };
        self.reset();
        Ok(payload)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            state: self.state,
            point_count: self.path.len() as u32,
            rejected_count: self.rejected_count,
            path_length_meters: self.path.length_meters(),
            last_point: self.path.last().copied(),
            closure: self.closure.clone(),
            polygon: self.polygon.as_ref().map(FinalizedPolygon::payload),
        }
    }

    fn require(&self, expected: SessionState, operation: &'static str) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState { operation, state: self.state })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::PlanarShoelace;
    use crate::filter::RejectReason;
    use crate::geo_utils::offset_point;

    fn origin() -> PathPoint {
        PathPoint::new(0.0, 32.5825)
    }

    fn fix_at(east: f64, north: f64, t: i64) -> Position {
        let p = offset_point(&origin(), east, north);
        Position::new(p.latitude, p.longitude, 5.0, t)
    }

    fn square_config() -> SessionConfig {
        SessionConfig {
            detection: DetectionConfig {
                closure_distance_threshold_meters: 20.0,
                ..DetectionConfig::default()
            },
            ..SessionConfig::default()
        }
    }

    /// 100 m square, one fix every 10 m, ending 5 m from the start.
    fn square_fixes() -> Vec<Position> {
        (0..10)
            .map(|k| (k as f64 * 10.0, 0.0))
            .chain((0..10).map(|k| (100.0, k as f64 * 10.0)))
            .chain((0..10).map(|k| (100.0 - k as f64 * 10.0, 100.0)))
            .chain((0..10).map(|k| (0.0, 100.0 - k as f64 * 10.0)))
            .chain(std::iter::once((0.0, 5.0)))
            .enumerate()
            .map(|(t, (e, n))| fix_at(e, n, t as i64 * 1000))
            .collect()
    }

    fn crossing_config() -> SessionConfig {
        SessionConfig {
            detection: DetectionConfig {
                closure_distance_threshold_meters: 15.0,
                min_points_before_detection: 5,
                skip_recent_points: 3,
                skip_recent_fraction: 0.0,
                ..DetectionConfig::default()
            },
            ..SessionConfig::default()
        }
    }

    /// Out along a street, around a block, and back across index 2 at index 9.
    fn crossing_fixes() -> Vec<Position> {
        [
            (0.0, 0.0),
            (30.0, 0.0),
            (60.0, 0.0),
            (90.0, 0.0),
            (90.0, 30.0),
            (90.0, 60.0),
            (60.0, 60.0),
            (30.0, 60.0),
            (40.0, 30.0),
            (62.0, 5.0),
        ]
        .iter()
        .enumerate()
        .map(|(t, &(e, n))| fix_at(e, n, t as i64))
        .collect()
    }

    /// Ingest and poll until the loop closes.
    fn walk_until_closed(session: &mut Session, fixes: &[Position]) -> ClosureResult {
        for fix in fixes {
            session.ingest(fix).unwrap();
            let result = session.poll_closure();
            if result.closed {
                return result;
            }
        }
        ClosureResult::not_closed()
    }

    fn closed_square_session() -> Session {
        let mut session = Session::new("square", square_config());
        walk_until_closed(&mut session, &square_fixes());
        session
    }

    #[test]
    fn test_square_walk_closes_and_finalizes() {
        let mut session = Session::new("square", square_config());
        let result = walk_until_closed(&mut session, &square_fixes());

        assert!(result.closed);
        assert_eq!(result.closure_index, 0);
        assert_eq!(session.state(), SessionState::LoopClosed);

        let polygon = session.finalize().unwrap();
        assert!((polygon.area_sq_meters - 10_000.0).abs() < 100.0, "area = {}", polygon.area_sq_meters);
        assert!(polygon.ring.len() >= 4);
        assert_eq!(polygon.ring.points().first(), polygon.ring.points().last());
        assert!((polygon.perimeter_meters - 400.0).abs() < 1.0);
        assert_eq!(session.state(), SessionState::Finalized);
    }

    #[test]
    fn test_crossing_walk_closes_at_crossing() {
        let mut session = Session::new("crossing", crossing_config());
        let result = walk_until_closed(&mut session, &crossing_fixes());
        assert_eq!(result.closure_index, 2);
        assert_eq!(result.loop_end_index, 9);

        let crossing = session.path().points()[2];
        let polygon = session.finalize().unwrap();
        assert_eq!(polygon.ring.points()[0], crossing);
        assert_eq!(polygon.ring.len(), 9);
        assert!(polygon.area_sq_meters > 0.0);
    }

    #[test]
    fn test_finalize_while_tracking_is_an_error() {
        let mut session = Session::new("early", SessionConfig::default());
        session.ingest(&fix_at(0.0, 0.0, 0)).unwrap();
        assert_eq!(
            session.finalize().unwrap_err(),
            SessionError::NotClosed { state: SessionState::Tracking }
        );
        assert_eq!(session.state(), SessionState::Tracking);
        assert!(session.polygon().is_none());
    }

    #[test]
    fn test_only_tracking_sessions_ingest() {
        let mut session = closed_square_session();
        let before = session.path().len();
        let err = session.ingest(&fix_at(50.0, 50.0, 99_000)).unwrap_err();
        assert!(matches!(err, SessionError::InvalidState { state: SessionState::LoopClosed, .. }));
        assert_eq!(session.path().len(), before);
    }

    #[test]
    fn test_low_accuracy_fix_does_not_grow_path() {
        let mut session = Session::new("noisy", SessionConfig::default());
        session.ingest(&fix_at(0.0, 0.0, 0)).unwrap();

        let p = offset_point(&origin(), 10.0, 0.0);
        let noisy = Position::new(p.latitude, p.longitude, 400.0, 1000);
        let outcome = session.ingest(&noisy).unwrap();

        assert_eq!(outcome, IngestOutcome::Rejected { reason: RejectReason::LowAccuracy });
        assert_eq!(session.path().len(), 1);
        assert_eq!(session.rejected_count(), 1);
    }

    #[test]
    fn test_reset_finalized_session() {
        let mut session = closed_square_session();
        session.finalize().unwrap();

        session.reset();
        assert_eq!(session.state(), SessionState::Tracking);
        assert!(session.path().is_empty());
        assert!(session.closure().is_none());
        assert!(session.polygon().is_none());
        assert!(!session.poll_closure().closed);
    }

    #[test]
    fn test_resume_keeps_path_and_clears_closure() {
        let mut session = closed_square_session();
        let collected = session.path().len();

        session.resume().unwrap();
        assert_eq!(session.state(), SessionState::Tracking);
        assert_eq!(session.path().len(), collected);
        assert!(session.closure().is_none());

        // New points go on top of the existing history
        session.ingest(&fix_at(-10.0, 0.0, 100_000)).unwrap();
        assert_eq!(session.path().len(), collected + 1);
    }

    #[test]
    fn test_resume_does_not_report_the_same_loop_again() {
        let mut session = Session::new("crossing", crossing_config());
        let first = walk_until_closed(&mut session, &crossing_fixes());
        assert_eq!((first.closure_index, first.loop_end_index), (2, 9));

        session.resume().unwrap();
        session.ingest(&fix_at(62.0, 705.0, 10)).unwrap();
        assert!(!session.poll_closure().closed);
        assert_eq!(session.state(), SessionState::Tracking);

        // Walking back beside index 5 closes a new loop
        session.ingest(&fix_at(88.0, 58.0, 11)).unwrap();
        let second = session.poll_closure();
        assert!(second.closed);
        assert_eq!((second.closure_index, second.loop_end_index), (5, 11));

        let polygon = session.finalize().unwrap();
        assert_eq!(polygon.ring.len(), 8);
        assert_eq!(polygon.closure, second);
    }

    #[test]
    fn test_reset_clears_the_resume_floor() {
        let mut session = Session::new("crossing", crossing_config());
        let fixes = crossing_fixes();
        walk_until_closed(&mut session, &fixes);
        session.resume().unwrap();
        session.reset();

        let again = walk_until_closed(&mut session, &fixes);
        assert_eq!((again.closure_index, again.loop_end_index), (2, 9));
    }

    #[test]
    fn test_resume_only_from_loop_closed() {
        let mut session = Session::new("idle", SessionConfig::default());
        assert!(session.resume().is_err());

        let mut finalized = closed_square_session();
        finalized.finalize().unwrap();
        assert!(matches!(
            finalized.resume(),
            Err(SessionError::InvalidState { state: SessionState::Finalized, .. })
        ));
    }

    #[test]
    fn test_poll_after_close_returns_stored_closure() {
        let mut session = closed_square_session();
        let stored = session.closure().cloned().unwrap();
        assert_eq!(session.poll_closure(), stored);
        session.finalize().unwrap();
        assert_eq!(session.poll_closure(), stored);
    }

    #[test]
    fn test_extraction_failure_stays_loop_closed() {
        // Walker never leaves a two-point shuffle but the origin check fires
        let a = origin();
        let b = offset_point(&a, 1.0, 0.0);
        let points: Vec<PathPoint> = (0..25).map(|k| if k % 2 == 0 { a } else { b }).collect();
        let mut session = Session::restore("shuffle", points, SessionConfig::default()).unwrap();

        assert!(session.poll_closure().closed);
        let err = session.finalize().unwrap_err();
        assert!(matches!(err, SessionError::Extraction(ExtractionError::TooFewDistinctPoints { .. })));
        assert_eq!(session.state(), SessionState::LoopClosed);
        assert!(session.polygon().is_none());
    }

    #[test]
    fn test_minimum_area_rejects_small_polygon() {
        let config = SessionConfig { min_area_sq_meters: 50_000.0, ..square_config() };
        let mut session = Session::new("small", config);
        walk_until_closed(&mut session, &square_fixes());

        let err = session.finalize().unwrap_err();
        assert!(matches!(err, SessionError::AreaBelowMinimum { .. }));
        assert_eq!(session.state(), SessionState::LoopClosed);
    }

    #[test]
    fn test_finalize_with_custom_calculator() {
        let mut session = closed_square_session();
        let area = session.finalize_with(&PlanarShoelace).unwrap().area_sq_meters;
        assert!(area > 9_000.0);
    }

    #[test]
    fn test_spherical_area_method() {
        let config = SessionConfig { area_method: AreaMethod::Spherical, ..square_config() };
        let mut session = Session::new("spherical", config);
        walk_until_closed(&mut session, &square_fixes());
        let polygon = session.finalize().unwrap();
        assert!((polygon.area_sq_meters - 10_000.0).abs() < 100.0);
    }

    #[test]
    fn test_hand_off_returns_payload_and_resets() {
        let mut session = closed_square_session();
        assert!(session.hand_off().is_err());

        let area = session.finalize().unwrap().area_sq_meters;
        let payload = session.hand_off().unwrap();

        assert_eq!(payload.area_sq_meters, area);
        assert_eq!(payload.ring.first(), payload.ring.last());
        assert_eq!(session.state(), SessionState::Tracking);
        assert!(session.path().is_empty());
    }

    #[test]
    fn test_restore_rejects_invalid_points() {
        let points = vec![origin(), PathPoint::new(f64::NAN, 0.0)];
        assert_eq!(
            Session::restore("bad", points, SessionConfig::default()).unwrap_err(),
            SessionError::InvalidPoint { index: 1 }
        );
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut session = closed_square_session();
        session.finalize().unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.session_id, "square");
        assert_eq!(snapshot.state, SessionState::Finalized);
        assert_eq!(snapshot.point_count as usize, session.path().len());
        assert!(snapshot.closure.is_some());
        assert!(snapshot.polygon.is_some());
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_payload_json_uses_lat_lon_keys() {
        let mut session = closed_square_session();
        session.finalize().unwrap();
        let json = session.polygon().unwrap().payload().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let first = &value["ring"][0];
        assert!(first["lat"].is_number());
        assert!(first["lon"].is_number());
        assert!(value["area_sq_meters"].as_f64().unwrap() > 0.0);
    }
}
