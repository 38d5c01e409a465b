//! Thread-safe wrapper around a [`Session`].
//!
//! A location callback and a UI thread can share one `Arc<LoopTracker>`.
//! Every call takes the session's single lock for its whole duration, so the
//! path only ever grows one point at a time and readers never observe a
//! half-applied transition.

use std::sync::{Mutex, MutexGuard};

use log::warn;

use crate::detector::ClosureResult;
use crate::filter::IngestOutcome;
use crate::session::{PolygonPayload, Session, SessionConfig, SessionError, SessionSnapshot};
use crate::{PathPoint, Position};

/// One session behind one mutex.
#[derive(Debug)]
#[cfg_attr(feature = "ffi", derive(uniffi::Object))]
pub struct LoopTracker {
    session: Mutex<Session>,
}

impl LoopTracker {
    pub fn new(session_id: impl Into<String>, config: SessionConfig) -> Self {
        Self::from_session(Session::new(session_id, config))
    }

    pub fn from_session(session: Session) -> Self {
        Self { session: Mutex::new(session) }
    }

    /// Restore a saved path and continue tracking on it.
    pub fn restore(
        session_id: impl Into<String>,
        points: Vec<PathPoint>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        Session::restore(session_id, points, config).map(Self::from_session)
    }

    pub fn ingest(&self, raw: &Position) -> Result<IngestOutcome, SessionError> {
        self.lock().ingest(raw)
    }

    pub fn poll_closure(&self) -> ClosureResult {
        self.lock().poll_closure()
    }

    /// Ingest a fix and, if it was accepted, poll for closure under the same lock.
    pub fn ingest_and_poll(&self, raw: &Position) -> Result<(IngestOutcome, ClosureResult), SessionError> {
        let mut session = self.lock();
        let outcome = session.ingest(raw)?;
        let closure = if outcome.is_accepted() {
            session.poll_closure()
        } else {
            ClosureResult::not_closed()
        };
        Ok((outcome, closure))
    }

    /// Finalize and return the hand-off payload.
    pub fn finalize(&self) -> Result<PolygonPayload, SessionError> {
        self.lock().finalize().map(|polygon| polygon.payload())
    }

    pub fn resume(&self) -> Result<(), SessionError> {
        self.lock().resume()
    }

    pub fn reset(&self) {
        self.lock().reset()
    }

    pub fn hand_off(&self) -> Result<PolygonPayload, SessionError> {
        self.lock().hand_off()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Run `f` with exclusive access to the session.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // Session methods commit state last, so a panic mid-call cannot leave
        // a partial transition behind; the poisoned value is still coherent.
        self.session.lock().unwrap_or_else(|poisoned| {
            warn!("[LoopTracker] Recovering poisoned session lock");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DetectionConfig;
    use crate::geo_utils::offset_point;
    use crate::session::SessionState;
    use std::sync::Arc;
    use std::thread;

    fn config() -> SessionConfig {
        SessionConfig {
            detection: DetectionConfig {
                closure_distance_threshold_meters: 20.0,
                ..DetectionConfig::default()
            },
            ..SessionConfig::default()
        }
    }

    fn square_fixes() -> Vec<Position> {
        let origin = PathPoint::new(0.0, 32.5825);
        (0..10)
            .map(|k| (k as f64 * 10.0, 0.0))
            .chain((0..10).map(|k| (100.0, k as f64 * 10.0)))
            .chain((0..10).map(|k| (100.0 - k as f64 * 10.0, 100.0)))
            .chain((0..10).map(|k| (0.0, 100.0 - k as f64 * 10.0)))
            .chain(std::iter::once((0.0, 5.0)))
            .enumerate()
            .map(|(t, (e, n))| {
                let p = offset_point(&origin, e, n);
                Position::new(p.latitude, p.longitude, 5.0, t as i64 * 1000)
            })
            .collect()
    }

    #[test]
    fn test_ingest_and_poll_reports_closure() {
        let tracker = LoopTracker::new("walk", config());
        let mut closed = None;
        for fix in square_fixes() {
            let (outcome, closure) = tracker.ingest_and_poll(&fix).unwrap();
            assert!(outcome.is_accepted());
            if closure.closed {
                closed = Some(closure);
                break;
            }
        }

        assert_eq!(closed.map(|c| c.closure_index), Some(0));
        let payload = tracker.finalize().unwrap();
        assert!((payload.area_sq_meters - 10_000.0).abs() < 100.0);
        assert_eq!(tracker.snapshot().state, SessionState::Finalized);
    }

    #[test]
    fn test_concurrent_producer_and_observer() {
        let tracker = Arc::new(LoopTracker::new("shared", config()));
        let fixes = square_fixes();

        let producer = {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                for fix in fixes {
                    match tracker.ingest_and_poll(&fix) {
                        Ok((_, closure)) if closure.closed => return true,
                        Ok(_) => {}
                        Err(_) => return false,
                    }
                }
                false
            })
        };

        // Observer only ever sees whole points and monotonically growing paths
        let mut last_count = 0;
        for _ in 0..200 {
            let snapshot = tracker.snapshot();
            assert!(snapshot.point_count >= last_count);
            last_count = snapshot.point_count;
            if snapshot.state == SessionState::LoopClosed {
                assert!(snapshot.closure.is_some());
            }
        }

        assert!(producer.join().unwrap());
        assert_eq!(tracker.snapshot().state, SessionState::LoopClosed);
    }

    #[test]
    fn test_reset_through_tracker() {
        let tracker = LoopTracker::new("reset", config());
        for fix in square_fixes().iter().take(5) {
            tracker.ingest(fix).unwrap();
        }
        assert_eq!(tracker.with_session(|s| s.path().len()), 5);
        tracker.reset();
        assert_eq!(tracker.snapshot().point_count, 0);
    }

    #[test]
    fn test_restore_through_tracker() {
        let points = vec![PathPoint::new(0.0, 0.0), PathPoint::new(0.0, 0.001)];
        let tracker = LoopTracker::restore("saved", points, config()).unwrap();
        assert_eq!(tracker.snapshot().point_count, 2);
        assert!(tracker.resume().is_err());
    }
}
