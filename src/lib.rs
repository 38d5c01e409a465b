//! # Loop Closure
//!
//! Loop-closure detection and polygon extraction for live GPS walks.
//!
//! A walker's phone streams fixes into a [`Session`]. The session filters
//! noisy fixes, grows an append-only path, detects when the path closes on
//! itself, cuts out the enclosed ring and measures its area. The finished
//! [`PolygonPayload`] is handed to whatever persists it.
//!
//! This library provides:
//! - Accuracy and duplicate filtering of raw fixes ([`PositionFilter`])
//! - Closure detection by origin return or self-intersection ([`check_closure`])
//! - Ring extraction ([`extract`]) and area calculation ([`AreaCalculator`])
//! - A session state machine ([`Session`]) and a thread-safe wrapper ([`LoopTracker`])
//!
//! ## Features
//!
//! - **`parallel`** - Parallel self-intersection scan with rayon
//! - **`json`** - JSON serialization of the hand-off payload
//! - **`ffi`** - FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use loop_closure::{Position, Session, SessionConfig, SessionState};
//!
//! let mut session = Session::new("morning-walk", SessionConfig::default());
//!
//! // Called once per fix from the location source
//! let fix = Position::new(51.5074, -0.1278, 6.0, 1_700_000_000_000);
//! session.ingest(&fix).unwrap();
//!
//! // Called after each accepted fix
//! let closure = session.poll_closure();
//! if closure.closed {
//!     let polygon = session.finalize().unwrap();
//!     println!("Enclosed {:.0} m²", polygon.area_sq_meters);
//! }
//! assert_eq!(session.state(), SessionState::Tracking);
//! ```

pub mod area;
pub mod detector;
pub mod extractor;
pub mod filter;
pub mod geo_utils;
pub mod path;
pub mod session;
pub mod tracker;

pub use area::{AreaCalculator, AreaMethod, PlanarShoelace, SphericalExcess};
pub use detector::{
    check_closure, check_closure_from, ClosureMethod, ClosureResult, DetectionConfig,
};
pub use extractor::{extract, extract_range, ExtractionError, Ring};
pub use filter::{FilterConfig, IngestOutcome, PositionFilter, RejectReason};
pub use path::Path;
pub use session::{
    FinalizedPolygon, PolygonPayload, Session, SessionConfig, SessionError, SessionSnapshot,
    SessionState,
};
pub use tracker::LoopTracker;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("LoopClosureRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// An accepted point on a walked path.
///
/// # Example
/// ```
/// use loop_closure::PathPoint;
/// let point = PathPoint::new(51.5074, -0.1278); // London
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathPoint {
    #[cfg_attr(feature = "serde", serde(rename = "lat"))]
    pub latitude: f64,
    #[cfg_attr(feature = "serde", serde(rename = "lon"))]
    pub longitude: f64,
}

impl PathPoint {
    /// Create a new path point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A raw fix from the location source.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius reported by the receiver
    pub accuracy_meters: f64,
    /// Unix epoch milliseconds
    pub timestamp_ms: i64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, accuracy_meters: f64, timestamp_ms: i64) -> Self {
        Self { latitude, longitude, accuracy_meters, timestamp_ms }
    }

    /// The coordinates alone, as they would be stored on a path.
    pub fn point(&self) -> PathPoint {
        PathPoint::new(self.latitude, self.longitude)
    }
}

/// Bounding box of a ring or path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points; `None` if there are none.
    pub fn from_points(points: &[PathPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(geo_utils::compute_bounds(points))
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> PathPoint {
        PathPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

// ============================================================================
// FFI Exports (only when "ffi" feature is enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::info;
    use std::sync::Arc;

    #[uniffi::export]
    impl LoopTracker {
        /// Start a new tracking session.
        #[uniffi::constructor]
        pub fn create(session_id: String, config: SessionConfig) -> Arc<Self> {
            init_logging();
            info!("[LoopClosureRust] Tracker created for session {}", session_id);
            Arc::new(LoopTracker::new(session_id, config))
        }

        /// Continue a session from a previously saved path.
        #[uniffi::constructor]
        pub fn create_restored(
            session_id: String,
            points: Vec<PathPoint>,
            config: SessionConfig,
        ) -> Result<Arc<Self>, SessionError> {
            init_logging();
            info!("[LoopClosureRust] Restoring session {} with {} points", session_id, points.len());
            LoopTracker::restore(session_id, points, config).map(Arc::new)
        }

        pub fn ffi_ingest(&self, position: Position) -> Result<IngestOutcome, SessionError> {
            self.ingest(&position)
        }

        /// Ingest a fix and report closure in one call (one lock).
        pub fn ffi_ingest_and_poll(&self, position: Position) -> Result<ClosureResult, SessionError> {
            self.ingest_and_poll(&position).map(|(_, closure)| closure)
        }

        pub fn ffi_poll_closure(&self) -> ClosureResult {
            self.poll_closure()
        }

        pub fn ffi_finalize(&self) -> Result<PolygonPayload, SessionError> {
            let payload = self.finalize()?;
            info!(
                "[LoopClosureRust] Finalized polygon: {} points, {:.1} m²",
                payload.ring.len(),
                payload.area_sq_meters
            );
            Ok(payload)
        }

        pub fn ffi_resume(&self) -> Result<(), SessionError> {
            self.resume()
        }

        pub fn ffi_reset(&self) {
            self.reset()
        }

        pub fn ffi_hand_off(&self) -> Result<PolygonPayload, SessionError> {
            self.hand_off()
        }

        pub fn ffi_snapshot(&self) -> SessionSnapshot {
            self.snapshot()
        }
    }

    /// Get default session configuration.
    #[uniffi::export]
    pub fn default_session_config() -> SessionConfig {
        init_logging();
        SessionConfig::default()
    }

    /// Stricter filtering for callers that can wait for a good fix.
    #[uniffi::export]
    pub fn strict_filter_config() -> FilterConfig {
        FilterConfig::strict()
    }
}

// ============================================================================
// Tests
// ============================================================================
