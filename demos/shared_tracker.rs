//! A location thread feeds a shared tracker while the main thread watches it.
//!
//! Run with: cargo run --example shared_tracker

use loop_closure::{geo_utils, DetectionConfig, LoopTracker, PathPoint, Position, SessionConfig, SessionState};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    let config = SessionConfig {
        detection: DetectionConfig {
            closure_distance_threshold_meters: 15.0,
            min_points_before_detection: 10,
            ..DetectionConfig::default()
        },
        ..SessionConfig::default()
    };
    let tracker = Arc::new(LoopTracker::new("shared-walk", config));

    // Circle of radius 60 m, one fix every 10 degrees
    let center = PathPoint::new(51.5074, -0.1278);
    let fixes: Vec<Position> = (0..=40)
        .map(|k| {
            let angle = (k as f64 * 10.0).to_radians();
            let p = geo_utils::offset_point(&center, 60.0 * angle.cos(), 60.0 * angle.sin());
            Position::new(p.latitude, p.longitude, 5.0, k as i64 * 1000)
        })
        .collect();

    let producer = {
        let tracker = Arc::clone(&tracker);
        thread::spawn(move || {
            for fix in fixes {
                match tracker.ingest_and_poll(&fix) {
                    Ok((_, closure)) if closure.closed => break,
                    Ok(_) => thread::sleep(Duration::from_millis(5)),
                    Err(e) => {
                        println!("producer stopped: {}", e);
                        break;
                    }
                }
            }
        })
    };

    loop {
        let snapshot = tracker.snapshot();
        println!(
            "[{}] {} points, {:.0} m walked",
            snapshot.state, snapshot.point_count, snapshot.path_length_meters
        );
        if snapshot.state != SessionState::Tracking || producer.is_finished() {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }

    if producer.join().is_err() {
        println!("producer panicked");
        return;
    }

    match tracker.finalize() {
        Ok(payload) => println!(
            "\nCircle: {} ring points, {:.0} m² (expected ~{:.0} m²)",
            payload.ring.len(),
            payload.area_sq_meters,
            std::f64::consts::PI * 60.0 * 60.0
        ),
        Err(e) => println!("\nNot finalized: {}", e),
    }
}
