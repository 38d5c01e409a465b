//! Walk a block with noisy fixes and finalize the enclosed polygon.
//!
//! Run with: cargo run --example walk_square

use loop_closure::{
    geo_utils, AreaMethod, DetectionConfig, IngestOutcome, PathPoint, Position, Session,
    SessionConfig,
};

fn main() {
    let origin = PathPoint::new(0.3476, 32.5825); // Kampala

    let config = SessionConfig {
        detection: DetectionConfig {
            closure_distance_threshold_meters: 20.0,
            ..DetectionConfig::default()
        },
        ..SessionConfig::default()
    };
    let mut session = Session::new("block-walk", config.clone());

    println!("Loop Closure Example\n");
    println!(
        "Config: threshold={}m, min_points={}, max_accuracy={}m\n",
        config.detection.closure_distance_threshold_meters,
        config.detection.min_points_before_detection,
        config.filter.max_accuracy_meters
    );

    // 100 m square, a fix every 10 m; every 7th fix is a bad reading
    let corners = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0), (0.0, 0.0)];
    let mut t: i64 = 1_700_000_000_000;
    let mut fix_count = 0;

    'walk: for leg in corners.windows(2) {
        let ((x0, y0), (x1, y1)) = (leg[0], leg[1]);
        for k in 0..10 {
            let f = k as f64 / 10.0;
            let p = geo_utils::offset_point(&origin, x0 + (x1 - x0) * f, y0 + (y1 - y0) * f);
            fix_count += 1;
            let accuracy = if fix_count % 7 == 0 { 400.0 } else { 6.0 };
            t += 3000;

            match session.ingest(&Position::new(p.latitude, p.longitude, accuracy, t)) {
                Ok(IngestOutcome::Accepted { .. }) => {}
                Ok(IngestOutcome::Rejected { reason }) => {
                    println!("  fix {:>2}: dropped ({:?})", fix_count, reason);
                    continue;
                }
                Err(e) => {
                    println!("  fix {:>2}: {}", fix_count, e);
                    break 'walk;
                }
            }

            let closure = session.poll_closure();
            if closure.closed {
                println!(
                    "\nLoop closed after {} fixes: index {} -> {} ({:?}, {:.1}m, confidence {:.2})",
                    fix_count,
                    closure.closure_index,
                    closure.loop_end_index,
                    closure.method,
                    closure.distance_meters,
                    closure.confidence
                );
                break 'walk;
            }
        }
    }

    let planar = match session.finalize() {
        Ok(polygon) => polygon.clone(),
        Err(e) => {
            println!("Could not finalize: {}", e);
            return;
        }
    };

    println!("\nPolygon:");
    println!("  points:    {}", planar.ring.len());
    println!("  area:      {:.0} m² (planar)", planar.area_sq_meters);
    println!("  perimeter: {:.0} m", planar.perimeter_meters);
    println!("  center:    ({:.6}, {:.6})", planar.center.latitude, planar.center.longitude);

    let spherical = AreaMethod::Spherical.calculator().area(&planar.ring);
    println!("  area:      {:.0} m² (spherical)", spherical);

    match session.hand_off() {
        Ok(payload) => println!("\nHanded off {} ring points; session is {}", payload.ring.len(), session.state()),
        Err(e) => println!("\nHand-off failed: {}", e),
    }
}
