use zonecount_rs::{ClassMap, CrossingEngine, TrackedDetection, ZoneRegistry};

const LINE_CAR: &str = r#"[{"type": "Line", "points": [{"x": 0, "y": 10}, {"x": 100, "y": 10}], "classes": ["car"]}]"#;
const SQUARE_CAR: &str = r#"[{"type": "Polygon", "points": [{"x": 0, "y": 0}, {"x": 100, "y": 0}, {"x": 100, "y": 100}, {"x": 0, "y": 100}], "classes": ["car"]}]"#;

const BIKE: u32 = 1;
const CAR: u32 = 2;

fn classes() -> ClassMap {
    ClassMap::new().with(BIKE, "bike").with(CAR, "car")
}

fn engine(zones: &str) -> CrossingEngine {
    CrossingEngine::new(ZoneRegistry::from_json(zones).unwrap(), classes())
}

/// Detection whose anchor (bottom-center) is at (x, y).
fn at(track_id: u64, x: f32, y: f32, class_id: u32) -> TrackedDetection {
    TrackedDetection::new(track_id, x - 10.0, y - 30.0, x + 10.0, y, class_id)
}

#[test]
fn test_car_crossing_line_is_counted() {
    let mut engine = engine(LINE_CAR);
    engine.process_frame(0, &[at(1, 50.0, 5.0, CAR)]);
    engine.process_frame(1, &[at(1, 50.0, 15.0, CAR)]);

    assert_eq!(engine.counts().get(0, "car"), Some(1));
}

#[test]
fn test_bike_crossing_car_line_is_ignored() {
    let mut engine = engine(LINE_CAR);
    engine.process_frame(0, &[at(1, 50.0, 5.0, BIKE)]);
    let report = engine.process_frame(1, &[at(1, 50.0, 15.0, BIKE)]);

    assert!(report.credits.is_empty());
    assert_eq!(engine.counts().get(0, "car"), Some(0));
    assert_eq!(engine.counts().get(0, "bike"), None);
}

#[test]
fn test_polygon_entry_counts_once() {
    let mut engine = engine(SQUARE_CAR);
    engine.process_frame(0, &[at(1, 150.0, 50.0, CAR)]);
    let entered = engine.process_frame(1, &[at(1, 50.0, 50.0, CAR)]);
    assert_eq!(entered.credits.len(), 1);

    for frame in 2..10 {
        let report = engine.process_frame(frame, &[at(1, 50.0 + frame as f32, 50.0, CAR)]);
        assert!(report.credits.is_empty());
    }
    assert_eq!(engine.counts().get(0, "car"), Some(1));
}

#[test]
fn test_recrossing_line_does_not_count_again() {
    let mut engine = engine(LINE_CAR);
    let path = [5.0, 15.0, 5.0, 15.0, 5.0];
    for (frame, y) in path.iter().enumerate() {
        engine.process_frame(frame as u64, &[at(1, 50.0, *y, CAR)]);
    }
    assert_eq!(engine.counts().get(0, "car"), Some(1));
}

#[test]
fn test_each_track_counts_at_most_once_per_zone() {
    let mut engine = engine(LINE_CAR);
    // Three tracks zig-zagging across the line for a long time.
    for frame in 0..300u64 {
        let y = if frame % 2 == 0 { 0.0 } else { 20.0 };
        let dets: Vec<_> = (1..=3)
            .map(|id| at(id, 20.0 * id as f32, y, CAR))
            .collect();
        engine.process_frame(frame, &dets);
    }
    assert_eq!(engine.counts().get(0, "car"), Some(3));
}

#[test]
fn test_line_needs_a_crossing_trajectory() {
    let mut engine = engine(LINE_CAR);
    // Spawns right on the line and then moves along it, never crossing.
    for (frame, x) in [50.0, 55.0, 60.0, 65.0].iter().enumerate() {
        engine.process_frame(frame as u64, &[at(1, *x, 10.0, CAR)]);
    }
    // Spawns just below the line and stays there.
    for frame in 4..8u64 {
        engine.process_frame(frame, &[at(2, 50.0, 9.0, CAR)]);
    }
    assert_eq!(engine.counts().get(0, "car"), Some(0));
}

#[test]
fn test_polygon_edge_counts_as_inside() {
    let mut engine = engine(SQUARE_CAR);
    let report = engine.process_frame(0, &[at(1, 0.0, 50.0, CAR)]);
    assert_eq!(report.credits.len(), 1);
}

#[test]
fn test_majority_class_decides_the_counted_label() {
    let zones = r#"[{"type": "Line", "points": [{"x": 0, "y": 10}, {"x": 100, "y": 10}], "classes": ["car", "bike"]}]"#;
    let mut engine = engine(zones);
    // Mostly seen as a car; a single misclassification on the crossing frame.
    for frame in 0..3u64 {
        engine.process_frame(frame, &[at(1, 50.0, 5.0, CAR)]);
    }
    let report = engine.process_frame(3, &[at(1, 50.0, 15.0, BIKE)]);

    assert_eq!(report.credits[0].class.to_string(), "car");
    assert_eq!(engine.counts().get(0, "car"), Some(1));
    assert_eq!(engine.counts().get(0, "bike"), Some(0));
}

#[test]
fn test_polygon_credits_once_majority_becomes_eligible() {
    let mut engine = engine(SQUARE_CAR);
    // Two frames as a bike inside the zone: passes the test, class rejected.
    for frame in 0..2u64 {
        let report = engine.process_frame(frame, &[at(1, 50.0, 50.0, BIKE)]);
        assert!(report.credits.is_empty());
        assert_eq!(report.ineligible.len(), 1);
    }
    // Tie (2 bike, 2 car) resolves to the label seen first.
    engine.process_frame(2, &[at(1, 50.0, 50.0, CAR)]);
    let tied = engine.process_frame(3, &[at(1, 50.0, 50.0, CAR)]);
    assert!(tied.credits.is_empty());

    let report = engine.process_frame(4, &[at(1, 50.0, 50.0, CAR)]);
    assert_eq!(report.credits.len(), 1);
    assert_eq!(engine.counts().get(0, "car"), Some(1));
}

#[test]
fn test_one_movement_can_cross_two_zones() {
    let zones = r#"[
        {"type": "Line", "points": [{"x": 0, "y": 10}, {"x": 100, "y": 10}], "classes": ["car"]},
        {"type": "Line", "points": [{"x": 0, "y": 12}, {"x": 100, "y": 12}], "classes": ["car"]}
    ]"#;
    let mut engine = engine(zones);
    engine.process_frame(0, &[at(1, 50.0, 5.0, CAR)]);
    let report = engine.process_frame(1, &[at(1, 50.0, 15.0, CAR)]);

    assert_eq!(report.credits.len(), 2);
    // One highlight per detection, however many zones it was counted in.
    assert_eq!(report.overlay.highlights.len(), 1);
    assert_eq!(engine.counts().get(0, "car"), Some(1));
    assert_eq!(engine.counts().get(1, "car"), Some(1));
}

#[test]
fn test_untracked_detections_never_count() {
    let mut engine = engine(SQUARE_CAR);
    let mut det = at(1, 50.0, 50.0, CAR);
    det.track_id = None;
    let report = engine.process_frame(0, &[det]);

    assert_eq!(report.dropped, 1);
    assert_eq!(engine.counts().total(), 0);
}

#[test]
fn test_snapshot_taken_before_a_frame_is_unchanged() {
    let mut engine = engine(LINE_CAR);
    let handle = engine.handle();
    engine.process_frame(0, &[at(1, 50.0, 5.0, CAR)]);
    let before = handle.snapshot();
    engine.process_frame(1, &[at(1, 50.0, 15.0, CAR)]);

    assert_eq!(before.get(0, "car"), Some(0));
    assert_eq!(handle.snapshot().get(0, "car"), Some(1));
}
