//! Per-frame crossing evaluation.

use tracing::{debug, trace};

use crate::counting::class_map::{ClassLabel, ClassMap};
use crate::counting::counts::{CountsHandle, CountsTable};
use crate::counting::detection::TrackedDetection;
use crate::counting::geometry::{Point, point_in_polygon, segments_intersect};
use crate::counting::overlay::{Outline, Overlay, zone_outlines};
use crate::counting::track_state::{TrackId, TrackStore};
use crate::counting::zone::{Zone, ZoneKind, ZoneRegistry};

/// A track counted in a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub track_id: TrackId,
    pub zone: usize,
    pub class: ClassLabel,
}

/// A zone test that passed while the track's majority class was not one
/// the zone counts. The track stays eligible for later frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IneligibleCrossing {
    pub track_id: TrackId,
    pub zone: usize,
    pub class: ClassLabel,
}

/// Outcome of evaluating one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub credits: Vec<Credit>,
    pub ineligible: Vec<IneligibleCrossing>,
    /// Detections without a track id or with an unmapped class
    pub dropped: usize,
    pub overlay: Overlay,
}

/// Owns the zone registry, track store and counters of one session.
///
/// Frames must be fed in capture order: line crossings are decided from the
/// previous anchor point of each track.
#[derive(Debug)]
pub struct CrossingEngine {
    registry: ZoneRegistry,
    class_map: ClassMap,
    tracks: TrackStore,
    counts: CountsTable,
    handle: CountsHandle,
    outlines: Vec<Outline>,
}

impl CrossingEngine {
    /// Create an engine with fresh track state and all counters at zero.
    pub fn new(registry: ZoneRegistry, class_map: ClassMap) -> Self {
        let counts = CountsTable::for_registry(&registry);
        let handle = CountsHandle::new(counts.clone());
        let outlines = zone_outlines(&registry);
        Self {
            registry,
            class_map,
            tracks: TrackStore::new(),
            counts,
            handle,
            outlines,
        }
    }

    /// Evaluate every detection of a frame against every zone.
    ///
    /// Counters are published to [`CountsHandle`] readers once, after the
    /// whole frame has been evaluated.
    pub fn process_frame(
        &mut self,
        frame_index: u64,
        detections: &[TrackedDetection],
    ) -> FrameReport {
        let mut report = FrameReport {
            frame_index,
            overlay: Overlay {
                outlines: self.outlines.clone(),
                highlights: Vec::new(),
            },
            ..Default::default()
        };

        for det in detections {
            let Some(track_id) = det.track_id else {
                trace!(frame_index, "dropping untracked detection");
                report.dropped += 1;
                continue;
            };
            let Some(label) = self.class_map.label(det.class_id) else {
                trace!(frame_index, track_id, class_id = det.class_id, "dropping unmapped class");
                report.dropped += 1;
                continue;
            };

            let current = det.bbox.bottom_center();
            let previous = self.tracks.observe(track_id, current, label.clone());

            let mut highlighted = false;
            for (index, zone) in self.registry.iter() {
                if self.tracks.is_credited(track_id, index) {
                    continue;
                }
                if !zone_triggered(zone, &previous, &current) {
                    continue;
                }
                let Some(class) = self.tracks.resolve_majority_class(track_id).cloned() else {
                    continue;
                };
                if !zone.accepts(&class) {
                    trace!(frame_index, track_id, zone = index, class = %class, "class not counted by zone");
                    report.ineligible.push(IneligibleCrossing {
                        track_id,
                        zone: index,
                        class,
                    });
                    continue;
                }

                self.counts.increment(index, &class);
                self.tracks.credit(track_id, index);
                debug!(frame_index, track_id, zone = index, class = %class, "counted");
                report.credits.push(Credit {
                    track_id,
                    zone: index,
                    class,
                });
                if !highlighted {
                    report.overlay.highlights.push(det.bbox);
                    highlighted = true;
                }
            }
        }

        if !report.credits.is_empty() {
            self.handle.publish(self.counts.clone());
        }
        report
    }

    /// Zones this engine evaluates.
    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    /// Per-track state accumulated so far.
    pub fn tracks(&self) -> &TrackStore {
        &self.tracks
    }

    /// Counters including the frame currently being evaluated.
    pub fn counts(&self) -> &CountsTable {
        &self.counts
    }

    /// Live view for readers on other threads.
    pub fn handle(&self) -> CountsHandle {
        self.handle.clone()
    }
}

/// Lines need the trajectory to cross them; polygons only need the current
/// anchor point to be inside.
fn zone_triggered(zone: &Zone, previous: &Point, current: &Point) -> bool {
    let boundary = zone.boundary();
    match zone.kind() {
        ZoneKind::Line => segments_intersect(&boundary[0], &boundary[1], previous, current),
        ZoneKind::Polygon => point_in_polygon(current, boundary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(json: &str) -> CrossingEngine {
        CrossingEngine::new(ZoneRegistry::from_json(json).unwrap(), ClassMap::default())
    }

    const LINE: &str = r#"[{"type": "Line", "points": [{"x": 0, "y": 10}, {"x": 100, "y": 10}], "classes": ["Auto"]}]"#;

    /// Box whose bottom-center is (cx, bottom).
    fn det(track_id: TrackId, cx: f32, bottom: f32, class_id: u32) -> TrackedDetection {
        TrackedDetection::new(track_id, cx - 5.0, bottom - 10.0, cx + 5.0, bottom, class_id)
    }

    #[test]
    fn test_line_crossing_is_credited() {
        let mut engine = engine(LINE);
        let first = engine.process_frame(0, &[det(1, 50.0, 5.0, 2)]);
        assert!(first.credits.is_empty());

        let second = engine.process_frame(1, &[det(1, 50.0, 15.0, 2)]);
        assert_eq!(second.credits.len(), 1);
        assert_eq!(second.credits[0].zone, 0);
        assert_eq!(second.credits[0].class.as_ref(), "Auto");
        assert_eq!(second.overlay.highlights.len(), 1);
        assert_eq!(engine.counts().get(0, "Auto"), Some(1));
        assert_eq!(engine.handle().snapshot().get(0, "Auto"), Some(1));
    }

    #[test]
    fn test_drops_untracked_and_unmapped() {
        let mut engine = engine(LINE);
        let mut untracked = det(1, 50.0, 5.0, 2);
        untracked.track_id = None;
        let report = engine.process_frame(0, &[untracked, det(2, 50.0, 5.0, 4)]);
        assert_eq!(report.dropped, 2);
        assert!(engine.tracks().is_empty());
    }

    #[test]
    fn test_ineligible_class_is_reported_but_not_counted() {
        let mut engine = engine(LINE);
        engine.process_frame(0, &[det(1, 50.0, 5.0, 1)]);
        let report = engine.process_frame(1, &[det(1, 50.0, 15.0, 1)]);
        assert!(report.credits.is_empty());
        assert_eq!(report.ineligible.len(), 1);
        assert_eq!(report.ineligible[0].class.as_ref(), "Bicicleta");
        assert_eq!(engine.counts().total(), 0);
        assert!(!engine.tracks().is_credited(1, 0));
    }

    #[test]
    fn test_default_labels_match_editor_zones() {
        let mut engine = engine(
            r#"[{"name": "Zona 1", "type": "Line",
                 "points": [{"x": 0, "y": 10}, {"x": 100, "y": 10}],
                 "classes": ["Auto", "Moto", "Colectivo", "Bicicleta"]}]"#,
        );
        engine.process_frame(0, &[det(1, 50.0, 5.0, 2), det(2, 70.0, 5.0, 1)]);
        let report = engine.process_frame(1, &[det(1, 50.0, 15.0, 2), det(2, 70.0, 15.0, 1)]);

        assert_eq!(report.credits.len(), 2);
        assert!(report.ineligible.is_empty());
        assert_eq!(engine.counts().get(0, "Auto"), Some(1));
        assert_eq!(engine.counts().get(0, "Bicicleta"), Some(1));
        assert_eq!(engine.counts().get(0, "Moto"), Some(0));
    }

    #[test]
    fn test_outlines_follow_zone_kind() {
        let mut engine = engine(
            r#"[
                {"type": "Line", "points": [{"x": 0, "y": 10}, {"x": 100, "y": 10}], "classes": ["Auto"]},
                {"type": "Polygon", "points": [{"x": 0, "y": 0}, {"x": 9, "y": 0}, {"x": 9, "y": 9}], "classes": ["Auto"]}
            ]"#,
        );
        let report = engine.process_frame(0, &[]);
        let closed: Vec<bool> = report.overlay.outlines.iter().map(|o| o.closed).collect();
        assert_eq!(closed, vec![false, true]);
        assert!(report.overlay.highlights.is_empty());
    }
}
