use crate::counting::rect::Rect;
use crate::counting::track_state::TrackId;

/// One tracker output for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedDetection {
    /// Bounding box of the object
    pub bbox: Rect,
    /// Persistent id from the tracker; `None` for untracked detections
    pub track_id: Option<TrackId>,
    /// Class index as produced by the detector
    pub class_id: u32,
    /// Detection confidence score
    pub score: f32,
}

impl TrackedDetection {
    /// Tracked detection from a TLBR box (x1, y1, x2, y2).
    pub fn new(track_id: TrackId, x1: f32, y1: f32, x2: f32, y2: f32, class_id: u32) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            track_id: Some(track_id),
            class_id,
            score: 1.0,
        }
    }

    /// Create a detection from an existing box.
    pub fn from_rect(bbox: Rect, track_id: Option<TrackId>, class_id: u32, score: f32) -> Self {
        Self {
            bbox,
            track_id,
            class_id,
            score,
        }
    }
}
