use crate::counting::geometry::Point;
use crate::counting::rect::Rect;
use crate::counting::zone::{ZoneKind, ZoneRegistry};

/// Stroke of one zone boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub zone: usize,
    pub points: Vec<Point>,
    /// Polygons are stroked closed, lines open.
    pub closed: bool,
}

/// Drawing instructions for one frame.
///
/// The counter does not touch pixels; whoever encodes the frame draws these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub outlines: Vec<Outline>,
    /// Boxes of detections that were counted on this frame.
    pub highlights: Vec<Rect>,
}

pub(crate) fn zone_outlines(registry: &ZoneRegistry) -> Vec<Outline> {
    registry
        .iter()
        .map(|(zone, z)| Outline {
            zone,
            points: z.boundary().to_vec(),
            closed: z.kind() == ZoneKind::Polygon,
        })
        .collect()
}
