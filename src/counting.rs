mod class_map;
mod counts;
mod detection;
mod engine;
mod geometry;
mod overlay;
mod rect;
mod track_state;
mod zone;

pub use class_map::{ClassLabel, ClassMap};
pub use counts::{CountsHandle, CountsReport, CountsTable, ZoneCounts};
pub use detection::TrackedDetection;
pub use engine::{Credit, CrossingEngine, FrameReport, IneligibleCrossing};
pub use geometry::{Point, point_in_polygon, segments_intersect};
pub use overlay::{Outline, Overlay};
pub use rect::Rect;
pub use track_state::{TrackId, TrackState, TrackStore};
pub use zone::{ConfigError, Zone, ZoneKind, ZonePoint, ZoneRegistry, ZoneSpec};
