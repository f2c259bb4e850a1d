//! Counts tracked objects crossing user-defined lines and entering polygons.
//!
//! An external detector/tracker reports, per frame, a box, a persistent
//! track id and a class index for every object. [`CrossingEngine`] turns
//! those into per-zone, per-class counts, crediting every track at most once
//! per zone and classifying it by the majority of the labels it was seen with.
//! [`CountingService`] runs the engine over a video on a worker thread and
//! serves consistent snapshots of the counts.

pub mod counting;
pub mod pipeline;
pub mod session;

pub use counting::{
    ClassMap, ConfigError, CountsHandle, CountsReport, CountsTable, CrossingEngine, FrameReport,
    Rect, TrackedDetection, ZoneKind, ZoneRegistry, ZoneSpec,
};
pub use pipeline::{
    CancellationToken, DetectionBuilder, FrameLoop, FrameSink, FrameSource, ObjectTracker,
};
pub use session::{CountingService, ServiceConfig, SessionError};
