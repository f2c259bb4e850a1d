//! Frame-loop plumbing around the counting engine.
//!
//! This module defines the seams to the collaborators the counter does not
//! implement itself (video capture, the detector/tracker, the streaming
//! encoder) and the loop that drives frames through them.

mod builder;
mod cancel;
mod frame_loop;
mod replay;
mod sink;
mod source;

pub use builder::DetectionBuilder;
pub use cancel::CancellationToken;
pub use frame_loop::{FrameLoop, LoopExit, LoopSummary, PipelineError};
pub use replay::{RecordedDetection, RecordedFrame, RecordedTracker, ReplayError, ReplaySource};
pub use sink::{ChannelSink, channel_sink};
pub use source::{AnnotatedFrame, DiscardSink, FrameSink, FrameSource, ObjectTracker};
