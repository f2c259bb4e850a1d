//! Traits for the collaborators around the counting engine.

use crate::counting::{Overlay, TrackedDetection};

use super::CancellationToken;

/// Where frames come from: a video file, a camera, a recording.
///
/// # Example
///
/// ```ignore
/// use zonecount_rs::pipeline::FrameSource;
///
/// struct Capture { /* decoder handle */ }
///
/// impl FrameSource for Capture {
///     type Frame = Vec<u8>;
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<Self::Frame>, Self::Error> {
///         // Decode the next frame, `None` once the stream is over
///         Ok(None)
///     }
/// }
/// ```
pub trait FrameSource {
    /// Decoded frame handed to the tracker and, annotated, to the sink.
    type Frame;
    /// Error type for capture failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Next frame in capture order, or `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>, Self::Error>;
}

/// Detector plus multi-object tracker.
///
/// Implementations own whatever state re-identification needs; ids must stay
/// stable across frames for the same physical object.
pub trait ObjectTracker<F> {
    /// Error type for inference failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Detect and associate the objects of one frame.
    fn track(&mut self, frame: &F) -> Result<Vec<TrackedDetection>, Self::Error>;
}

/// A frame after evaluation, with its drawing instructions.
#[derive(Debug, Clone)]
pub struct AnnotatedFrame<F> {
    /// Zero-based position in the capture stream
    pub index: u64,
    pub frame: F,
    pub overlay: Overlay,
}

/// Consumer of annotated frames, typically an encoder feeding a stream.
pub trait FrameSink<F> {
    /// Error type for delivery failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver one frame.
    ///
    /// Returning `Ok(false)` means nobody is listening anymore and the frame
    /// loop should stop. Implementations that block must give up once
    /// `cancel` fires.
    fn send(
        &mut self,
        frame: AnnotatedFrame<F>,
        cancel: &CancellationToken,
    ) -> Result<bool, Self::Error>;
}

/// Sink that throws frames away, for runs that only want the counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl<F> FrameSink<F> for DiscardSink {
    type Error = std::convert::Infallible;

    fn send(
        &mut self,
        _frame: AnnotatedFrame<F>,
        _cancel: &CancellationToken,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}
