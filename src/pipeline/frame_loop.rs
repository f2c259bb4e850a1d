//! Sequential capture → track → count → sink loop.

use thiserror::Error;
use tracing::{debug, trace};

use crate::counting::CrossingEngine;

use super::{AnnotatedFrame, CancellationToken, FrameSink, FrameSource, ObjectTracker};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A collaborator of the frame loop failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("frame source failed at frame {frame}")]
    Source {
        frame: u64,
        #[source]
        source: BoxError,
    },
    #[error("tracker failed at frame {frame}")]
    Tracker {
        frame: u64,
        #[source]
        source: BoxError,
    },
    #[error("frame sink failed at frame {frame}")]
    Sink {
        frame: u64,
        #[source]
        source: BoxError,
    },
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The source ran out of frames.
    Exhausted,
    /// The cancellation token fired.
    Cancelled,
    /// The sink reported that nobody consumes frames anymore.
    SinkClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    /// Frames fully evaluated
    pub frames: u64,
    /// Credits granted over the run
    pub credits: u64,
    pub exit: LoopExit,
}

/// Drives frames from a source through a tracker and the counting engine.
///
/// Frames are evaluated one at a time in capture order. Cancellation is
/// checked before each frame is pulled, never in the middle of evaluating one.
pub struct FrameLoop<S, T, K> {
    source: S,
    tracker: T,
    sink: K,
    yield_between_frames: bool,
}

impl<S, T, K> FrameLoop<S, T, K>
where
    S: FrameSource,
    T: ObjectTracker<S::Frame>,
    K: FrameSink<S::Frame>,
{
    /// Create a loop over the given collaborators.
    pub fn new(source: S, tracker: T, sink: K) -> Self {
        Self {
            source,
            tracker,
            sink,
            yield_between_frames: true,
        }
    }

    /// Let other threads run between frames (on by default).
    pub fn yield_between_frames(mut self, enabled: bool) -> Self {
        self.yield_between_frames = enabled;
        self
    }

    /// Run until the source is exhausted, the sink closes, `cancel` fires or
    /// a collaborator fails.
    pub fn run(
        &mut self,
        engine: &mut CrossingEngine,
        cancel: &CancellationToken,
    ) -> Result<LoopSummary, PipelineError> {
        let mut frames = 0u64;
        let mut credits = 0u64;
        let summary = |frames, credits, exit| LoopSummary {
            frames,
            credits,
            exit,
        };

        loop {
            if cancel.is_cancelled() {
                debug!(frames, "frame loop cancelled");
                return Ok(summary(frames, credits, LoopExit::Cancelled));
            }

            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    debug!(frames, "frame source exhausted");
                    return Ok(summary(frames, credits, LoopExit::Exhausted));
                }
                Err(e) => {
                    return Err(PipelineError::Source {
                        frame: frames,
                        source: Box::new(e),
                    });
                }
            };

            let detections = self
                .tracker
                .track(&frame)
                .map_err(|e| PipelineError::Tracker {
                    frame: frames,
                    source: Box::new(e),
                })?;

            let report = engine.process_frame(frames, &detections);
            trace!(
                frame = frames,
                detections = detections.len(),
                credits = report.credits.len(),
                "frame evaluated"
            );
            credits += report.credits.len() as u64;

            let annotated = AnnotatedFrame {
                index: frames,
                frame,
                overlay: report.overlay,
            };
            frames += 1;

            let delivered = self
                .sink
                .send(annotated, cancel)
                .map_err(|e| PipelineError::Sink {
                    frame: frames - 1,
                    source: Box::new(e),
                })?;
            if !delivered {
                debug!(frames, "frame sink closed");
                return Ok(summary(frames, credits, LoopExit::SinkClosed));
            }

            if self.yield_between_frames {
                std::thread::yield_now();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counting::{ClassMap, TrackedDetection, ZoneRegistry};
    use crate::pipeline::DiscardSink;
    use std::collections::VecDeque;

    /// Yields canned per-frame detections; the frame is its own detections.
    struct MockSource {
        frames: VecDeque<Vec<TrackedDetection>>,
    }

    impl FrameSource for MockSource {
        type Frame = Vec<TrackedDetection>;
        type Error = std::io::Error;

        fn next_frame(&mut self) -> Result<Option<Self::Frame>, Self::Error> {
            Ok(self.frames.pop_front())
        }
    }

    struct PassThrough;

    impl ObjectTracker<Vec<TrackedDetection>> for PassThrough {
        type Error = std::convert::Infallible;

        fn track(
            &mut self,
            frame: &Vec<TrackedDetection>,
        ) -> Result<Vec<TrackedDetection>, Self::Error> {
            Ok(frame.clone())
        }
    }

    struct FailingTracker;

    impl ObjectTracker<Vec<TrackedDetection>> for FailingTracker {
        type Error = std::io::Error;

        fn track(
            &mut self,
            _frame: &Vec<TrackedDetection>,
        ) -> Result<Vec<TrackedDetection>, Self::Error> {
            Err(std::io::Error::other("model unavailable"))
        }
    }

    fn engine() -> CrossingEngine {
        let registry = ZoneRegistry::from_json(
            r#"[{"type": "Line", "points": [{"x": 0, "y": 10}, {"x": 100, "y": 10}], "classes": ["Auto"]}]"#,
        )
        .unwrap();
        CrossingEngine::new(registry, ClassMap::default())
    }

    fn source() -> MockSource {
        MockSource {
            frames: VecDeque::from(vec![
                vec![TrackedDetection::new(1, 45.0, 0.0, 55.0, 5.0, 2)],
                vec![TrackedDetection::new(1, 45.0, 10.0, 55.0, 15.0, 2)],
                vec![TrackedDetection::new(1, 45.0, 15.0, 55.0, 20.0, 2)],
            ]),
        }
    }

    #[test]
    fn test_runs_until_exhausted() {
        let mut engine = engine();
        let mut frame_loop = FrameLoop::new(source(), PassThrough, DiscardSink);
        let summary = frame_loop
            .run(&mut engine, &CancellationToken::new())
            .unwrap();

        assert_eq!(summary.exit, LoopExit::Exhausted);
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.credits, 1);
        assert_eq!(engine.counts().get(0, "Auto"), Some(1));
    }

    #[test]
    fn test_cancelled_before_first_frame() {
        let mut engine = engine();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let summary = FrameLoop::new(source(), PassThrough, DiscardSink)
            .run(&mut engine, &cancel)
            .unwrap();

        assert_eq!(summary.exit, LoopExit::Cancelled);
        assert_eq!(summary.frames, 0);
        assert!(engine.tracks().is_empty());
    }

    #[test]
    fn test_tracker_error_names_frame() {
        let mut engine = engine();
        let err = FrameLoop::new(source(), FailingTracker, DiscardSink)
            .run(&mut engine, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Tracker { frame: 0, .. }));
    }
}
