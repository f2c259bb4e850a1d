//! Replay of recorded tracker output.
//!
//! A recording is JSON lines, one frame per line:
//!
//! ```text
//! {"frame": 0, "detections": [{"track_id": 3, "bbox": [410.0, 220.0, 470.0, 300.0], "class_id": 2, "score": 0.91}]}
//! ```
//!
//! `track_id` may be omitted or `null` for untracked detections, `score`
//! defaults to 1.0 and `frame` is informational.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::counting::{Rect, TrackId, TrackedDetection};

use super::{FrameSource, ObjectTracker};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read recording")]
    Io(#[from] io::Error),
    #[error("line {line}: malformed frame record")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

fn default_score() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedDetection {
    #[serde(default)]
    pub track_id: Option<TrackId>,
    /// TLBR: x1, y1, x2, y2
    pub bbox: [f32; 4],
    pub class_id: u32,
    #[serde(default = "default_score")]
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u64>,
    #[serde(default)]
    pub detections: Vec<RecordedDetection>,
}

/// Frame source reading a JSON-lines recording.
pub struct ReplaySource<R> {
    lines: io::Lines<R>,
    line: usize,
}

impl<R: BufRead> ReplaySource<R> {
    /// Read frames from `reader`, one JSON object per line.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl ReplaySource<BufReader<File>> {
    /// Open a recording file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> FrameSource for ReplaySource<R> {
    type Frame = RecordedFrame;
    type Error = ReplayError;

    fn next_frame(&mut self) -> Result<Option<Self::Frame>, Self::Error> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line += 1;
            if line.trim().is_empty() {
                continue;
            }
            let frame = serde_json::from_str(&line).map_err(|source| ReplayError::Parse {
                line: self.line,
                source,
            })?;
            return Ok(Some(frame));
        }
        Ok(None)
    }
}

/// Tracker stand-in that returns the detections stored in the recording.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedTracker;

impl ObjectTracker<RecordedFrame> for RecordedTracker {
    type Error = std::convert::Infallible;

    fn track(&mut self, frame: &RecordedFrame) -> Result<Vec<TrackedDetection>, Self::Error> {
        Ok(frame
            .detections
            .iter()
            .map(|d| {
                let [x1, y1, x2, y2] = d.bbox;
                TrackedDetection::from_rect(
                    Rect::from_tlbr(x1, y1, x2, y2),
                    d.track_id,
                    d.class_id,
                    d.score,
                )
            })
            .collect())
    }
}
