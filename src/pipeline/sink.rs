use std::time::Duration;

use crossbeam_channel::{Receiver, SendTimeoutError, Sender};

use super::{AnnotatedFrame, CancellationToken, FrameSink};

/// How long a blocked send waits before re-checking cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(20);

/// Hands annotated frames to another thread over a bounded channel.
///
/// When the channel is full the frame loop waits for the consumer, so a slow
/// encoder throttles processing instead of frames piling up.
#[derive(Debug, Clone)]
pub struct ChannelSink<F> {
    tx: Sender<AnnotatedFrame<F>>,
}

/// Create a sink and the receiver the streaming side reads from.
pub fn channel_sink<F>(capacity: usize) -> (ChannelSink<F>, Receiver<AnnotatedFrame<F>>) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (ChannelSink { tx }, rx)
}

impl<F> FrameSink<F> for ChannelSink<F> {
    type Error = std::convert::Infallible;

    fn send(
        &mut self,
        mut frame: AnnotatedFrame<F>,
        cancel: &CancellationToken,
    ) -> Result<bool, Self::Error> {
        loop {
            match self.tx.send_timeout(frame, CANCEL_POLL) {
                Ok(()) => return Ok(true),
                Err(SendTimeoutError::Disconnected(_)) => return Ok(false),
                Err(SendTimeoutError::Timeout(returned)) => {
                    if cancel.is_cancelled() {
                        // The frame is dropped; the loop stops right after.
                        return Ok(true);
                    }
                    frame = returned;
                }
            }
        }
    }
}
