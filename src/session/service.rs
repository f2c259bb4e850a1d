//! Session lifecycle: one video, one zone configuration, one set of counters.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{error, info, info_span, warn};

use crate::counting::{
    ConfigError, CountsHandle, CountsReport, CountsTable, CrossingEngine, ZoneRegistry, ZoneSpec,
};
use crate::pipeline::{
    CancellationToken, FrameLoop, FrameSink, FrameSource, LoopExit, LoopSummary, ObjectTracker,
    PipelineError,
};

use super::ServiceConfig;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn the frame loop thread")]
    Spawn(#[source] std::io::Error),
}

/// Returned by [`CountingService::start_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: u64,
    pub zones: usize,
}

/// How a session's frame loop ended.
#[derive(Debug)]
pub enum SessionOutcome {
    Finished(LoopSummary),
    Failed(PipelineError),
    /// The worker thread panicked.
    Panicked,
}

/// Returned once a session's worker has been joined.
#[derive(Debug)]
pub struct SessionSummary {
    pub id: u64,
    pub outcome: SessionOutcome,
    /// Final counts of the session
    pub counts: Arc<CountsTable>,
}

impl SessionSummary {
    /// Frames evaluated, when the loop ended without an error.
    pub fn frames(&self) -> Option<u64> {
        match &self.outcome {
            SessionOutcome::Finished(summary) => Some(summary.frames),
            _ => None,
        }
    }

    /// Why the loop stopped, when it ended without an error.
    pub fn exit(&self) -> Option<LoopExit> {
        match &self.outcome {
            SessionOutcome::Finished(summary) => Some(summary.exit),
            _ => None,
        }
    }
}

type Worker = JoinHandle<Result<LoopSummary, PipelineError>>;

struct SessionState {
    id: u64,
    registry: ZoneRegistry,
    counts: CountsHandle,
    cancel: CancellationToken,
    worker: Option<Worker>,
}

impl SessionState {
    fn join(&mut self) -> Option<SessionSummary> {
        let worker = self.worker.take()?;
        let outcome = match worker.join() {
            Ok(Ok(summary)) => {
                info!(
                    session = self.id,
                    frames = summary.frames,
                    credits = summary.credits,
                    exit = ?summary.exit,
                    "session finished"
                );
                SessionOutcome::Finished(summary)
            }
            Ok(Err(e)) => {
                error!(session = self.id, error = %e, "session failed");
                SessionOutcome::Failed(e)
            }
            Err(_) => {
                error!(session = self.id, "frame loop panicked");
                SessionOutcome::Panicked
            }
        };
        Some(SessionSummary {
            id: self.id,
            outcome,
            counts: self.counts.snapshot(),
        })
    }
}

/// Runs at most one counting session at a time and serves its counts.
///
/// Each session owns its registry, track store and counters. Starting a new
/// session stops and joins the previous worker first, so nothing from a
/// superseded session can touch the new session's state.
pub struct CountingService {
    config: ServiceConfig,
    next_id: u64,
    current: Option<SessionState>,
}

impl CountingService {
    /// Create a service with no session running.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            next_id: 1,
            current: None,
        }
    }

    /// Settings applied to every session.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Validate `zones`, stop any running session and start counting frames
    /// from `source` on a worker thread.
    ///
    /// Invalid zones are rejected before anything else happens; a running
    /// session keeps running in that case.
    pub fn start_session<S, T, K>(
        &mut self,
        zones: &[ZoneSpec],
        source: S,
        tracker: T,
        sink: K,
    ) -> Result<SessionInfo, SessionError>
    where
        S: FrameSource + Send + 'static,
        T: ObjectTracker<S::Frame> + Send + 'static,
        K: FrameSink<S::Frame> + Send + 'static,
    {
        let registry = ZoneRegistry::from_specs(zones)?;
        for (index, zone) in registry.iter() {
            for class in zone.eligible_classes() {
                if !self.config.classes.contains_label(class) {
                    warn!(zone = index, class = %class, "no tracker class maps to this label");
                }
            }
        }

        self.stop_session();

        let id = self.next_id;
        self.next_id += 1;

        let mut engine = CrossingEngine::new(registry.clone(), self.config.classes.clone());
        let counts = engine.handle();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let yield_between_frames = self.config.yield_between_frames;

        let worker = thread::Builder::new()
            .name(format!("{}-{}", self.config.thread_name, id))
            .spawn(move || {
                let _span = info_span!("session", id).entered();
                let mut frame_loop = FrameLoop::new(source, tracker, sink)
                    .yield_between_frames(yield_between_frames);
                frame_loop.run(&mut engine, &token)
                // Source, tracker and sink drop here, releasing the capture.
            })
            .map_err(SessionError::Spawn)?;

        info!(session = id, zones = registry.len(), "session started");
        let info = SessionInfo {
            id,
            zones: registry.len(),
        };
        self.current = Some(SessionState {
            id,
            registry,
            counts,
            cancel,
            worker: Some(worker),
        });
        Ok(info)
    }

    /// Cancel the running session and wait for its frame loop to exit.
    ///
    /// Returns `None` when no session is running. Counts of the stopped
    /// session stay readable until the next session starts.
    pub fn stop_session(&mut self) -> Option<SessionSummary> {
        let state = self.current.as_mut()?;
        if state.worker.is_some() {
            state.cancel.cancel();
        }
        state.join()
    }

    /// Wait for the running session to end on its own, e.g. at end of stream.
    pub fn wait(&mut self) -> Option<SessionSummary> {
        self.current.as_mut()?.join()
    }

    /// Whether a frame loop is still running.
    pub fn is_running(&self) -> bool {
        self.current
            .as_ref()
            .and_then(|s| s.worker.as_ref())
            .is_some_and(|w| !w.is_finished())
    }

    /// Id of the current (running or last stopped) session.
    pub fn session_id(&self) -> Option<u64> {
        self.current.as_ref().map(|s| s.id)
    }

    /// Latest consistent counts of the current session; empty before the
    /// first session.
    pub fn counts(&self) -> Arc<CountsTable> {
        self.current
            .as_ref()
            .map(|s| s.counts.snapshot())
            .unwrap_or_default()
    }

    /// Live view bound to the current session.
    pub fn counts_handle(&self) -> Option<CountsHandle> {
        self.current.as_ref().map(|s| s.counts.clone())
    }

    /// Current counts with zone names and kinds.
    pub fn report(&self) -> Option<CountsReport> {
        self.current
            .as_ref()
            .map(|s| CountsReport::new(&s.registry, &s.counts.snapshot()))
    }
}

impl Default for CountingService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

impl Drop for CountingService {
    fn drop(&mut self) {
        self.stop_session();
    }
}
