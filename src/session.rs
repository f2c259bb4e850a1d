mod config;
mod service;

pub use config::{ServiceConfig, ServiceConfigError};
pub use service::{CountingService, SessionError, SessionInfo, SessionOutcome, SessionSummary};
