use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::counting::ClassMap;

#[derive(Debug, Error)]
pub enum ServiceConfigError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid service configuration")]
    Parse(#[from] serde_json::Error),
}

/// Settings that outlive individual sessions.
///
/// Every field is optional in JSON:
///
/// ```json
/// { "classes": {"0": "Peaton", "2": "Auto"}, "yield_between_frames": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Tracker class index to label mapping
    pub classes: ClassMap,
    /// Yield the worker thread after every frame
    pub yield_between_frames: bool,
    /// Prefix of frame-loop thread names
    pub thread_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            classes: ClassMap::default(),
            yield_between_frames: true,
            thread_name: "zone-counter".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ServiceConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ServiceConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ServiceConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }
}
