use std::path::PathBuf;

use anyhow::{Context, Result};
use fx_core::Platform;

/// What the client asks the assignments endpoint for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub platform: Platform,
    pub experiment_names: Vec<String>,
    pub anonymous_id: Option<String>,
}

/// Produces a raw assignments response body.
pub trait AssignmentsSource: Send + Sync {
    fn fetch(&self, request: &FetchRequest) -> Result<String>;
}

/// Reads the response body from a file on disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl AssignmentsSource for FileSource {
    fn fetch(&self, request: &FetchRequest) -> Result<String> {
        tracing::debug!(
            path = %self.path.display(),
            platform = %request.platform,
            experiments = ?request.experiment_names,
            anonymous_id = ?request.anonymous_id,
            "reading assignments payload"
        );
        std::fs::read_to_string(&self.path).with_context(|| format!("read {}", self.path.display()))
    }
}
