//! Scoped transport: scratch script file, one host call, guaranteed cleanup.

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{classify, error::TransportError, script::ScriptPayload};

pub mod host;

pub use host::{CommandHost, OsascriptHost};

/// Runs a script file inside the target application and returns its text result.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// Short program name for diagnostics.
    fn program(&self) -> &str;

    async fn run(&self, script: &Path, timeout: Duration) -> Result<String, TransportError>;
}

/// A guarded payload on disk. The file is removed when this value goes away,
/// whether through [`ScratchScript::remove`], an early return, or cancellation.
#[derive(Debug)]
pub struct ScratchScript {
    file: NamedTempFile,
}

impl ScratchScript {
    pub fn create(dir: &Path, source: &str) -> Result<Self, TransportError> {
        let scratch = |source| TransportError::Scratch {
            dir: dir.to_path_buf(),
            source,
        };
        std::fs::create_dir_all(dir).map_err(scratch)?;
        let mut file = tempfile::Builder::new()
            .prefix("indesign-mcp-")
            .suffix(".jsx")
            .tempfile_in(dir)
            .map_err(scratch)?;
        file.write_all(source.as_bytes()).map_err(scratch)?;
        file.flush().map_err(scratch)?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now, reporting failure instead of swallowing it in `Drop`.
    pub fn remove(self) -> std::io::Result<()> {
        self.file.close()
    }
}

/// Executes payloads through a [`ScriptHost`], one scratch file per call.
#[derive(Clone)]
pub struct Transport {
    host: Arc<dyn ScriptHost>,
    scratch_dir: PathBuf,
}

impl Transport {
    pub fn new(host: Arc<dyn ScriptHost>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            host,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Guard, write, run, delete. The raw host text is returned unclassified.
    pub async fn execute(
        &self,
        payload: &ScriptPayload,
        timeout: Duration,
    ) -> Result<String, TransportError> {
        let source = classify::guard(payload);
        let script = ScratchScript::create(&self.scratch_dir, &source)?;
        debug!(path = %script.path().display(), bytes = source.len(), "wrote scratch script");

        let result = self.host.run(script.path(), timeout).await;

        let path = script.path().to_path_buf();
        match script.remove() {
            Ok(()) => debug!(path = %path.display(), "removed scratch script"),
            Err(err) => warn!(path = %path.display(), error = %err, "failed to remove scratch script"),
        }
        if let Err(err) = &result {
            warn!(program = self.host.program(), error = %err, "host call failed");
        }
        result
    }
}
