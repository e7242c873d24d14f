//! Operation dispatcher: lookup, validation, rendering, execution and the
//! mapping of outcomes onto the caller-facing error taxonomy.

use std::{sync::Arc, time::Duration, time::Instant};

use serde_json::Value;
use tracing::{info, warn};

use crate::{
    bridge::Bridge,
    catalog::{Catalog, OperationDef, ToolDescriptor},
    classify::{self, ExecutionOutcome},
    config::Config,
    error::ToolError,
    script::ScriptPayload,
    transport::Transport,
};

#[derive(Clone)]
pub struct Dispatcher {
    catalog: Arc<Catalog>,
    bridge: Bridge,
    default_timeout: Duration,
    long_timeout: Duration,
}

impl Dispatcher {
    pub fn new(catalog: Catalog, bridge: Bridge, default_timeout: Duration) -> Self {
        Self {
            catalog: Arc::new(catalog),
            bridge,
            default_timeout,
            long_timeout: default_timeout,
        }
    }

    /// The built-in catalog behind the configured host, scratch directory and timeouts.
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let transport = Transport::new(cfg.script_host(), cfg.scratch_dir());
        Ok(Self::new(Catalog::builtin(), Bridge::new(transport), cfg.script_timeout()?)
            .with_long_timeout(cfg.long_script_timeout()?))
    }

    /// Timeout for operations flagged long-running. Never shorter than the default.
    pub fn with_long_timeout(mut self, long_timeout: Duration) -> Self {
        self.long_timeout = long_timeout.max(self.default_timeout);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.catalog.descriptors()
    }

    pub fn timeout_for(&self, op: &OperationDef) -> Duration {
        if op.long_running {
            self.long_timeout
        } else {
            self.default_timeout
        }
    }

    fn prepare(&self, name: &str, arguments: &Value) -> Result<(&OperationDef, ScriptPayload), ToolError> {
        let op = self
            .catalog
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        let validation = |source| ToolError::Validation {
            operation: op.name.to_string(),
            source,
        };
        let params = op.validate(arguments).map_err(validation)?;
        let payload = op.render(&params).map_err(validation)?;
        Ok((op, payload))
    }

    /// Validate and render without executing. Returns the payload exactly as
    /// it would be written to the scratch file, guard included.
    pub fn render(&self, name: &str, arguments: &Value) -> Result<String, ToolError> {
        let (_, payload) = self.prepare(name, arguments)?;
        Ok(classify::guard(&payload))
    }

    /// Run one operation end to end.
    pub async fn invoke(&self, name: &str, arguments: &Value) -> Result<String, ToolError> {
        let (op, payload) = self.prepare(name, arguments)?;
        let started = Instant::now();
        let outcome = self.bridge.run(payload, self.timeout_for(op)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            ExecutionOutcome::Success(text) => {
                info!(operation = op.name, elapsed_ms, "operation succeeded");
                Ok(format!("{}: {}", op.label, text))
            }
            failed => {
                warn!(operation = op.name, elapsed_ms, error = %failed, "operation failed");
                Err(ToolError::Internal {
                    operation: op.name.to_string(),
                    message: failed.to_string(),
                })
            }
        }
    }
}
