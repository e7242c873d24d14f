//! Single-slot execution queue in front of the transport.
//!
//! InDesign has one active document and no request queue of its own, so every
//! execution holds the slot from scratch-file creation through cleanup.

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    classify::{self, ExecutionOutcome},
    script::ScriptPayload,
    transport::Transport,
};

#[derive(Clone)]
pub struct Bridge {
    transport: Transport,
    slot: Arc<Mutex<()>>,
}

impl Bridge {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            slot: Arc::new(Mutex::new(())),
        }
    }

    /// Run one payload and classify what came back. Concurrent callers wait their turn.
    pub async fn run(&self, payload: ScriptPayload, timeout: Duration) -> ExecutionOutcome {
        let _slot = self.slot.lock().await;
        debug!(timeout_secs = timeout.as_secs_f64(), "execution slot acquired");
        classify::classify(self.transport.execute(&payload, timeout).await)
    }
}
