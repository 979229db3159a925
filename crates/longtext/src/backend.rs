//! The execution tiers behind one interface
//!
//! Callers hand a [`Request`] to whichever [`JustifyBackend`] the
//! orchestrator currently routes to; both tiers compute through the same
//! [`Kernel`], so identical requests produce identical text either way.

use crate::{
    kernel::{Computed, Kernel},
    native::NativeContext,
    pending::{PendingTable, ProgressCallback},
    protocol::{Output, Request, WorkerRequest},
};
use async_trait::async_trait;
use longtext_core::{types::TierKind, LongtextError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[async_trait]
pub trait JustifyBackend: Send + Sync {
    fn tier(&self) -> TierKind;

    /// Run `request` to its terminal result
    async fn execute(
        &self,
        request: Request,
        progress: Option<ProgressCallback>,
    ) -> Result<Computed<Output>>;
}

/// Sends requests to the worker and waits for the correlated answer
pub struct OffloadedBackend {
    requests: mpsc::UnboundedSender<WorkerRequest>,
    pending: Arc<PendingTable>,
    timeout: Duration,
}

impl OffloadedBackend {
    pub fn new(
        requests: mpsc::UnboundedSender<WorkerRequest>,
        pending: Arc<PendingTable>,
        timeout: Duration,
    ) -> Self {
        Self {
            requests,
            pending,
            timeout,
        }
    }
}

#[async_trait]
impl JustifyBackend for OffloadedBackend {
    fn tier(&self) -> TierKind {
        TierKind::Offloaded
    }

    async fn execute(
        &self,
        request: Request,
        progress: Option<ProgressCallback>,
    ) -> Result<Computed<Output>> {
        let id = self.pending.next_id();
        let action = request.action();
        let reply = self.pending.register(id, progress);
        // Covers send failure, timeout and a caller that stops waiting
        let _entry = self.pending.guard(id);

        if self.requests.send(WorkerRequest { id, request }).is_err() {
            return Err(LongtextError::WorkerUnavailable);
        }
        log::debug!("Dispatched request {id} ({action})");

        let completion = match tokio::time::timeout(self.timeout, reply).await {
            Ok(Ok(reply)) => reply?,
            // Entry dropped without an answer: the worker side is gone
            Ok(Err(_)) => return Err(LongtextError::WorkerUnavailable),
            Err(_) => {
                log::warn!("Request {id} ({action}) timed out after {:?}", self.timeout);
                return Err(LongtextError::Timeout {
                    id,
                    after: self.timeout,
                });
            }
        };

        log::debug!(
            "Request {id} ({action}) finished in {:.2}ms",
            completion.processing_time
        );
        let value = Output::from_value(action, completion.result)
            .map_err(|message| LongtextError::Protocol { id, message })?;

        Ok(Computed {
            value,
            accelerated: completion.accelerated,
        })
    }
}

/// Computes in the caller's own task
pub struct FallbackBackend {
    native: Arc<NativeContext>,
}

impl FallbackBackend {
    pub fn new(native: Arc<NativeContext>) -> Self {
        Self { native }
    }
}

#[async_trait]
impl JustifyBackend for FallbackBackend {
    fn tier(&self) -> TierKind {
        TierKind::Fallback
    }

    async fn execute(
        &self,
        request: Request,
        progress: Option<ProgressCallback>,
    ) -> Result<Computed<Output>> {
        let kernel = Kernel::new(self.native.get().await);
        let computed = match progress {
            Some(callback) => kernel.execute(&request, &mut |event| callback(event)),
            None => kernel.execute(&request, &mut |_| {}),
        };
        Ok(computed)
    }
}
