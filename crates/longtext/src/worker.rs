//! The offloaded worker
//!
//! A single extra thread that owns no state beyond its [`Kernel`]. It says
//! `ready` once, then answers requests in arrival order until its request
//! channel closes. Progress is sent as it happens and never waited on.

use crate::{
    kernel::Kernel,
    protocol::{Action, ErrorBody, WorkerMessage, WorkerRequest},
};
use longtext_core::{types::ProgressEvent, LongtextError, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tokio::sync::mpsc;

/// Both ends of a running worker, as seen by the orchestrator
pub struct WorkerLink {
    pub requests: mpsc::UnboundedSender<WorkerRequest>,
    pub messages: mpsc::UnboundedReceiver<WorkerMessage>,
}

/// Starts workers
///
/// The default runs [`run_worker`] on a dedicated thread; tests swap in
/// workers that misbehave on purpose.
pub trait WorkerFactory: Send + Sync {
    fn spawn(&self, kernel: Kernel) -> Result<WorkerLink>;
}

/// One OS thread per worker
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadWorkerFactory;

impl WorkerFactory for ThreadWorkerFactory {
    fn spawn(&self, kernel: Kernel) -> Result<WorkerLink> {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("longtext-worker".into())
            .spawn(move || run_worker(&kernel, request_rx, &message_tx))
            .map_err(|e| LongtextError::Worker(format!("failed to start worker thread: {e}")))?;

        Ok(WorkerLink {
            requests: request_tx,
            messages: message_rx,
        })
    }
}

/// The worker loop; returns when the request channel closes or nobody listens
pub fn run_worker(
    kernel: &Kernel,
    mut requests: mpsc::UnboundedReceiver<WorkerRequest>,
    messages: &mpsc::UnboundedSender<WorkerMessage>,
) {
    if messages.send(WorkerMessage::Ready).is_err() {
        return;
    }
    log::debug!(
        "Worker ready (native: {})",
        kernel.native_name().unwrap_or("none")
    );

    while let Some(request) = requests.blocking_recv() {
        let reply = handle(kernel, request, messages);
        if messages.send(reply).is_err() {
            break;
        }
    }

    log::debug!("Worker stopped");
}

fn handle(
    kernel: &Kernel,
    WorkerRequest { id, request }: WorkerRequest,
    messages: &mpsc::UnboundedSender<WorkerMessage>,
) -> WorkerMessage {
    let started = Instant::now();
    let batch = request.action() == Action::BatchJustify;

    let mut report = |event: ProgressEvent| {
        let message = if batch {
            WorkerMessage::BatchProgress {
                id,
                progress: event.progress,
                chunk: Some(event.chunk),
                total: Some(event.total),
            }
        } else {
            WorkerMessage::Progress {
                id,
                progress: event.progress,
                chunk: Some(event.chunk),
                total: Some(event.total),
            }
        };
        let _ = messages.send(message);
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| kernel.execute(&request, &mut report)));

    let computed = match outcome {
        Ok(computed) => computed,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::warn!("Worker panicked on request {id}: {message}");
            return WorkerMessage::Error {
                id,
                error: ErrorBody { message },
            };
        }
    };

    match computed.value.to_value() {
        Ok(result) => WorkerMessage::Result {
            id,
            result,
            processing_time: started.elapsed().as_secs_f64() * 1000.0,
            accelerated: computed.accelerated,
        },
        Err(e) => WorkerMessage::Error {
            id,
            error: ErrorBody {
                message: format!("failed to encode result: {e}"),
            },
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
