//! The request orchestrator
//!
//! Owns the backend state machine and decides, per request, which tier runs
//! it. Construction starts the worker in the background; requests arriving
//! before it reports in wait (up to the init timeout) and then go wherever
//! the state settled.
//!
//! Failure containment:
//!
//! - Validation errors are returned before anything is dispatched.
//! - A worker that disappears latches the orchestrator into `Fallback`, and
//!   requests that were in flight are recomputed there.
//! - A malformed result fails only its own request, and also latches
//!   `Fallback`: a worker that speaks the protocol wrong is not trusted again.
//! - A timeout fails its own request; the worker stays in service.

use crate::{
    backend::{FallbackBackend, JustifyBackend, OffloadedBackend},
    config::OrchestratorConfig,
    kernel::{Computed, Kernel},
    native::{NativeContext, NativeLoader},
    pending::{Completion, PendingTable, ProgressCallback},
    protocol::{BatchResult, Output, Request, Response, WorkerMessage},
    state::StateMachine,
    worker::{ThreadWorkerFactory, WorkerFactory},
};
use longtext_core::{
    types::{JustifyResult, ProgressEvent, TextStats, TierKind},
    BackendState, LongtextError, Result, LINE_SEPARATOR,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Routes requests to the offloaded worker or the synchronous fallback
///
/// Cheap to clone; clones share the same worker and state.
///
/// ```ignore
/// use longtext::Orchestrator;
///
/// let orchestrator = Orchestrator::builder().build()?;
/// let result = orchestrator.justify("这是一个测试文本", 10).await?;
/// assert_eq!(result.lines, ["这是一个测", "试文本"]);
/// ```
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    config: OrchestratorConfig,
    /// When the worker must have reported ready
    init_deadline: Instant,
    state: Arc<StateMachine>,
    native: Arc<NativeContext>,
    pending: Arc<PendingTable>,
    offloaded: Mutex<Option<Arc<OffloadedBackend>>>,
    fallback: FallbackBackend,
}

/// Configure an [`Orchestrator`] before starting it
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    native: Option<NativeLoader>,
    worker: Option<Arc<dyn WorkerFactory>>,
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            config: OrchestratorConfig::default(),
            native: None,
            worker: None,
        }
    }

    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Shortcut for toggling `config.offload`
    pub fn offload(mut self, enabled: bool) -> Self {
        self.config.offload = enabled;
        self
    }

    /// Where the native module comes from (default: the built-in one)
    pub fn native_loader(mut self, loader: NativeLoader) -> Self {
        self.native = Some(loader);
        self
    }

    /// Who starts the worker (default: a dedicated thread)
    pub fn worker_factory(mut self, factory: Arc<dyn WorkerFactory>) -> Self {
        self.worker = Some(factory);
        self
    }

    /// Start the orchestrator
    ///
    /// The worker is brought up by a background task, so offloading needs a
    /// running tokio runtime; built outside one, the orchestrator starts in
    /// `Fallback`.
    pub fn build(self) -> Result<Orchestrator> {
        self.config.validate()?;

        let loader = match self.native {
            Some(loader) => loader,
            None if self.config.native => NativeLoader::Builtin,
            None => NativeLoader::Disabled,
        };
        let native = Arc::new(NativeContext::new(loader));

        let inner = Arc::new(Inner {
            state: Arc::new(StateMachine::new()),
            pending: Arc::new(PendingTable::new()),
            offloaded: Mutex::new(None),
            fallback: FallbackBackend::new(native.clone()),
            native,
            init_deadline: Instant::now() + self.config.init_timeout,
            config: self.config,
        });

        if !inner.config.offload {
            log::info!("Offloading disabled, serving requests synchronously");
            inner.state.transition(BackendState::Fallback);
            return Ok(Orchestrator { inner });
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::warn!("No tokio runtime to host the worker, serving requests synchronously");
            inner.state.transition(BackendState::Fallback);
            return Ok(Orchestrator { inner });
        };
        let factory = self
            .worker
            .unwrap_or_else(|| Arc::new(ThreadWorkerFactory));

        inner.state.transition(BackendState::Initializing);
        runtime.spawn(initialize(inner.clone(), factory));

        Ok(Orchestrator { inner })
    }
}

/// Bring the worker up, or give up on it
async fn initialize(inner: Arc<Inner>, factory: Arc<dyn WorkerFactory>) {
    let kernel = Kernel::new(inner.native.get().await);

    let link = match factory.spawn(kernel) {
        Ok(link) => link,
        Err(e) => {
            log::warn!("Could not start worker: {e}");
            inner.state.transition(BackendState::Fallback);
            return;
        }
    };

    *inner.offloaded.lock() = Some(Arc::new(OffloadedBackend::new(
        link.requests,
        inner.pending.clone(),
        inner.config.request_timeout,
    )));
    tokio::spawn(pump(link.messages, inner.pending.clone(), inner.state.clone()));

    let remaining = inner.init_deadline.saturating_duration_since(Instant::now());
    if inner.state.settled(remaining).await.is_pending() {
        give_up_waiting(&inner.state, inner.config.init_timeout);
    }
    if inner.state.current() != BackendState::Ready {
        // Dropping the sender lets a late or abandoned worker wind down
        inner.offloaded.lock().take();
    }
}

fn give_up_waiting(state: &StateMachine, waited: Duration) {
    if state.transition(BackendState::Fallback) {
        log::warn!("Worker not ready after {waited:?}, serving requests synchronously");
    }
}

/// Route worker messages to the requests waiting on them
async fn pump(
    mut messages: mpsc::UnboundedReceiver<WorkerMessage>,
    pending: Arc<PendingTable>,
    state: Arc<StateMachine>,
) {
    while let Some(message) = messages.recv().await {
        match message {
            WorkerMessage::Ready => {
                state.transition(BackendState::Ready);
            }
            WorkerMessage::Result {
                id,
                result,
                processing_time,
                accelerated,
            } => {
                let completion = Completion {
                    result,
                    processing_time,
                    accelerated,
                };
                if !pending.resolve(id, Ok(completion)) {
                    log::debug!("Dropping late result for request {id}");
                }
            }
            WorkerMessage::Error { id, error } => {
                if !pending.resolve(id, Err(LongtextError::Worker(error.message))) {
                    log::debug!("Dropping late error for request {id}");
                }
            }
            WorkerMessage::Progress {
                id,
                progress,
                chunk,
                total,
            }
            | WorkerMessage::BatchProgress {
                id,
                progress,
                chunk,
                total,
            } => {
                if let Some(callback) = pending.progress(id) {
                    callback(ProgressEvent {
                        progress,
                        chunk: chunk.unwrap_or(0),
                        total: total.unwrap_or(0),
                    });
                }
            }
        }
    }

    if state.transition(BackendState::Fallback) {
        log::warn!("Worker went away, serving requests synchronously");
    }
    let orphaned = pending.fail_all(|| LongtextError::WorkerUnavailable);
    if orphaned > 0 {
        log::warn!("{orphaned} in-flight request(s) lost with the worker");
    }
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Orchestrator with [`OrchestratorConfig::from_env`] and default collaborators
    pub fn from_env() -> Result<Self> {
        Self::builder()
            .config(OrchestratorConfig::from_env()?)
            .build()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    pub fn state(&self) -> BackendState {
        self.inner.state.current()
    }

    /// Wait for initialization to finish and report where it ended up
    ///
    /// Past the init deadline a still-initializing orchestrator is moved to
    /// `Fallback`, so this never returns a pending state.
    pub async fn settle(&self) -> BackendState {
        let remaining = self
            .inner
            .init_deadline
            .saturating_duration_since(Instant::now());
        let state = self.inner.state.settled(remaining).await;
        if state.is_pending() {
            give_up_waiting(&self.inner.state, self.inner.config.init_timeout);
        }
        self.inner.state.current()
    }

    /// Name of the native module, loading it if needed
    pub async fn native_module(&self) -> Option<&'static str> {
        self.inner.native.get().await.map(|m| m.name())
    }

    /// Number of requests waiting on the worker
    pub fn in_flight(&self) -> usize {
        self.inner.pending.len()
    }

    /// Move to `Terminated`, release the worker and reject waiting requests
    ///
    /// Requests made afterwards are computed synchronously.
    pub fn shutdown(&self) {
        self.inner.state.transition(BackendState::Terminated);
        self.inner.offloaded.lock().take();
        let rejected = self.inner.pending.fail_all(|| LongtextError::Terminated);
        log::info!("Orchestrator shut down, {rejected} pending request(s) rejected");
    }

    /// Run one request on the appropriate tier
    pub async fn process(
        &self,
        request: Request,
        progress: Option<ProgressCallback>,
    ) -> Result<Response> {
        self.check(&request)?;
        let request = self.route(request);

        let mut state = self.inner.state.current();
        if state.is_pending() {
            state = self.settle().await;
        }

        let offloaded = match state {
            BackendState::Ready => self.inner.offloaded.lock().clone(),
            _ => None,
        };

        let (computed, tier) = match offloaded {
            Some(backend) => {
                match backend.execute(request.clone(), progress.clone()).await {
                    Ok(computed) => (computed, backend.tier()),
                    Err(e) if e.is_tier_failure() => {
                        log::warn!("Offloaded tier failed ({e}), retrying synchronously");
                        self.latch_fallback();
                        self.run_fallback(request, progress).await?
                    }
                    Err(e @ LongtextError::Protocol { .. }) => {
                        log::warn!("{e}");
                        self.latch_fallback();
                        return Err(e);
                    }
                    Err(e) => return Err(e),
                }
            }
            None => self.run_fallback(request, progress).await?,
        };

        Ok(self.respond(computed, tier))
    }

    /// [`process`](Self::process) for callers holding an action name and JSON
    pub async fn process_raw(
        &self,
        action: &str,
        payload: Value,
        progress: Option<ProgressCallback>,
    ) -> Result<Response> {
        let request = Request::from_parts(action, payload)?;
        self.process(request, progress).await
    }

    pub async fn justify(&self, text: impl Into<String>, budget: u32) -> Result<JustifyResult> {
        match self.process(Request::justify(text, budget), None).await? {
            Response::Justified(result) => Ok(result),
            other => Err(mismatch("justify", &other)),
        }
    }

    pub async fn chunked_justify(
        &self,
        text: impl Into<String>,
        budget: u32,
        chunk_size: usize,
        progress: Option<ProgressCallback>,
    ) -> Result<JustifyResult> {
        let request = Request::chunked_justify(text, budget, chunk_size);
        match self.process(request, progress).await? {
            Response::Justified(result) => Ok(result),
            other => Err(mismatch("chunkedJustify", &other)),
        }
    }

    pub async fn batch_justify(
        &self,
        texts: Vec<String>,
        budget: u32,
        progress: Option<ProgressCallback>,
    ) -> Result<BatchResult> {
        match self
            .process(Request::batch_justify(texts, budget), progress)
            .await?
        {
            Response::Batch(result) => Ok(result),
            other => Err(mismatch("batchJustify", &other)),
        }
    }

    /// `Ok(())` for acceptable text, the validation error otherwise
    pub async fn validate(&self, text: impl Into<String>) -> Result<()> {
        match self.process(Request::validate(text), None).await? {
            Response::Validated(verdict) => Ok(verdict?),
            other => Err(mismatch("validate", &other)),
        }
    }

    pub async fn stats(&self, text: impl Into<String>) -> Result<TextStats> {
        match self.process(Request::stats(text), None).await? {
            Response::Stats(stats) => Ok(stats),
            other => Err(mismatch("stats", &other)),
        }
    }

    pub async fn is_wide_script(&self, text: impl Into<String>) -> Result<bool> {
        match self.process(Request::is_wide_script(text), None).await? {
            Response::WideScript(wide) => Ok(wide),
            other => Err(mismatch("isWideScript", &other)),
        }
    }

    /// Reject bad input before it reaches any tier
    fn check(&self, request: &Request) -> Result<()> {
        use longtext_justify::{validate, validate_chunk_size, validate_width};

        match request {
            Request::Justify(p) => {
                validate_width(p.max_chars_per_line)?;
                validate(&p.text)?;
            }
            Request::ChunkedJustify(p) => {
                validate_width(p.max_chars_per_line)?;
                validate_chunk_size(p.chunk_size)?;
                validate(&p.text)?;
            }
            Request::BatchJustify(p) => {
                validate_width(p.max_chars_per_line)?;
                for text in &p.texts {
                    validate(text)?;
                }
            }
            // The verdict is the answer; stats and classification accept anything
            Request::Validate(_) | Request::Stats(_) | Request::IsWideScript(_) => {}
        }
        Ok(())
    }

    /// Send oversized `justify` requests through the chunk processor
    fn route(&self, request: Request) -> Request {
        match request {
            Request::Justify(p)
                if p.text.chars().count() > self.inner.config.auto_chunk_threshold =>
            {
                log::debug!(
                    "Chunking {} characters automatically",
                    p.text.chars().count()
                );
                Request::chunked_justify(
                    p.text,
                    p.max_chars_per_line,
                    self.inner.config.auto_chunk_size,
                )
            }
            other => other,
        }
    }

    async fn run_fallback(
        &self,
        request: Request,
        progress: Option<ProgressCallback>,
    ) -> Result<(Computed<Output>, TierKind)> {
        let computed = self.inner.fallback.execute(request, progress).await?;
        Ok((computed, self.inner.fallback.tier()))
    }

    fn latch_fallback(&self) {
        if self.inner.state.transition(BackendState::Fallback) {
            self.inner.offloaded.lock().take();
        }
    }

    fn respond(&self, computed: Computed<Output>, tier: TierKind) -> Response {
        let accelerated = computed.accelerated;
        match computed.value {
            Output::Justified { text, chunked } => {
                let lines: Vec<String> = text.split(LINE_SEPARATOR).map(String::from).collect();
                let line_positions =
                    longtext_justify::compute_line_positions(&lines, &self.inner.config.layout);
                Response::Justified(JustifyResult {
                    justified_text: text,
                    lines,
                    line_positions,
                    chunked,
                    tier_used: tier,
                    accelerated,
                })
            }
            Output::Batch(results) => Response::Batch(BatchResult {
                results,
                tier_used: tier,
                accelerated,
            }),
            Output::Validated(verdict) => Response::Validated(verdict),
            Output::Stats(stats) => Response::Stats(stats),
            Output::WideScript(wide) => Response::WideScript(wide),
        }
    }
}

fn mismatch(action: &str, response: &Response) -> LongtextError {
    LongtextError::Worker(format!("{action} answered with {response:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync_orchestrator() -> Orchestrator {
        Orchestrator::builder()
            .offload(false)
            .native_loader(NativeLoader::Disabled)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_offload_disabled_starts_in_fallback() {
        let orchestrator = sync_orchestrator();
        assert_eq!(orchestrator.state(), BackendState::Fallback);

        let result = orchestrator.justify("Hello World", 20).await.unwrap();
        assert_eq!(result.justified_text, "Hello World");
        assert_eq!(result.lines, vec!["Hello World"]);
        assert_eq!(result.tier_used, TierKind::Fallback);
        assert!(!result.chunked);
    }

    #[test]
    fn test_build_without_runtime_starts_in_fallback() {
        let orchestrator = Orchestrator::builder()
            .native_loader(NativeLoader::Disabled)
            .build()
            .unwrap();
        assert_eq!(orchestrator.state(), BackendState::Fallback);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let result = runtime
            .block_on(orchestrator.justify("这是一个测试文本", 10))
            .unwrap();
        assert_eq!(result.lines, vec!["这是一个测", "试文本"]);
        assert_eq!(result.tier_used, TierKind::Fallback);
        assert_eq!(orchestrator.state(), BackendState::Fallback);
    }

    #[tokio::test]
    async fn test_line_positions_follow_layout() {
        let orchestrator = sync_orchestrator();
        let result = orchestrator.justify("Line1\nLine2", 50).await.unwrap();
        assert_eq!(result.lines, vec!["Line1", "Line2"]);
        assert_eq!(result.line_positions[0].y, 20.0);
        assert_eq!(result.line_positions[1].y, 16.0 * 1.5 + 20.0);
        assert_eq!(result.line_positions[1].x, 20.0);
    }

    #[tokio::test]
    async fn test_auto_chunking() {
        let config = OrchestratorConfig {
            offload: false,
            auto_chunk_threshold: 10,
            auto_chunk_size: 4,
            ..OrchestratorConfig::default()
        };
        let orchestrator = Orchestrator::builder().config(config).build().unwrap();

        let short = orchestrator.justify("abcd", 50).await.unwrap();
        assert!(!short.chunked);

        let long = orchestrator.justify("abcdefghijkl", 50).await.unwrap();
        assert!(long.chunked);
        assert_eq!(long.justified_text, "abcd\r\nefgh\r\nijkl");
    }

    #[tokio::test]
    async fn test_validation_before_dispatch() {
        let orchestrator = sync_orchestrator();

        let err = orchestrator.justify("", 10).await.unwrap_err();
        assert!(matches!(err, LongtextError::Validation(ref v) if v.reason() == "empty"));

        let err = orchestrator.justify("abc", 0).await.unwrap_err();
        assert!(matches!(err, LongtextError::Validation(ref v) if v.reason() == "invalid-width"));

        let err = orchestrator
            .chunked_justify("abc", 10, 0, None)
            .await
            .unwrap_err();
        assert!(
            matches!(err, LongtextError::Validation(ref v) if v.reason() == "invalid-chunk-size")
        );
    }

    #[tokio::test]
    async fn test_validate_limits() {
        let orchestrator = sync_orchestrator();
        assert!(orchestrator.validate("a".repeat(500_000)).await.is_ok());

        let err = orchestrator.validate("a".repeat(500_001)).await.unwrap_err();
        assert!(matches!(err, LongtextError::Validation(ref v) if v.reason() == "too-large"));

        let err = orchestrator.validate("").await.unwrap_err();
        assert!(matches!(err, LongtextError::Validation(ref v) if v.reason() == "empty"));
    }

    #[tokio::test]
    async fn test_shutdown_without_worker() {
        let orchestrator = sync_orchestrator();
        orchestrator.shutdown();
        assert_eq!(orchestrator.state(), BackendState::Terminated);

        // Still answers, synchronously
        assert!(orchestrator.is_wide_script("字").await.unwrap());
    }
}
