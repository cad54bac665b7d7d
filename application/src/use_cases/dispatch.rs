//! Request dispatcher use case.
//!
//! Turns a [`PromptRequest`] into a running stream session:
//! 1. Pick the endpoint and body shape for the request's mode
//! 2. Supersede the previous live session, if any
//! 3. POST the request and feed the body through the [`StreamConsumer`]
//! 4. Publish every state change on the shared [`SessionBoard`]
//!
//! # Supersession
//!
//! The board holds exactly one session. Each submission gets a fresh,
//! larger [`RequestId`] and replaces the board's session. Every write to the
//! board is performed inside the watch channel's lock and only applies if the
//! board still holds the writer's `RequestId`, so once a newer session has
//! been published an older one can no longer touch shared state, whatever
//! its stream does afterwards.

use crate::ports::session_logger::{NoSessionLogger, SessionEvent, SessionLogger};
use crate::ports::streaming_backend::{BackendError, Completion, StreamingBackend};
use crate::use_cases::consume_stream::{ConsumeOutcome, StreamConsumer, StreamObserver};
use crate::use_cases::routing::{completion_route, stream_route};
use ragdash_domain::util::truncate_str;
use ragdash_domain::{PromptRequest, RequestId, SessionState, StreamSession};
use serde_json::json;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors surfaced by the dispatcher itself.
///
/// Stream failures are not errors here: they end up in the session state.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Session task failed: {0}")]
    TaskFailed(String),
}

/// Shared view of the current stream session.
///
/// This is the state a UI renders. It is `None` until the first submission.
pub struct SessionBoard {
    tx: watch::Sender<Option<StreamSession>>,
}

impl SessionBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<StreamSession>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<StreamSession> {
        self.tx.borrow().clone()
    }

    /// Publish a new pending session, returning the one it replaces.
    fn begin(&self, request_id: RequestId) -> Option<StreamSession> {
        self.tx.send_replace(Some(StreamSession::new(request_id)))
    }

    /// Apply `update` only if the board still shows `request_id`.
    ///
    /// Returns whether the board changed.
    fn apply(&self, request_id: RequestId, update: impl FnOnce(&mut StreamSession) -> bool) -> bool {
        self.tx.send_if_modified(|slot| match slot {
            Some(session) if session.request_id() == request_id => update(session),
            _ => false,
        })
    }
}

impl Default for SessionBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer that mirrors one session's stream into its own copy and, while
/// the session is current, into the board.
struct SessionObserver {
    board: Arc<SessionBoard>,
    session: StreamSession,
    dropped: usize,
}

impl SessionObserver {
    fn new(board: Arc<SessionBoard>, request_id: RequestId) -> Self {
        Self {
            board,
            session: StreamSession::new(request_id),
            dropped: 0,
        }
    }

    fn request_id(&self) -> RequestId {
        self.session.request_id()
    }

    fn publish(&mut self, update: impl Fn(&mut StreamSession) -> bool) {
        update(&mut self.session);
        if !self.board.apply(self.request_id(), update) {
            self.dropped += 1;
        }
    }

    fn cancel(&mut self) {
        self.publish(|s| s.cancel());
    }
}

impl StreamObserver for SessionObserver {
    fn on_chunk(&mut self, delta: &str) {
        self.publish(|s| s.append(delta));
    }

    fn on_done(&mut self) {
        self.publish(|s| s.complete());
    }

    fn on_error(&mut self, error: &BackendError) {
        let failure = error.to_failure();
        self.publish(|s| s.fail(failure.clone()));
    }
}

struct LiveSlot {
    last_id: RequestId,
    current: Option<CancellationToken>,
}

/// Dispatches prompt submissions to the streaming backend.
///
/// Dropping the dispatcher (or calling [`shutdown`](Self::shutdown)) cancels
/// the live session.
pub struct RequestDispatcher {
    backend: Arc<dyn StreamingBackend>,
    consumer: StreamConsumer,
    logger: Arc<dyn SessionLogger>,
    board: Arc<SessionBoard>,
    live: Mutex<LiveSlot>,
    shutdown: CancellationToken,
}

impl RequestDispatcher {
    pub fn new(backend: Arc<dyn StreamingBackend>) -> Self {
        Self {
            backend,
            consumer: StreamConsumer::default(),
            logger: Arc::new(NoSessionLogger),
            board: Arc::new(SessionBoard::new()),
            live: Mutex::new(LiveSlot {
                last_id: RequestId::new(0),
                current: None,
            }),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_consumer(mut self, consumer: StreamConsumer) -> Self {
        self.consumer = consumer;
        self
    }

    pub fn with_session_logger(mut self, logger: Arc<dyn SessionLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// The shared session view.
    pub fn board(&self) -> &Arc<SessionBoard> {
        &self.board
    }

    /// Start streaming `request`, superseding any live session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: PromptRequest) -> SessionHandle {
        let route = stream_route(&request);
        let cancellation = self.shutdown.child_token();

        let (request_id, previous_token, replaced) = {
            let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
            let request_id = live.last_id.next();
            live.last_id = request_id;
            let previous_token = live.current.replace(cancellation.clone());
            let replaced = self.board.begin(request_id);
            (request_id, previous_token, replaced)
        };

        if let Some(token) = previous_token {
            token.cancel();
        }
        if let Some(old) = replaced.filter(|s| s.is_live()) {
            info!("Session {} superseded by {}", old.request_id(), request_id);
            self.logger.log(SessionEvent::new(
                "session_superseded",
                json!({
                    "request_id": old.request_id().value(),
                    "superseded_by": request_id.value(),
                    "received_bytes": old.accumulated_text().len(),
                }),
            ));
        }

        info!(
            "Submitting {} ({} mode, model {}) to {}: {}",
            request_id,
            request.mode(),
            request.model(),
            route.path,
            truncate_str(request.text(), 80)
        );
        self.logger.log(SessionEvent::new(
            "session_submitted",
            json!({
                "request_id": request_id.value(),
                "mode": request.mode().as_str(),
                "model": request.model().as_str(),
                "path": route.path,
                "text": request.text(),
            }),
        ));

        let backend = Arc::clone(&self.backend);
        let board = Arc::clone(&self.board);
        let logger = Arc::clone(&self.logger);
        let consumer = self.consumer;
        let token = cancellation.clone();

        let task = tokio::spawn(async move {
            let mut observer = SessionObserver::new(board, request_id);

            let opened = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                opened = backend.open_stream(&route) => Some(opened),
            };

            match opened {
                None => observer.cancel(),
                Some(Err(err)) => {
                    warn!("{} failed before streaming: {}", request_id, err);
                    observer.on_error(&err);
                }
                Some(Ok(stream)) => {
                    debug!("{} streaming from {}", request_id, route.path);
                    if consumer.consume(stream, &mut observer, &token).await
                        == ConsumeOutcome::Cancelled
                    {
                        observer.cancel();
                    }
                }
            }

            if observer.dropped > 0 {
                debug!(
                    "{} dropped {} updates after being superseded",
                    request_id, observer.dropped
                );
            }
            log_outcome(logger.as_ref(), &observer.session);
            observer.session
        });

        SessionHandle {
            request_id,
            cancellation,
            board: Arc::clone(&self.board),
            task,
        }
    }

    /// Fetch a whole response from the non-streaming endpoint.
    pub async fn complete(&self, request: &PromptRequest) -> Result<Completion, DispatchError> {
        let route = completion_route(request);
        info!(
            "Requesting completion from {} (model {})",
            route.path,
            request.model()
        );
        Ok(self.backend.complete(&route).await?)
    }

    /// Cancel the live session. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for RequestDispatcher {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn log_outcome(logger: &dyn SessionLogger, session: &StreamSession) {
    let id = session.request_id().value();
    let bytes = session.accumulated_text().len();
    let event = match session.state() {
        SessionState::Completed => SessionEvent::new(
            "session_completed",
            json!({"request_id": id, "bytes": bytes, "text": session.accumulated_text()}),
        ),
        SessionState::Failed(failure) => SessionEvent::new(
            "session_failed",
            json!({
                "request_id": id,
                "bytes": bytes,
                "kind": failure.kind.as_str(),
                "error": failure.to_string(),
            }),
        ),
        SessionState::Cancelled => SessionEvent::new(
            "session_cancelled",
            json!({"request_id": id, "bytes": bytes}),
        ),
        SessionState::Pending | SessionState::Streaming => return,
    };
    logger.log(event);
}

/// Handle to one submitted session.
pub struct SessionHandle {
    request_id: RequestId,
    cancellation: CancellationToken,
    board: Arc<SessionBoard>,
    task: JoinHandle<StreamSession>,
}

impl SessionHandle {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// The board's session, if it is still this one.
    pub fn snapshot(&self) -> Option<StreamSession> {
        self.board
            .current()
            .filter(|s| s.request_id() == self.request_id)
    }

    /// Updates of the shared board. Entries for other request ids mean this
    /// session has been superseded.
    pub fn subscribe(&self) -> watch::Receiver<Option<StreamSession>> {
        self.board.subscribe()
    }

    /// Cancel this session. Idempotent.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Wait for the session to reach a terminal state.
    ///
    /// A superseded session ends as [`SessionState::Cancelled`].
    pub async fn wait(self) -> Result<StreamSession, DispatchError> {
        self.task
            .await
            .map_err(|e| DispatchError::TaskFailed(e.to_string()))
    }
}
