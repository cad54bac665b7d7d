//! In-memory port implementations for use case tests.

use crate::ports::context_repository::ContextRepository;
use crate::ports::health_source::HealthSource;
use crate::ports::session_logger::{SessionEvent, SessionLogger};
use crate::ports::streaming_backend::{
    BackendError, BackendRequest, ByteStream, Completion, StreamingBackend,
};
use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc;
use ragdash_domain::{ContextDocument, ContextDraft, HealthReport};
use std::collections::VecDeque;
use std::sync::Mutex;

type Chunk = Result<Vec<u8>, BackendError>;

/// What the next `open_stream` call returns.
pub(crate) enum StreamScript {
    Status(u16),
    Unreachable,
    Items(Vec<Chunk>),
    Channel(mpsc::UnboundedReceiver<Chunk>),
}

impl StreamScript {
    pub(crate) fn chunks(parts: &[&str]) -> Self {
        StreamScript::Items(parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect())
    }

    pub(crate) fn status(status: u16) -> Self {
        StreamScript::Status(status)
    }

    /// A stream fed by the returned sender; it stays open until the sender
    /// is dropped.
    pub(crate) fn channel() -> (mpsc::UnboundedSender<Chunk>, Self) {
        let (tx, rx) = mpsc::unbounded();
        (tx, StreamScript::Channel(rx))
    }
}

#[derive(Default)]
pub(crate) struct ScriptedBackend {
    scripts: Mutex<VecDeque<StreamScript>>,
    requests: Mutex<Vec<BackendRequest>>,
    completion: Mutex<Option<Completion>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, script: StreamScript) {
        self.scripts.lock().unwrap().push_back(script);
    }

    pub(crate) fn set_completion(&self, completion: Completion) {
        *self.completion.lock().unwrap() = Some(completion);
    }

    pub(crate) fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StreamingBackend for ScriptedBackend {
    async fn open_stream(&self, request: &BackendRequest) -> Result<ByteStream, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self.scripts.lock().unwrap().pop_front();
        match script {
            Some(StreamScript::Status(status)) => Err(BackendError::HttpStatus {
                status,
                message: "scripted status".to_string(),
            }),
            Some(StreamScript::Unreachable) | None => {
                Err(BackendError::Network("connection refused".to_string()))
            }
            Some(StreamScript::Items(items)) => Ok(futures::stream::iter(items).boxed()),
            Some(StreamScript::Channel(rx)) => Ok(rx.boxed()),
        }
    }

    async fn complete(&self, request: &BackendRequest) -> Result<Completion, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        self.completion
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BackendError::Network("connection refused".to_string()))
    }
}

#[derive(Default)]
pub(crate) struct RecordingLogger {
    events: Mutex<Vec<(&'static str, serde_json::Value)>>,
}

impl RecordingLogger {
    pub(crate) fn count(&self, event_type: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| *t == event_type)
            .count()
    }
}

impl SessionLogger for RecordingLogger {
    fn log(&self, event: SessionEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type, event.payload));
    }
}

/// Context store backed by a vector; ids are sequential.
#[derive(Default)]
pub(crate) struct InMemoryContexts {
    docs: Mutex<Vec<ContextDocument>>,
    next_id: Mutex<u32>,
    pub(crate) fail_with: Mutex<Option<BackendError>>,
}

impl InMemoryContexts {
    fn check(&self) -> Result<(), BackendError> {
        match self.fail_with.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn missing(id: &str) -> BackendError {
        BackendError::HttpStatus {
            status: 500,
            message: format!("Error updating context: {} not found", id),
        }
    }
}

#[async_trait]
impl ContextRepository for InMemoryContexts {
    async fn list(&self) -> Result<Vec<ContextDocument>, BackendError> {
        self.check()?;
        Ok(self.docs.lock().unwrap().clone())
    }

    async fn create(&self, draft: &ContextDraft) -> Result<String, BackendError> {
        self.check()?;
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = format!("doc-{}", next_id);
        self.docs
            .lock()
            .unwrap()
            .push(ContextDocument::new(id.clone(), draft.clone()));
        Ok(id)
    }

    async fn update(&self, id: &str, draft: &ContextDraft) -> Result<(), BackendError> {
        self.check()?;
        let mut docs = self.docs.lock().unwrap();
        let doc = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| Self::missing(id))?;
        doc.title = draft.title.clone();
        doc.content = draft.content.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        self.check()?;
        let mut docs = self.docs.lock().unwrap();
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(Self::missing(id));
        }
        Ok(())
    }

    async fn seed_mock_data(&self) -> Result<(), BackendError> {
        self.create(&ContextDraft::new("Sample", "Mock context document"))
            .await
            .map(|_| ())
    }
}

/// Health source returning queued results, then repeating the last one.
#[derive(Default)]
pub(crate) struct ScriptedHealth {
    results: Mutex<VecDeque<Result<HealthReport, BackendError>>>,
    calls: Mutex<usize>,
}

impl ScriptedHealth {
    pub(crate) fn new(results: Vec<Result<HealthReport, BackendError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: Mutex::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl HealthSource for ScriptedHealth {
    async fn status(&self) -> Result<HealthReport, BackendError> {
        *self.calls.lock().unwrap() += 1;
        let mut results = self.results.lock().unwrap();
        if results.len() > 1 {
            results.pop_front().unwrap()
        } else {
            results
                .front()
                .cloned()
                .unwrap_or_else(|| Err(BackendError::Network("unreachable".to_string())))
        }
    }
}
