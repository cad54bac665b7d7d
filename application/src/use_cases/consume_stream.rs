//! Stream consumer.
//!
//! Pulls chunks from a response body, decodes them incrementally and reports
//! each decoded delta to a [`StreamObserver`]. The consumer keeps no text of
//! its own; accumulating is the observer's business.
//!
//! Callback contract:
//! - `on_chunk` receives only the newly decoded text, in arrival order
//! - `on_done` fires exactly once, after the last `on_chunk`
//! - `on_error` fires at most once and nothing follows it
//! - cancellation fires no callback at all

use crate::ports::streaming_backend::BackendError;
use futures::{Stream, StreamExt};
use ragdash_domain::{DecodeMode, Utf8StreamDecoder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Receiver of decoded stream output.
pub trait StreamObserver: Send {
    /// Called with each non-empty decoded delta.
    fn on_chunk(&mut self, delta: &str);

    /// Called once when the stream ends normally.
    fn on_done(&mut self);

    /// Called once when reading or decoding fails.
    fn on_error(&mut self, error: &BackendError);
}

/// How a call to [`StreamConsumer::consume`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    Completed,
    Failed(BackendError),
    Cancelled,
}

/// Drains a chunk stream into a [`StreamObserver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamConsumer {
    mode: DecodeMode,
}

impl StreamConsumer {
    pub fn new(mode: DecodeMode) -> Self {
        Self { mode }
    }

    /// Consume `stream` until it ends, fails, or `cancellation` fires.
    ///
    /// The stream is dropped before returning, so cancelling releases the
    /// underlying connection.
    pub async fn consume<S>(
        &self,
        mut stream: S,
        observer: &mut dyn StreamObserver,
        cancellation: &CancellationToken,
    ) -> ConsumeOutcome
    where
        S: Stream<Item = Result<Vec<u8>, BackendError>> + Unpin,
    {
        let mut decoder = Utf8StreamDecoder::new(self.mode);
        let mut chunks = 0usize;
        let mut bytes = 0usize;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    debug!("Stream cancelled after {} chunks ({} bytes)", chunks, bytes);
                    return ConsumeOutcome::Cancelled;
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    chunks += 1;
                    bytes += chunk.len();
                    trace!("Stream chunk #{} ({} bytes)", chunks, chunk.len());

                    match decoder.decode(&chunk) {
                        Ok(text) if text.is_empty() => {}
                        Ok(text) => observer.on_chunk(&text),
                        Err(e) => {
                            return Self::fail(observer, BackendError::StreamRead(e.to_string()));
                        }
                    }
                }
                Some(Err(err)) => return Self::fail(observer, err),
                None => {
                    if decoder.pending_len() > 0 {
                        debug!(
                            "Stream ended inside a character ({} bytes pending)",
                            decoder.pending_len()
                        );
                    }
                    match decoder.finish() {
                        Ok(tail) => {
                            if !tail.is_empty() {
                                observer.on_chunk(&tail);
                            }
                        }
                        Err(e) => {
                            return Self::fail(observer, BackendError::StreamRead(e.to_string()));
                        }
                    }
                    debug!("Stream complete: {} chunks, {} bytes", chunks, bytes);
                    observer.on_done();
                    return ConsumeOutcome::Completed;
                }
            }
        }
    }

    fn fail(observer: &mut dyn StreamObserver, error: BackendError) -> ConsumeOutcome {
        warn!("Stream failed: {}", error);
        observer.on_error(&error);
        ConsumeOutcome::Failed(error)
    }
}
