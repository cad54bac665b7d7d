//! Incremental rendering of stream sessions.
//!
//! The session board publishes whole snapshots, and a `watch` receiver may
//! skip intermediate ones. Because a session's text only grows, printing
//! the suffix past what has already been written is lossless.

use crate::progress::reporter::ProgressReporter;
use ragdash_domain::{RequestId, SessionState, StreamSession};
use std::io::{self, Write};
use tokio::sync::watch;

/// Writes session text to `out` as it grows.
pub struct StreamPrinter<W: Write> {
    out: W,
    progress: ProgressReporter,
    current: Option<RequestId>,
    printed: usize,
    finished: bool,
}

impl<W: Write> StreamPrinter<W> {
    pub fn new(out: W, progress: ProgressReporter) -> Self {
        Self {
            out,
            progress,
            current: None,
            printed: 0,
            finished: false,
        }
    }

    /// Print whatever `session` has that was not printed yet.
    ///
    /// Returns `true` the first time a terminal state of the session is
    /// rendered.
    pub fn render(&mut self, session: &StreamSession) -> io::Result<bool> {
        let id = session.request_id();
        if self.current != Some(id) {
            if self.printed > 0 && !self.finished {
                // previous session was superseded mid-line
                writeln!(self.out)?;
            }
            self.current = Some(id);
            self.printed = 0;
            self.finished = false;
        }
        if self.finished {
            return Ok(false);
        }

        let text = session.accumulated_text();
        if let Some(delta) = text.get(self.printed..)
            && !delta.is_empty()
        {
            self.progress.clear();
            self.out.write_all(delta.as_bytes())?;
            self.out.flush()?;
            self.printed = text.len();
        }

        match session.state() {
            SessionState::Pending => {
                self.progress.waiting(&id.to_string(), "waiting for response...");
                Ok(false)
            }
            SessionState::Streaming => {
                self.progress.clear();
                Ok(false)
            }
            SessionState::Completed | SessionState::Failed(_) | SessionState::Cancelled => {
                self.progress.clear();
                self.finished = true;
                if self.printed > 0 && !text.ends_with('\n') {
                    writeln!(self.out)?;
                    self.out.flush()?;
                }
                Ok(true)
            }
        }
    }

    /// Render board updates for session `id` until it finishes.
    ///
    /// Returns `None` if a newer session replaced it or the board went away
    /// first.
    pub async fn follow(
        &mut self,
        mut updates: watch::Receiver<Option<StreamSession>>,
        id: RequestId,
    ) -> io::Result<Option<StreamSession>> {
        loop {
            let snapshot = updates.borrow_and_update().clone();
            if let Some(session) = snapshot {
                if session.request_id() == id {
                    if self.render(&session)? {
                        return Ok(Some(session));
                    }
                } else if session.request_id() > id {
                    return Ok(None);
                }
            }

            if updates.changed().await.is_err() {
                return Ok(None);
            }
        }
    }

    /// Render every session published on the board until it closes.
    ///
    /// `on_finished` runs once per session whose terminal state reached the
    /// board; superseded sessions never do.
    pub async fn follow_all(
        &mut self,
        mut updates: watch::Receiver<Option<StreamSession>>,
        mut on_finished: impl FnMut(&StreamSession),
    ) -> io::Result<()> {
        loop {
            let snapshot = updates.borrow_and_update().clone();
            if let Some(session) = snapshot
                && self.render(&session)?
            {
                on_finished(&session);
            }

            if updates.changed().await.is_err() {
                return Ok(());
            }
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
