//! Line editing for chat mode.
//!
//! reedline owns the terminal while it reads a line, so it runs on a blocking
//! thread and hands each line over a channel. Output produced in the
//! meantime goes through its external printer, which draws whole lines above
//! the prompt.

use reedline::{DefaultPrompt, DefaultPromptSegment, ExternalPrinter, Reedline, Signal};
use std::io::{self, Write};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Lines the external printer may hold before the editor draws them.
const PRINTER_CAPACITY: usize = 4096;

/// One event from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl-C
    Interrupt,
    /// Ctrl-D or end of input
    Eof,
}

/// reedline running on a blocking thread.
///
/// After each [`Input`] the editor waits for [`LineEditor::resume`] before
/// reading again, so output printed while handling a line never races the
/// prompt.
pub struct LineEditor {
    inputs: mpsc::Receiver<Input>,
    ready: mpsc::Sender<String>,
    printer: ExternalPrinter<String>,
    thread: JoinHandle<()>,
}

impl LineEditor {
    /// Start reading with `prompt` as the prompt label.
    pub fn spawn(prompt: String) -> Self {
        let printer = ExternalPrinter::new(PRINTER_CAPACITY);
        let (input_tx, inputs) = mpsc::channel(1);
        let (ready, mut ready_rx) = mpsc::channel::<String>(1);

        let editor_printer = printer.clone();
        let thread = tokio::task::spawn_blocking(move || {
            let mut editor = Reedline::create().with_external_printer(editor_printer);
            let mut label = prompt;
            loop {
                let prompt = DefaultPrompt::new(
                    DefaultPromptSegment::Basic(label.clone()),
                    DefaultPromptSegment::Empty,
                );
                let input = match editor.read_line(&prompt) {
                    Ok(Signal::Success(line)) => Input::Line(line),
                    Ok(Signal::CtrlC) => Input::Interrupt,
                    Ok(Signal::CtrlD) => Input::Eof,
                    Err(e) => {
                        warn!("Line editor failed: {}", e);
                        Input::Eof
                    }
                };

                let eof = input == Input::Eof;
                if input_tx.blocking_send(input).is_err() || eof {
                    break;
                }
                match ready_rx.blocking_recv() {
                    Some(next) => label = next,
                    None => break,
                }
            }
        });

        Self {
            inputs,
            ready,
            printer,
            thread,
        }
    }

    pub async fn next(&mut self) -> Input {
        self.inputs.recv().await.unwrap_or(Input::Eof)
    }

    /// Let the editor read the next line under a new prompt label.
    ///
    /// Returns `false` if the editor has stopped.
    pub async fn resume(&self, prompt: String) -> bool {
        self.ready.send(prompt).await.is_ok()
    }

    /// Writer that prints through the editor.
    pub fn writer(&self) -> PrinterWriter {
        PrinterWriter::new(self.printer.clone())
    }

    pub fn printer(&self) -> ExternalPrinter<String> {
        self.printer.clone()
    }

    /// Stop reading and give the terminal back.
    pub async fn close(self) {
        let LineEditor {
            inputs,
            ready,
            thread,
            ..
        } = self;
        drop(ready);
        drop(inputs);
        if let Err(e) = thread.await {
            warn!("Line editor thread ended abnormally: {}", e);
        }
    }
}

/// [`Write`] adapter that sends complete lines to an [`ExternalPrinter`].
///
/// Text after the last newline is held back until the line is finished, or
/// until the writer is dropped.
pub struct PrinterWriter {
    printer: ExternalPrinter<String>,
    pending: Vec<u8>,
}

impl PrinterWriter {
    pub fn new(printer: ExternalPrinter<String>) -> Self {
        Self {
            printer,
            pending: Vec::new(),
        }
    }

    fn send(&self, line: &[u8]) -> io::Result<()> {
        self.printer
            .print(String::from_utf8_lossy(line).into_owned())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "line editor closed"))
    }
}

impl Write for PrinterWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            self.send(&line[..end])?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PrinterWriter {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            let _ = self.send(&rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::stream::StreamPrinter;
    use crate::progress::reporter::ProgressReporter;
    use ragdash_domain::{RequestId, StreamSession};

    fn drain(printer: &ExternalPrinter<String>) -> Vec<String> {
        printer.receiver().try_iter().collect()
    }

    #[test]
    fn test_only_complete_lines_are_printed() {
        let printer = ExternalPrinter::new(16);
        let mut out = PrinterWriter::new(printer.clone());

        out.write_all(b"Hel").unwrap();
        out.write_all(b"lo\nwor").unwrap();
        out.flush().unwrap();
        assert_eq!(drain(&printer), vec!["Hello".to_string()]);

        out.write_all(b"ld\n\n").unwrap();
        assert_eq!(drain(&printer), vec!["world".to_string(), String::new()]);
    }

    #[test]
    fn test_unfinished_line_is_printed_on_drop() {
        let printer = ExternalPrinter::new(16);
        let mut out = PrinterWriter::new(printer.clone());
        out.write_all("Grüße".as_bytes()).unwrap();
        assert!(drain(&printer).is_empty());

        drop(out);
        assert_eq!(drain(&printer), vec!["Grüße".to_string()]);
    }

    #[test]
    fn test_streamed_answer_arrives_as_lines() {
        let printer = ExternalPrinter::new(16);
        let mut stream = StreamPrinter::new(
            PrinterWriter::new(printer.clone()),
            ProgressReporter::hidden(),
        );

        let mut session = StreamSession::new(RequestId::new(1));
        session.append("first line\nsec");
        stream.render(&session).unwrap();
        session.append("ond");
        stream.render(&session).unwrap();
        assert_eq!(drain(&printer), vec!["first line".to_string()]);

        session.complete();
        assert!(stream.render(&session).unwrap());
        assert_eq!(drain(&printer), vec!["second".to_string()]);
    }
}
