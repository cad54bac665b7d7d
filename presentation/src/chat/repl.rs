//! REPL (Read-Eval-Print Loop) for interactive prompting
//!
//! Prompts are read line by line while the previous answer may still be
//! streaming. Submitting a new prompt supersedes the live session; its
//! output stops and the new answer starts on a fresh line.

use super::editor::{Input, LineEditor};
use crate::output::console::ConsoleFormatter;
use crate::output::stream::StreamPrinter;
use crate::progress::reporter::ProgressReporter;
use ragdash_application::{RequestDispatcher, SessionHandle};
use ragdash_domain::{GenerationMode, Model, PromptRequest, StreamSession};
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What the REPL should do after a line of input.
#[derive(Debug, PartialEq)]
pub enum LineAction {
    Continue,
    Submit(PromptRequest),
    Cancel,
    Exit,
}

/// Interactive prompt REPL
pub struct ChatRepl {
    dispatcher: Arc<RequestDispatcher>,
    model: Model,
    mode: GenerationMode,
    current: Option<SessionHandle>,
}

impl ChatRepl {
    pub fn new(dispatcher: Arc<RequestDispatcher>, model: Model) -> Self {
        Self {
            dispatcher,
            model,
            mode: GenerationMode::Generate,
            current: None,
        }
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Run until `/quit`, end of input, or Ctrl-C with nothing streaming.
    ///
    /// A terminal gets the line editor; piped input is read plainly.
    pub async fn run(&mut self) -> io::Result<()> {
        self.print_welcome();
        if io::stdin().is_terminal() {
            self.run_editor().await;
        } else {
            self.run_piped().await?;
        }
        println!("Bye!");
        Ok(())
    }

    async fn run_editor(&mut self) {
        let mut editor = LineEditor::spawn(self.prompt_label());
        let status = editor.printer();
        let (printer, stop) = self.spawn_printer(editor.writer(), move |line| {
            let _ = status.print(line);
        });

        loop {
            match editor.next().await {
                Input::Eof => {
                    self.wait_current().await;
                    break;
                }
                input => {
                    if !self.apply(input) || !editor.resume(self.prompt_label()).await {
                        break;
                    }
                }
            }
        }

        self.finish(printer, stop).await;
        editor.close().await;
    }

    async fn run_piped(&mut self) -> io::Result<()> {
        let (printer, stop) = self.spawn_printer(io::stdout(), |line| eprintln!("{}", line));
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let input = tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => Input::Line(line),
                    None => Input::Eof,
                },
                _ = tokio::signal::ctrl_c() => Input::Interrupt,
            };
            if input == Input::Eof {
                self.wait_current().await;
                break;
            }
            if !self.apply(input) {
                break;
            }
        }

        self.finish(printer, stop).await;
        Ok(())
    }

    /// Handle one input event. Returns `false` when the REPL should exit.
    pub fn apply(&mut self, input: Input) -> bool {
        let action = match input {
            Input::Line(line) => self.handle_line(&line),
            Input::Interrupt if self.has_live_session() => LineAction::Cancel,
            Input::Interrupt | Input::Eof => LineAction::Exit,
        };

        match action {
            LineAction::Continue => {}
            LineAction::Submit(request) => {
                let handle = self.dispatcher.submit(request);
                debug!("Chat submitted {}", handle.request_id());
                self.current = Some(handle);
            }
            LineAction::Cancel => {
                if let Some(handle) = &self.current {
                    handle.cancel();
                }
            }
            LineAction::Exit => return false,
        }
        true
    }

    /// Render every board update to `out` until stopped.
    ///
    /// On stop the latest snapshot is rendered once more, so a session that
    /// finished just before is never cut short.
    fn spawn_printer<W>(
        &self,
        out: W,
        mut status: impl FnMut(String) + Send + 'static,
    ) -> (JoinHandle<io::Result<()>>, CancellationToken)
    where
        W: Write + Send + 'static,
    {
        let updates = self.dispatcher.board().subscribe();
        let stop = CancellationToken::new();
        let stopped = stop.clone();

        let task = tokio::spawn(async move {
            let mut printer = StreamPrinter::new(out, ProgressReporter::hidden());
            let mut report = |session: &StreamSession| {
                if let Some(line) = ConsoleFormatter::session_status(session) {
                    status(line);
                }
            };

            tokio::select! {
                result = printer.follow_all(updates.clone(), &mut report) => result,
                _ = stopped.cancelled() => {
                    let last = updates.borrow().clone();
                    if let Some(session) = last
                        && printer.render(&session)?
                    {
                        report(&session);
                    }
                    Ok(())
                }
            }
        });
        (task, stop)
    }

    async fn wait_current(&mut self) {
        if let Some(handle) = self.current.take() {
            let _ = handle.wait().await;
        }
    }

    async fn finish(&mut self, printer: JoinHandle<io::Result<()>>, stop: CancellationToken) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
            let _ = handle.wait().await;
        }
        stop.cancel();
        match printer.await {
            Ok(Err(e)) => debug!("Chat output stopped: {}", e),
            Err(e) => debug!("Chat printer task failed: {}", e),
            Ok(Ok(())) => {}
        }
    }

    fn prompt_label(&self) -> String {
        format!("{} {}", self.mode, self.model)
    }

    fn has_live_session(&self) -> bool {
        self.current
            .as_ref()
            .and_then(|handle| handle.snapshot())
            .is_some_and(|session| session.is_live())
    }

    /// Interpret one line of input.
    pub fn handle_line(&mut self, line: &str) -> LineAction {
        let line = line.trim();
        if line.is_empty() {
            return LineAction::Continue;
        }
        if line.starts_with('/') {
            return self.handle_command(line);
        }

        match PromptRequest::new(line, self.model.clone(), self.mode) {
            Ok(request) => LineAction::Submit(request),
            Err(e) => {
                eprintln!("Error: {}", e);
                LineAction::Continue
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("ragdash interactive mode");
        println!("Mode: {}  Model: {}", self.mode, self.model);
        println!("Type a prompt and press Enter. /help lists commands.");
        println!("Up/Down recall earlier prompts; Ctrl-C stops an answer.");
        println!();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /generate        - Plain generation");
        println!("  /rag             - Ground answers in stored context");
        println!("  /agent           - Send prompts to the agent");
        println!("  /model [NAME]    - Show or switch the model");
        println!("  /models          - List known models");
        println!("  /cancel          - Stop the answer being streamed");
        println!("  /quit, /exit, /q - Exit");
        println!();
    }

    fn handle_command(&mut self, cmd: &str) -> LineAction {
        let (name, arg) = match cmd.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (cmd, ""),
        };

        match name {
            "/quit" | "/exit" | "/q" => LineAction::Exit,
            "/help" | "/h" | "/?" => {
                Self::print_help();
                LineAction::Continue
            }
            "/generate" => self.switch_mode(GenerationMode::Generate),
            "/rag" => self.switch_mode(GenerationMode::RetrievalAugmented),
            "/agent" => self.switch_mode(GenerationMode::Agent),
            "/model" if arg.is_empty() => {
                println!("Current model: {}", self.model);
                LineAction::Continue
            }
            "/model" => {
                if let Ok(model) = arg.parse::<Model>() {
                    self.model = model;
                }
                println!("Model: {}", self.model);
                LineAction::Continue
            }
            "/models" => {
                println!("Known models:");
                for model in Model::supported() {
                    println!("  - {} ({})", model, model.display_name());
                }
                LineAction::Continue
            }
            "/cancel" => LineAction::Cancel,
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                LineAction::Continue
            }
        }
    }

    fn switch_mode(&mut self, mode: GenerationMode) -> LineAction {
        self.mode = mode;
        println!("Mode: {}", self.mode);
        LineAction::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::StreamExt;
    use ragdash_application::{
        BackendError, BackendRequest, ByteStream, Completion, StreamingBackend,
    };
    use ragdash_domain::SessionState;

    struct Offline;

    #[async_trait]
    impl StreamingBackend for Offline {
        async fn open_stream(&self, _: &BackendRequest) -> Result<ByteStream, BackendError> {
            Err(BackendError::Network("offline".to_string()))
        }

        async fn complete(&self, _: &BackendRequest) -> Result<Completion, BackendError> {
            Err(BackendError::Network("offline".to_string()))
        }
    }

    /// Accepts the request and never sends a byte.
    struct Stalled;

    #[async_trait]
    impl StreamingBackend for Stalled {
        async fn open_stream(&self, _: &BackendRequest) -> Result<ByteStream, BackendError> {
            Ok(futures::stream::pending().boxed())
        }

        async fn complete(&self, _: &BackendRequest) -> Result<Completion, BackendError> {
            Err(BackendError::Network("stalled".to_string()))
        }
    }

    fn repl() -> ChatRepl {
        ChatRepl::new(
            Arc::new(RequestDispatcher::new(Arc::new(Offline))),
            Model::Llama2,
        )
    }

    #[test]
    fn test_prompt_line_submits_with_current_mode_and_model() {
        let mut repl = repl().with_mode(GenerationMode::RetrievalAugmented);
        let action = repl.handle_line("  what is X  ");
        assert_eq!(
            action,
            LineAction::Submit(
                PromptRequest::retrieval_augmented("what is X", Model::Llama2).unwrap()
            )
        );
    }

    #[test]
    fn test_blank_line_is_ignored() {
        assert_eq!(repl().handle_line("   "), LineAction::Continue);
    }

    #[test]
    fn test_mode_and_model_commands() {
        let mut repl = repl();
        repl.handle_line("/agent");
        assert_eq!(repl.mode(), GenerationMode::Agent);
        repl.handle_line("/model llama3.2");
        assert_eq!(repl.model(), &Model::Llama32);
        repl.handle_line("/generate");

        match repl.handle_line("hello") {
            LineAction::Submit(request) => {
                assert_eq!(request.mode(), GenerationMode::Generate);
                assert_eq!(request.model(), &Model::Llama32);
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_exit_and_cancel_commands() {
        let mut repl = repl();
        assert_eq!(repl.handle_line("/quit"), LineAction::Exit);
        assert_eq!(repl.handle_line("/q"), LineAction::Exit);
        assert_eq!(repl.handle_line("/cancel"), LineAction::Cancel);
        assert_eq!(repl.handle_line("/bogus"), LineAction::Continue);
    }

    #[tokio::test]
    async fn test_interrupt_cancels_live_session_before_exiting() {
        let dispatcher = Arc::new(RequestDispatcher::new(Arc::new(Stalled)));
        let mut repl = ChatRepl::new(dispatcher, Model::Llama2);

        assert!(repl.apply(Input::Line("hello".to_string())));
        assert!(repl.has_live_session());

        assert!(repl.apply(Input::Interrupt));
        let session = repl.current.take().unwrap().wait().await.unwrap();
        assert_eq!(session.state(), &SessionState::Cancelled);

        assert!(!repl.apply(Input::Interrupt));
    }

    #[tokio::test]
    async fn test_new_line_supersedes_live_session() {
        let dispatcher = Arc::new(RequestDispatcher::new(Arc::new(Stalled)));
        let mut repl = ChatRepl::new(Arc::clone(&dispatcher), Model::Llama2);

        assert!(repl.apply(Input::Line("first".to_string())));
        let first = repl.current.take().unwrap();
        assert!(repl.apply(Input::Line("second".to_string())));

        let superseded = first.wait().await.unwrap();
        assert_eq!(superseded.state(), &SessionState::Cancelled);
        assert!(repl.has_live_session());
        dispatcher.shutdown();
    }

    #[test]
    fn test_prompt_label_follows_mode_and_model() {
        let mut repl = repl();
        repl.handle_line("/rag");
        repl.handle_line("/model llama3.2");
        assert_eq!(
            repl.prompt_label(),
            format!("{} {}", GenerationMode::RetrievalAugmented, Model::Llama32)
        );
        assert!(!repl.apply(Input::Eof));
    }
}
