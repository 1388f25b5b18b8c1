//! Console collaborators for the headless host
//!
//! Everything the user would see in an editor is written to the output as a
//! tagged JSON line. Questions are answered by the next input line.

use async_trait::async_trait;
use mongolens_core::{
    Clipboard, ConnectionChoice, ConnectionId, MongolensError, Notifier, Prompt, Result,
    SavedConnection, ShellLauncher,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::io::Write;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

type BoxedReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Line source shared by the command loop and the prompt
pub struct ConsoleInput {
    lines: tokio::sync::Mutex<Lines<BoxedReader>>,
}

impl ConsoleInput {
    pub fn new(reader: impl AsyncBufRead + Unpin + Send + 'static) -> Self {
        let reader: BoxedReader = Box::new(reader);
        Self {
            lines: tokio::sync::Mutex::new(reader.lines()),
        }
    }

    pub fn stdin() -> Self {
        Self::new(tokio::io::BufReader::new(tokio::io::stdin()))
    }

    /// The next line, or `None` at end of input
    pub async fn next_line(&self) -> Option<String> {
        match self.lines.lock().await.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "failed to read input");
                None
            }
        }
    }
}

/// Sink for output lines, one JSON value per line
pub struct ConsoleOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleOutput {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn emit(&self, line: &Value) {
        let mut writer = self.writer.lock();
        let written = writeln!(writer, "{line}").and_then(|()| writer.flush());
        if let Err(e) = written {
            tracing::error!(error = %e, "failed to write output");
        }
    }
}

pub struct ConsoleNotifier {
    output: Arc<ConsoleOutput>,
}

impl ConsoleNotifier {
    pub fn new(output: Arc<ConsoleOutput>) -> Self {
        Self { output }
    }

    fn notify(&self, level: &str, message: &str) {
        self.output.emit(&json!({ "notify": level, "message": message }));
    }
}

impl Notifier for ConsoleNotifier {
    fn show_information(&self, message: &str) {
        self.notify("info", message);
    }

    fn show_warning(&self, message: &str) {
        tracing::warn!(message, "warning shown");
        self.notify("warning", message);
    }

    fn show_error(&self, message: &str) {
        tracing::error!(message, "error shown");
        self.notify("error", message);
    }
}

pub struct ConsoleClipboard {
    output: Arc<ConsoleOutput>,
}

impl ConsoleClipboard {
    pub fn new(output: Arc<ConsoleOutput>) -> Self {
        Self { output }
    }
}

#[async_trait]
impl Clipboard for ConsoleClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        self.output.emit(&json!({ "clipboard": text }));
        Ok(())
    }
}

/// Prompt that prints the question and reads the answer from the next line
///
/// An empty line or the end of input dismisses the question.
pub struct ConsolePrompt {
    input: Arc<ConsoleInput>,
    output: Arc<ConsoleOutput>,
}

impl ConsolePrompt {
    pub fn new(input: Arc<ConsoleInput>, output: Arc<ConsoleOutput>) -> Self {
        Self { input, output }
    }

    async fn ask(&self, question: Value) -> Option<String> {
        self.output.emit(&question);
        let answer = self.input.next_line().await?;
        let answer = answer.trim();
        (!answer.is_empty()).then(|| answer.to_string())
    }
}

#[async_trait]
impl Prompt for ConsolePrompt {
    async fn input_box(&self, prompt: &str, placeholder: Option<&str>) -> Option<String> {
        self.ask(json!({ "prompt": prompt, "placeholder": placeholder }))
            .await
    }

    async fn confirm(&self, message: &str) -> bool {
        let answer = self.ask(json!({ "confirm": message })).await;
        matches!(
            answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y" | "yes" | "true")
        )
    }

    async fn pick_connection(
        &self,
        choices: &[SavedConnection],
        active: Option<&ConnectionId>,
    ) -> Option<ConnectionChoice> {
        let listed: Vec<Value> = choices
            .iter()
            .map(|c| json!({ "id": c.id, "name": c.name }))
            .collect();
        let answer = self
            .ask(json!({ "pick": listed, "active": active }))
            .await?;
        if answer == "disconnect" {
            return Some(ConnectionChoice::Disconnect);
        }
        choices
            .iter()
            .find(|c| c.id.as_str() == answer || c.name == answer)
            .map(|c| ConnectionChoice::Connection(c.id.clone()))
    }
}

/// Starts the configured shell with the connection string as its argument
///
/// The shell gets no stdin and writes to stderr, since stdin and stdout carry
/// the command protocol.
pub struct ProcessShellLauncher {
    program: String,
}

impl ProcessShellLauncher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ShellLauncher for ProcessShellLauncher {
    #[tracing::instrument(skip_all, fields(program = %self.program))]
    async fn launch(&self, connection_string: &str) -> Result<bool> {
        let child = self.spawn(connection_string)?;
        tracing::info!(pid = child.id(), "shell started");
        Ok(true)
    }
}

impl ProcessShellLauncher {
    fn spawn(&self, connection_string: &str) -> Result<tokio::process::Child> {
        tokio::process::Command::new(&self.program)
            .arg(connection_string)
            .stdin(Stdio::null())
            .stdout(std::io::stderr())
            .spawn()
            .map_err(|e| MongolensError::Other(format!("failed to start {}: {e}", self.program)))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use parking_lot::Mutex;
    use serde_json::Value;
    use std::io::Write;
    use std::sync::Arc;

    /// Write target that tests can read back
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn lines(&self) -> Vec<Value> {
            String::from_utf8(self.0.lock().clone())
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
