// Process Runner Port
// Abstraction for spawning external processes (the interpreter itself,
// plus the `pyenv` binary).
//
// Implementations:
// - TokioProcessRunner: real child processes (infra-system)
// - MockProcessRunner: canned responses for tests

use crate::domain::EnvironmentVariables;
use async_trait::async_trait;
use futures::Stream;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;

/// Options applied to a single spawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnOptions {
    /// Replaces the ambient process environment when set.
    pub env: Option<EnvironmentVariables>,
    pub cwd: Option<PathBuf>,
    /// Fold stderr into stdout. Needed for version probes: some
    /// interpreters print their banner to stderr.
    pub merge_stdout_stderr: bool,
    /// Treat any non-empty stderr as a failure regardless of exit code.
    pub throw_on_stderr: bool,
}

impl SpawnOptions {
    pub fn merged() -> Self {
        Self {
            merge_stdout_stderr: true,
            ..Default::default()
        }
    }

    pub fn strict_stderr(env: Option<EnvironmentVariables>) -> Self {
        Self {
            env,
            throw_on_stderr: true,
            ..Default::default()
        }
    }
}

/// Captured output of a buffered execution.
///
/// There is no exit-code field: a buffered exec fails only through
/// `ProcessError` (spawn failure, or stderr under `throw_on_stderr`), so a
/// non-zero exit with useful stderr still reaches the caller as data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
}

/// Process execution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Failed to spawn '{file}': {message}")]
    SpawnFailed { file: String, message: String },

    #[error("Process '{file}' wrote to stderr: {stderr}")]
    StdErr { file: String, stderr: String },

    #[error("Process '{file}' exited with code {code}")]
    ExitedWithCode { file: String, code: i32 },

    #[error("IO error while running '{file}': {message}")]
    Io { file: String, message: String },
}

/// One event on an observable execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// A line captured from stdout.
    Stdout(String),
    /// A line captured from stderr.
    Stderr(String),
    /// Terminal event: `Ok(())` for exit code zero, `Err` otherwise.
    /// Spawn failures arrive here too, never as a return value.
    Exited(Result<(), ProcessError>),
}

/// Live handle to a streaming execution.
///
/// The channel buffers, so a consumer may start reading before or after
/// the process produces output. Dropping the handle does not kill the
/// underlying process.
pub struct ObservableExecution {
    events: mpsc::UnboundedReceiver<ProcessEvent>,
}

impl ObservableExecution {
    pub fn new(events: mpsc::UnboundedReceiver<ProcessEvent>) -> Self {
        Self { events }
    }

    /// Producer-side constructor: a sender for the spawning task and the
    /// handle for the consumer.
    pub fn channel() -> (mpsc::UnboundedSender<ProcessEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx))
    }

    /// Next event, or `None` once the producer is done.
    pub async fn next_event(&mut self) -> Option<ProcessEvent> {
        self.events.recv().await
    }

    /// Drain the stream into a buffered result, surfacing the terminal
    /// error if the process failed.
    pub async fn wait(mut self) -> Result<ExecutionResult, ProcessError> {
        let mut result = ExecutionResult::default();
        while let Some(event) = self.events.recv().await {
            match event {
                ProcessEvent::Stdout(line) => {
                    result.stdout.push_str(&line);
                    result.stdout.push('\n');
                }
                ProcessEvent::Stderr(line) => {
                    result.stderr.push_str(&line);
                    result.stderr.push('\n');
                }
                ProcessEvent::Exited(Ok(())) => break,
                ProcessEvent::Exited(Err(err)) => return Err(err),
            }
        }
        Ok(result)
    }
}

impl Stream for ObservableExecution {
    type Item = ProcessEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

/// Process runner trait
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Execute `file` with `args` and capture its output.
    ///
    /// # Errors
    /// - `ProcessError::SpawnFailed` if the binary cannot be started
    /// - `ProcessError::StdErr` when `throw_on_stderr` is set and stderr
    ///   came back non-empty
    async fn exec(
        &self,
        file: &str,
        args: &[String],
        options: SpawnOptions,
    ) -> Result<ExecutionResult, ProcessError>;

    /// Execute with live output streaming. All failures, including spawn
    /// failures, are delivered through the stream's terminal event.
    async fn exec_observable(
        &self,
        file: &str,
        args: &[String],
        options: SpawnOptions,
    ) -> ObservableExecution;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// One recorded invocation of the mock.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub file: String,
        pub args: Vec<String>,
        pub options: SpawnOptions,
    }

    /// Canned response rule: matches on binary name plus an optional
    /// fragment that must appear in one of the arguments.
    struct Rule {
        file: String,
        arg_fragment: Option<String>,
        outcome: Result<ExecutionResult, ProcessError>,
    }

    /// Mock ProcessRunner answering from registered rules.
    ///
    /// Unmatched calls fail with `SpawnFailed`, which makes "interpreter
    /// missing" the default world state. Every call is recorded for count
    /// and argument assertions.
    pub struct MockProcessRunner {
        rules: Mutex<Vec<Rule>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockProcessRunner {
        pub fn new() -> Self {
            Self {
                rules: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Register a successful response with the given stdout.
        pub fn on_success(&self, file: &str, arg_fragment: Option<&str>, stdout: &str) {
            self.on_outcome(
                file,
                arg_fragment,
                Ok(ExecutionResult {
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                }),
            );
        }

        /// Register a response with both output streams populated.
        pub fn on_output(&self, file: &str, arg_fragment: Option<&str>, stdout: &str, stderr: &str) {
            self.on_outcome(
                file,
                arg_fragment,
                Ok(ExecutionResult {
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                }),
            );
        }

        /// Register a failing response.
        pub fn on_failure(&self, file: &str, arg_fragment: Option<&str>, error: ProcessError) {
            self.on_outcome(file, arg_fragment, Err(error));
        }

        fn on_outcome(
            &self,
            file: &str,
            arg_fragment: Option<&str>,
            outcome: Result<ExecutionResult, ProcessError>,
        ) {
            self.rules.lock().unwrap().push(Rule {
                file: file.to_string(),
                arg_fragment: arg_fragment.map(|f| f.to_string()),
                outcome,
            });
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count_for(&self, file: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| call.file == file)
                .count()
        }

        pub fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn record(&self, file: &str, args: &[String], options: &SpawnOptions) {
            self.calls.lock().unwrap().push(RecordedCall {
                file: file.to_string(),
                args: args.to_vec(),
                options: options.clone(),
            });
        }

        fn lookup(&self, file: &str, args: &[String]) -> Result<ExecutionResult, ProcessError> {
            let rules = self.rules.lock().unwrap();
            for rule in rules.iter() {
                if rule.file != file {
                    continue;
                }
                if let Some(fragment) = &rule.arg_fragment {
                    if !args.iter().any(|arg| arg.contains(fragment.as_str())) {
                        continue;
                    }
                }
                return rule.outcome.clone();
            }
            Err(ProcessError::SpawnFailed {
                file: file.to_string(),
                message: "no mock rule matched".to_string(),
            })
        }
    }

    impl Default for MockProcessRunner {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ProcessRunner for MockProcessRunner {
        async fn exec(
            &self,
            file: &str,
            args: &[String],
            options: SpawnOptions,
        ) -> Result<ExecutionResult, ProcessError> {
            self.record(file, args, &options);
            self.lookup(file, args)
        }

        async fn exec_observable(
            &self,
            file: &str,
            args: &[String],
            options: SpawnOptions,
        ) -> ObservableExecution {
            self.record(file, args, &options);
            let (tx, handle) = ObservableExecution::channel();
            match self.lookup(file, args) {
                Ok(result) => {
                    for line in result.stdout.lines() {
                        let _ = tx.send(ProcessEvent::Stdout(line.to_string()));
                    }
                    for line in result.stderr.lines() {
                        let _ = tx.send(ProcessEvent::Stderr(line.to_string()));
                    }
                    let _ = tx.send(ProcessEvent::Exited(Ok(())));
                }
                Err(err) => {
                    let _ = tx.send(ProcessEvent::Exited(Err(err)));
                }
            }
            handle
        }
    }

}
