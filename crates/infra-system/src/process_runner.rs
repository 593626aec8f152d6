// Tokio-backed process runner
// Spawns child processes with piped stdio; buffered and line-streaming
// modes share the same command construction.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use pyrun_core::port::{
    ExecutionResult, ObservableExecution, ProcessError, ProcessEvent, ProcessRunner, SpawnOptions,
};

/// Production ProcessRunner on top of tokio::process.
#[derive(Debug, Default, Clone)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(file: &str, args: &[String], options: &SpawnOptions) -> Command {
        let mut cmd = Command::new(file);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(env) = &options.env {
            // Bound environment variables replace the ambient environment.
            cmd.env_clear();
            cmd.envs(env);
        }
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn exec(
        &self,
        file: &str,
        args: &[String],
        options: SpawnOptions,
    ) -> Result<ExecutionResult, ProcessError> {
        debug!(file = %file, args = ?args, "Spawning buffered process");
        let child = Self::command(file, args, &options)
            .spawn()
            .map_err(|e| ProcessError::SpawnFailed {
                file: file.to_string(),
                message: e.to_string(),
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ProcessError::Io {
                file: file.to_string(),
                message: e.to_string(),
            })?;

        let mut stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let mut stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if options.merge_stdout_stderr {
            stdout.push_str(&stderr);
            stderr = String::new();
        }
        if options.throw_on_stderr && !stderr.trim().is_empty() {
            return Err(ProcessError::StdErr {
                file: file.to_string(),
                stderr,
            });
        }

        Ok(ExecutionResult { stdout, stderr })
    }

    async fn exec_observable(
        &self,
        file: &str,
        args: &[String],
        options: SpawnOptions,
    ) -> ObservableExecution {
        debug!(file = %file, args = ?args, "Spawning observable process");
        let (tx, handle) = ObservableExecution::channel();

        let mut child = match Self::command(file, args, &options).spawn() {
            Ok(child) => child,
            Err(e) => {
                let _ = tx.send(ProcessEvent::Exited(Err(ProcessError::SpawnFailed {
                    file: file.to_string(),
                    message: e.to_string(),
                })));
                return handle;
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let merge = options.merge_stdout_stderr;
        let file_name = file.to_string();

        tokio::spawn(async move {
            let stdout_task = stdout.map(|pipe| {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut lines = BufReader::new(pipe).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        if tx.send(ProcessEvent::Stdout(line)).is_err() {
                            break;
                        }
                    }
                })
            });
            let stderr_task = stderr.map(|pipe| {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut lines = BufReader::new(pipe).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        let event = if merge {
                            ProcessEvent::Stdout(line)
                        } else {
                            ProcessEvent::Stderr(line)
                        };
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                })
            });

            // Both pipes must be drained before the exit status is read,
            // or late output would arrive after the terminal event.
            if let Some(task) = stdout_task {
                let _ = task.await;
            }
            if let Some(task) = stderr_task {
                let _ = task.await;
            }

            let terminal = match child.wait().await {
                Ok(status) if status.success() => Ok(()),
                Ok(status) => Err(ProcessError::ExitedWithCode {
                    file: file_name.clone(),
                    code: status.code().unwrap_or(-1),
                }),
                Err(e) => Err(ProcessError::Io {
                    file: file_name.clone(),
                    message: e.to_string(),
                }),
            };
            let _ = tx.send(ProcessEvent::Exited(terminal));
        });

        handle
    }
}
