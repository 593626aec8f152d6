// Interpreter Executor
// Wraps one resolved interpreter path + environment. Metadata probing is
// best-effort and never fails the caller; execution is authoritative and
// propagates typed errors.

pub mod factory;

pub use factory::ExecutorFactory;

use crate::domain::{
    Architecture, EnvironmentVariables, InterpreterMetadata, PythonVersionInfo,
};
use crate::error::{AppError, Result};
use crate::port::{
    ExecutionResult, FileProbe, ObservableExecution, PathResolver, ProcessError, ProcessRunner,
    SpawnOptions,
};
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Bundled introspection script; prints exactly one JSON line.
const INTERPRETER_INFO_SCRIPT: &str = include_str!("../../../python/interpreter_info.py");

/// JSON document printed by the introspection script.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InterpreterInfoJson {
    version_info: PythonVersionInfo,
    sys_prefix: String,
    sys_version: String,
    is64_bit: bool,
}

/// Executes code against one bound interpreter.
///
/// The bound path is resolved through the `PathResolver` on every call, so
/// a resource-bound executor can change interpreters between calls when
/// the underlying configuration changes. Instances are cheap, stateless
/// beyond the binding, and need no teardown.
pub struct InterpreterExecutor {
    runner: Arc<dyn ProcessRunner>,
    file_probe: Arc<dyn FileProbe>,
    path_resolver: Arc<dyn PathResolver>,
    env_vars: Option<EnvironmentVariables>,
}

impl InterpreterExecutor {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        file_probe: Arc<dyn FileProbe>,
        path_resolver: Arc<dyn PathResolver>,
        env_vars: Option<EnvironmentVariables>,
    ) -> Self {
        Self {
            runner,
            file_probe,
            path_resolver,
            env_vars,
        }
    }

    /// Interpreter path this executor is currently bound to.
    pub fn interpreter_path(&self) -> String {
        self.path_resolver.resolve()
    }

    /// Best-effort metadata probe.
    ///
    /// Runs the `--version` probe and the bundled introspection script
    /// concurrently. Any failure (spawn error, malformed JSON, missing
    /// interpreter) is logged and collapsed to `None`; a workflow that can
    /// tolerate missing metadata must never be aborted by this call.
    pub async fn probe_metadata(&self) -> Option<InterpreterMetadata> {
        let path = self.interpreter_path();
        match self.probe_metadata_inner(&path).await {
            Ok(metadata) => Some(metadata),
            Err(err) => {
                warn!(interpreter = %path, error = %err, "Failed to probe interpreter metadata");
                None
            }
        }
    }

    async fn probe_metadata_inner(&self, path: &str) -> Result<InterpreterMetadata> {
        let script = stage_introspection_script()?;
        let script_path = script.path().to_string_lossy().to_string();

        let version_args = ["--version".to_string()];
        let info_args = [script_path];
        let version_probe = self
            .runner
            .exec(path, &version_args, SpawnOptions::merged());
        let info_probe = self.runner.exec(path, &info_args, SpawnOptions::merged());
        let (version_out, info_out) = tokio::join!(version_probe, info_probe);

        let version = version_out?.stdout.trim().to_string();
        let info: InterpreterInfoJson = serde_json::from_str(info_out?.stdout.trim())?;

        Ok(InterpreterMetadata {
            architecture: if info.is64_bit {
                Architecture::X64
            } else {
                Architecture::X86
            },
            path: path.to_string(),
            version,
            sys_version: info.sys_version,
            version_info: info.version_info,
            sys_prefix: info.sys_prefix,
        })
    }

    /// Real executable behind the bound path.
    ///
    /// Returns the bound path unchanged when it exists on disk, without
    /// spawning anything (a versioned shim and its resolved executable can
    /// otherwise disagree, e.g. /usr/bin/python2.7 on macOS). Only when
    /// the file check is negative does it ask the interpreter itself.
    ///
    /// # Errors
    /// `ProcessError` when the interpreter cannot be spawned or writes to
    /// stderr.
    pub async fn resolve_executable_path(&self) -> std::result::Result<String, ProcessError> {
        let path = self.interpreter_path();
        if self.file_probe.file_exists(Path::new(&path)).await {
            return Ok(path);
        }

        let output = self
            .runner
            .exec(
                &path,
                &[
                    "-c".to_string(),
                    "import sys;print(sys.executable)".to_string(),
                ],
                SpawnOptions::strict_stderr(self.env_vars.clone()),
            )
            .await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Whether `import <module>` succeeds under the bound interpreter.
    ///
    /// Collapses every failure to `false`: this probe cannot distinguish a
    /// missing module from a broken interpreter, which is exactly why
    /// `execute_module` uses it only as a confirmation.
    pub async fn is_module_installed(&self, module: &str) -> bool {
        let path = self.interpreter_path();
        self.runner
            .exec(
                &path,
                &["-c".to_string(), format!("import {}", module)],
                SpawnOptions::strict_stderr(self.env_vars.clone()),
            )
            .await
            .is_ok()
    }

    /// Run the interpreter with the given arguments.
    pub async fn execute(&self, args: &[String], options: SpawnOptions) -> Result<ExecutionResult> {
        let path = self.interpreter_path();
        Ok(self
            .runner
            .exec(&path, args, self.with_bound_env(options))
            .await?)
    }

    /// Run `-m <module>` with the given arguments.
    ///
    /// A stderr line that looks like a missing-module import error is not
    /// trusted on its own: a module's own code can raise ImportError-shaped
    /// text for unrelated reasons. The miss is confirmed with
    /// `is_module_installed` before `AppError::ModuleNotInstalled` is
    /// raised; if the confirmation says the module is there, the original
    /// result is returned with its stderr intact.
    pub async fn execute_module(
        &self,
        module: &str,
        args: &[String],
        options: SpawnOptions,
    ) -> Result<ExecutionResult> {
        let path = self.interpreter_path();
        let result = self
            .runner
            .exec(&path, &module_args(module, args), self.with_bound_env(options))
            .await?;

        if !module.is_empty() && output_has_module_not_installed(module, &result.stderr) {
            debug!(module = %module, "stderr looks like a missing module, confirming");
            if !self.is_module_installed(module).await {
                return Err(AppError::ModuleNotInstalled(module.to_string()));
            }
        }

        Ok(result)
    }

    /// Run with live output streaming. Exit status arrives through the
    /// stream's terminal event.
    pub async fn execute_observable(
        &self,
        args: &[String],
        options: SpawnOptions,
    ) -> ObservableExecution {
        let path = self.interpreter_path();
        self.runner
            .exec_observable(&path, args, self.with_bound_env(options))
            .await
    }

    /// Run `-m <module>` with live output streaming.
    pub async fn execute_module_observable(
        &self,
        module: &str,
        args: &[String],
        options: SpawnOptions,
    ) -> ObservableExecution {
        let path = self.interpreter_path();
        self.runner
            .exec_observable(&path, &module_args(module, args), self.with_bound_env(options))
            .await
    }

    /// Bound env vars replace whatever the caller supplied per call.
    fn with_bound_env(&self, mut options: SpawnOptions) -> SpawnOptions {
        if self.env_vars.is_some() {
            options.env = self.env_vars.clone();
        }
        options
    }
}

fn module_args(module: &str, args: &[String]) -> Vec<String> {
    let mut full = Vec::with_capacity(args.len() + 2);
    full.push("-m".to_string());
    full.push(module.to_string());
    full.extend_from_slice(args);
    full
}

/// Missing-module pattern on stderr. Python prints either
/// `No module named foo` (2.x) or `No module named 'foo'` (3.x).
fn output_has_module_not_installed(module: &str, stderr: &str) -> bool {
    stderr.contains(&format!("No module named {}", module))
        || stderr.contains(&format!("No module named '{}'", module))
}

/// Materialize the bundled introspection script for one probe call. The
/// returned handle keeps the file alive until the probe finishes.
fn stage_introspection_script() -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("interpreter_info")
        .suffix(".py")
        .tempfile()?;
    file.write_all(INTERPRETER_INFO_SCRIPT.as_bytes())?;
    file.flush()?;
    Ok(file)
}
