// Environment Classifier
// Ordered heuristic chain over one interpreter path: cheap filesystem
// checks first, process spawns last, short-circuit on the first match.
// No step ever raises; the whole chain degrades to Unknown.

use crate::domain::{Detection, EnvironmentKind};
use crate::port::{
    FileProbe, PipEnvMatcher, ProcessError, ProcessRunner, SpawnOptions, WorkspaceResolver,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Inline probe: `sys.real_prefix` exists under virtualenv, while venv
/// leaves `sys.base_prefix != sys.prefix`. Prints nothing for a plain
/// interpreter.
const VIRTUAL_ENV_PROBE: &str = "import sys\nif hasattr(sys, \"real_prefix\"):\n  print(\"virtualenv\")\nelif hasattr(sys, \"base_prefix\") and sys.base_prefix != sys.prefix:\n  print(\"venv\")";

/// Marker file written by venv (and virtualenv >= 20).
const VENV_MARKER: &str = "pyvenv.cfg";

/// Classifies the environment kind of a given interpreter binary.
///
/// Instances are meant to be long-lived: the pyenv root is memoized per
/// instance after the first successful `pyenv root`, while a failed probe
/// leaves the cell empty and is retried on the next call.
pub struct EnvironmentClassifier {
    runner: Arc<dyn ProcessRunner>,
    file_probe: Arc<dyn FileProbe>,
    workspace: Arc<dyn WorkspaceResolver>,
    pipenv: Arc<dyn PipEnvMatcher>,
    pyenv_root: OnceCell<String>,
}

impl EnvironmentClassifier {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        file_probe: Arc<dyn FileProbe>,
        workspace: Arc<dyn WorkspaceResolver>,
        pipenv: Arc<dyn PipEnvMatcher>,
    ) -> Self {
        Self {
            runner,
            file_probe,
            workspace,
            pipenv,
            pyenv_root: OnceCell::new(),
        }
    }

    /// Classify `interpreter_path`, optionally scoped to a resource for
    /// workspace-dependent checks.
    ///
    /// Never fails: every probe error inside a step counts as "no signal"
    /// and the chain moves on, bottoming out at `Unknown`. Conda
    /// environments are deliberately never positively detected and also
    /// land on `Unknown`.
    pub async fn classify(
        &self,
        interpreter_path: &str,
        resource: Option<&Path>,
    ) -> EnvironmentKind {
        if let Detection::Matched(kind) = self.check_venv_marker(interpreter_path).await {
            return kind;
        }
        if let Detection::Matched(kind) = self.check_pyenv_root(interpreter_path).await {
            return kind;
        }
        if let Detection::Matched(kind) = self.check_pipenv(interpreter_path, resource).await {
            return kind;
        }
        if let Detection::Matched(kind) = self.check_virtual_env_attrs(interpreter_path).await {
            return kind;
        }
        EnvironmentKind::Unknown
    }

    /// Raw output of the virtualenv/venv attribute probe: "virtualenv",
    /// "venv", or "" (including on any spawn failure).
    ///
    /// This is the unrefined signal behind step 4 of `classify`, exposed
    /// for callers that want the finer distinction.
    pub async fn environment_name(&self, interpreter_path: &str) -> String {
        let args = vec!["-c".to_string(), VIRTUAL_ENV_PROBE.to_string()];
        match self.runner.exec(interpreter_path, &args, SpawnOptions::default()).await {
            Ok(output) => output.stdout.trim().to_string(),
            Err(err) => {
                debug!(interpreter = %interpreter_path, error = %err, "virtualenv attribute probe failed");
                String::new()
            }
        }
    }

    /// Step 1: `pyvenv.cfg` next to the interpreter's directory or one
    /// level above it. Two candidates because binaries sit at different
    /// depths relative to the marker depending on platform layout.
    async fn check_venv_marker(&self, interpreter_path: &str) -> Detection {
        let Some(dir) = Path::new(interpreter_path).parent() else {
            return Detection::NoSignal;
        };
        let mut candidates = vec![dir.join(VENV_MARKER)];
        if let Some(above) = dir.parent() {
            candidates.push(above.join(VENV_MARKER));
        }
        for candidate in candidates {
            if self.file_probe.file_exists(&candidate).await {
                return Detection::Matched(EnvironmentKind::Venv);
            }
        }
        Detection::NoSignal
    }

    /// Step 2: interpreter path under the pyenv root.
    async fn check_pyenv_root(&self, interpreter_path: &str) -> Detection {
        match self.pyenv_root().await {
            Some(root) if !root.is_empty() && interpreter_path.starts_with(&root) => {
                Detection::Matched(EnvironmentKind::Pyenv)
            }
            _ => Detection::NoSignal,
        }
    }

    /// Step 3: pipenv relation against the resolved workspace root. The
    /// step is skipped outright when no workspace root resolves.
    async fn check_pipenv(&self, interpreter_path: &str, resource: Option<&Path>) -> Detection {
        let Some(root) = self.workspace_root(resource) else {
            return Detection::NoSignal;
        };
        if self.pipenv.is_related_pipenv(interpreter_path, &root).await {
            Detection::Matched(EnvironmentKind::PipEnv)
        } else {
            Detection::NoSignal
        }
    }

    /// Step 4: generic attribute probe. The finer venv/virtualenv string
    /// the probe just produced is collapsed to `VirtualEnv` here: true
    /// venvs were already identified by the marker file in step 1.
    async fn check_virtual_env_attrs(&self, interpreter_path: &str) -> Detection {
        if self.environment_name(interpreter_path).await.is_empty() {
            Detection::NoSignal
        } else {
            Detection::Matched(EnvironmentKind::VirtualEnv)
        }
    }

    /// Owning folder of `resource`, falling back to the first workspace
    /// folder when there is no resource or it sits outside every folder.
    fn workspace_root(&self, resource: Option<&Path>) -> Option<PathBuf> {
        resource
            .and_then(|r| self.workspace.workspace_folder(r))
            .or_else(|| self.workspace.first_workspace_folder())
    }

    /// Memoized `pyenv root`. Success is cached for the lifetime of the
    /// classifier; failure is reported as `None` and retried on the next
    /// call.
    async fn pyenv_root(&self) -> Option<String> {
        let runner = Arc::clone(&self.runner);
        let result = self
            .pyenv_root
            .get_or_try_init(|| async move {
                let output = runner
                    .exec("pyenv", &["root".to_string()], SpawnOptions::default())
                    .await?;
                Ok::<String, ProcessError>(output.stdout.trim().to_string())
            })
            .await;

        match result {
            Ok(root) => Some(root.clone()),
            Err(err) => {
                debug!(error = %err, "pyenv root probe failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::file_probe::mocks::MockFileProbe;
    use crate::port::pipenv_matcher::mocks::MockPipEnvMatcher;
    use crate::port::process_runner::mocks::MockProcessRunner;
    use crate::port::workspace_resolver::mocks::MockWorkspaceResolver;

    struct Fixture {
        runner: Arc<MockProcessRunner>,
        file_probe: Arc<MockFileProbe>,
        pipenv: Arc<MockPipEnvMatcher>,
        classifier: EnvironmentClassifier,
    }

    fn fixture(folders: Vec<PathBuf>, pipenv_matches: bool) -> Fixture {
        let runner = Arc::new(MockProcessRunner::new());
        let file_probe = Arc::new(MockFileProbe::new());
        let pipenv = Arc::new(MockPipEnvMatcher::new(pipenv_matches));
        let classifier = EnvironmentClassifier::new(
            runner.clone(),
            file_probe.clone(),
            Arc::new(MockWorkspaceResolver::new(folders)),
            pipenv.clone(),
        );
        Fixture {
            runner,
            file_probe,
            pipenv,
            classifier,
        }
    }

    #[tokio::test]
    async fn test_marker_beside_bin_dir_wins() {
        let fx = fixture(vec![], false);
        fx.file_probe.add("/opt/venvs/foo/bin/pyvenv.cfg");

        let kind = fx.classifier.classify("/opt/venvs/foo/bin/python", None).await;
        assert_eq!(kind, EnvironmentKind::Venv);
        // Cheapest step matched: nothing was spawned.
        assert_eq!(fx.runner.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_marker_one_level_above_wins() {
        let fx = fixture(vec![], false);
        fx.file_probe.add("/opt/venvs/foo/pyvenv.cfg");

        let kind = fx.classifier.classify("/opt/venvs/foo/bin/python", None).await;
        assert_eq!(kind, EnvironmentKind::Venv);
    }

    #[tokio::test]
    async fn test_marker_shortcircuits_pyenv_and_pipenv() {
        let fx = fixture(vec![PathBuf::from("/work")], true);
        fx.file_probe.add("/home/u/.pyenv/versions/3.9/pyvenv.cfg");
        fx.runner.on_success("pyenv", None, "/home/u/.pyenv\n");

        let kind = fx
            .classifier
            .classify("/home/u/.pyenv/versions/3.9/bin/python", None)
            .await;
        assert_eq!(kind, EnvironmentKind::Venv);
        assert_eq!(fx.runner.call_count_for("pyenv"), 0);
        assert_eq!(fx.pipenv.call_count(), 0);
    }

    #[tokio::test]
    async fn test_pyenv_root_prefix_matches() {
        let fx = fixture(vec![], false);
        fx.runner.on_success("pyenv", None, "/home/u/.pyenv\n");

        let kind = fx
            .classifier
            .classify("/home/u/.pyenv/versions/3.9/bin/python", None)
            .await;
        assert_eq!(kind, EnvironmentKind::Pyenv);
    }

    #[tokio::test]
    async fn test_pyenv_root_is_memoized_after_success() {
        let fx = fixture(vec![], false);
        fx.runner.on_success("pyenv", None, "/home/u/.pyenv\n");

        let first = fx
            .classifier
            .classify("/home/u/.pyenv/versions/3.9/bin/python", None)
            .await;
        let second = fx
            .classifier
            .classify("/home/u/.pyenv/versions/3.8/bin/python", None)
            .await;

        assert_eq!(first, EnvironmentKind::Pyenv);
        assert_eq!(second, EnvironmentKind::Pyenv);
        assert_eq!(fx.runner.call_count_for("pyenv"), 1);
    }

    #[tokio::test]
    async fn test_pyenv_root_failure_is_retried() {
        let fx = fixture(vec![], false);

        // First pass: `pyenv` not available, everything else silent.
        let kind = fx.classifier.classify("/home/u/.pyenv/bin/python", None).await;
        assert_eq!(kind, EnvironmentKind::Unknown);
        assert_eq!(fx.runner.call_count_for("pyenv"), 1);

        // pyenv appears on PATH; the next call probes again and succeeds.
        fx.runner.on_success("pyenv", None, "/home/u/.pyenv\n");
        let kind = fx.classifier.classify("/home/u/.pyenv/bin/python", None).await;
        assert_eq!(kind, EnvironmentKind::Pyenv);
        assert_eq!(fx.runner.call_count_for("pyenv"), 2);

        // Third call reuses the memoized root.
        let _ = fx.classifier.classify("/home/u/.pyenv/bin/python", None).await;
        assert_eq!(fx.runner.call_count_for("pyenv"), 2);
    }

    #[tokio::test]
    async fn test_pipenv_uses_owning_workspace_folder() {
        let fx = fixture(vec![PathBuf::from("/work/a"), PathBuf::from("/work/b")], true);

        let kind = fx
            .classifier
            .classify("/venvs/a-x1/bin/python", Some(Path::new("/work/b/src/main.py")))
            .await;
        assert_eq!(kind, EnvironmentKind::PipEnv);
        assert_eq!(fx.pipenv.asked_roots(), vec![PathBuf::from("/work/b")]);
    }

    #[tokio::test]
    async fn test_pipenv_falls_back_to_first_folder() {
        let fx = fixture(vec![PathBuf::from("/work/a"), PathBuf::from("/work/b")], true);

        // Resource outside every folder: first folder is used.
        let kind = fx
            .classifier
            .classify("/venvs/a-x1/bin/python", Some(Path::new("/elsewhere/x.py")))
            .await;
        assert_eq!(kind, EnvironmentKind::PipEnv);
        assert_eq!(fx.pipenv.asked_roots(), vec![PathBuf::from("/work/a")]);
    }

    #[tokio::test]
    async fn test_pipenv_skipped_without_workspace() {
        let fx = fixture(vec![], true);

        let kind = fx.classifier.classify("/venvs/a-x1/bin/python", None).await;
        assert_eq!(kind, EnvironmentKind::Unknown);
        assert_eq!(fx.pipenv.call_count(), 0);
    }

    #[tokio::test]
    async fn test_attribute_probe_collapses_to_virtualenv() {
        let fx = fixture(vec![], false);
        fx.runner
            .on_success("/opt/env/bin/python", Some("real_prefix"), "venv\n");

        let kind = fx.classifier.classify("/opt/env/bin/python", None).await;
        assert_eq!(kind, EnvironmentKind::VirtualEnv);

        // The unrefined signal stays reachable.
        assert_eq!(fx.classifier.environment_name("/opt/env/bin/python").await, "venv");
    }

    #[tokio::test]
    async fn test_everything_failing_is_unknown() {
        let fx = fixture(vec![], false);
        let kind = fx.classifier.classify("/does/not/exist/python", None).await;
        assert_eq!(kind, EnvironmentKind::Unknown);
    }

    #[tokio::test]
    async fn test_environment_name_empty_on_spawn_failure() {
        let fx = fixture(vec![], false);
        assert_eq!(fx.classifier.environment_name("/no/python").await, "");
    }
}
