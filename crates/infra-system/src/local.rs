// Local default collaborators
// Narrow stand-ins for the IDE-side services the core treats as ports:
// configuration, environment variables, workspace folders and the pipenv
// relation. Good enough for CLI wiring and tests against real disks.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use pyrun_core::domain::EnvironmentVariables;
use pyrun_core::error::Result;
use pyrun_core::port::{ConfigSource, EnvVarResolver, PipEnvMatcher, WorkspaceResolver};

/// Fixed default interpreter path, regardless of resource scope.
pub struct StaticConfigSource {
    interpreter_path: String,
}

impl StaticConfigSource {
    pub fn new(interpreter_path: impl Into<String>) -> Self {
        Self {
            interpreter_path: interpreter_path.into(),
        }
    }
}

impl ConfigSource for StaticConfigSource {
    fn interpreter_path(&self, _resource: Option<&Path>) -> String {
        self.interpreter_path.clone()
    }
}

/// Snapshot of the ambient process environment.
#[derive(Debug, Default, Clone)]
pub struct AmbientEnvVarResolver;

#[async_trait]
impl EnvVarResolver for AmbientEnvVarResolver {
    async fn resolve(&self, _resource: Option<&Path>) -> Result<EnvironmentVariables> {
        Ok(std::env::vars().collect())
    }
}

/// Workspace resolver over an explicit folder list.
pub struct DirWorkspaceResolver {
    folders: Vec<PathBuf>,
}

impl DirWorkspaceResolver {
    pub fn new(folders: Vec<PathBuf>) -> Self {
        Self { folders }
    }
}

impl WorkspaceResolver for DirWorkspaceResolver {
    fn workspace_folder(&self, resource: &Path) -> Option<PathBuf> {
        self.folders
            .iter()
            .find(|folder| resource.starts_with(folder))
            .cloned()
    }

    fn first_workspace_folder(&self) -> Option<PathBuf> {
        self.folders.first().cloned()
    }
}

/// Pipenv relation heuristic.
///
/// The workspace must carry a `Pipfile`, and pipenv's `<dirname>-<hash>`
/// virtualenv naming must show up in the interpreter path.
#[derive(Debug, Default, Clone)]
pub struct PipfileMatcher;

#[async_trait]
impl PipEnvMatcher for PipfileMatcher {
    async fn is_related_pipenv(&self, interpreter_path: &str, workspace_root: &Path) -> bool {
        let has_pipfile = tokio::fs::metadata(workspace_root.join("Pipfile"))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !has_pipfile {
            return false;
        }
        workspace_root
            .file_name()
            .map(|name| interpreter_path.contains(&format!("{}-", name.to_string_lossy())))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_workspace_folder_prefers_owning_folder() {
        let resolver = DirWorkspaceResolver::new(vec![
            PathBuf::from("/work/a"),
            PathBuf::from("/work/b"),
        ]);
        assert_eq!(
            resolver.workspace_folder(Path::new("/work/b/src/x.py")),
            Some(PathBuf::from("/work/b"))
        );
        assert_eq!(resolver.workspace_folder(Path::new("/elsewhere/x.py")), None);
        assert_eq!(
            resolver.first_workspace_folder(),
            Some(PathBuf::from("/work/a"))
        );
    }

    #[tokio::test]
    async fn test_pipfile_matcher_requires_pipfile_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let name = root.file_name().unwrap().to_string_lossy().to_string();
        let matcher = PipfileMatcher;

        let venv_python = format!("/home/u/.local/share/virtualenvs/{}-abc123/bin/python", name);

        // No Pipfile yet.
        assert!(!matcher.is_related_pipenv(&venv_python, root).await);

        fs::write(root.join("Pipfile"), "[packages]\n").unwrap();
        assert!(matcher.is_related_pipenv(&venv_python, root).await);

        // Pipfile present but the venv belongs to another project.
        assert!(
            !matcher
                .is_related_pipenv("/home/u/.local/share/virtualenvs/other-xyz/bin/python", root)
                .await
        );
    }

    #[tokio::test]
    async fn test_ambient_env_resolver_sees_process_env() {
        std::env::set_var("PYRUN_LOCAL_TEST_MARKER", "1");
        let vars = AmbientEnvVarResolver.resolve(None).await.unwrap();
        assert_eq!(vars.get("PYRUN_LOCAL_TEST_MARKER").map(String::as_str), Some("1"));
    }
}
