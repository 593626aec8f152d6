// PipEnv Matcher Port

use async_trait::async_trait;
use std::path::Path;

/// Decides whether an interpreter is the pipenv-managed environment for a
/// workspace root.
#[async_trait]
pub trait PipEnvMatcher: Send + Sync {
    async fn is_related_pipenv(&self, interpreter_path: &str, workspace_root: &Path) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Mock PipEnvMatcher with a fixed answer. Records the workspace roots
    /// it was asked about.
    pub struct MockPipEnvMatcher {
        matches: bool,
        asked_roots: Mutex<Vec<PathBuf>>,
    }

    impl MockPipEnvMatcher {
        pub fn new(matches: bool) -> Self {
            Self {
                matches,
                asked_roots: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.asked_roots.lock().unwrap().len()
        }

        pub fn asked_roots(&self) -> Vec<PathBuf> {
            self.asked_roots.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PipEnvMatcher for MockPipEnvMatcher {
        async fn is_related_pipenv(&self, _interpreter_path: &str, workspace_root: &Path) -> bool {
            self.asked_roots
                .lock()
                .unwrap()
                .push(workspace_root.to_path_buf());
            self.matches
        }
    }
}
