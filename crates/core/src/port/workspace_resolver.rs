// Workspace Resolver Port

use std::path::{Path, PathBuf};

/// Maps a resource to its containing workspace folder.
pub trait WorkspaceResolver: Send + Sync {
    /// Folder owning `resource`, if any.
    fn workspace_folder(&self, resource: &Path) -> Option<PathBuf>;

    /// First configured workspace folder, if any. Fallback for resources
    /// outside every folder and for calls with no resource at all.
    fn first_workspace_folder(&self) -> Option<PathBuf>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Mock WorkspaceResolver over an explicit folder list.
    pub struct MockWorkspaceResolver {
        folders: Vec<PathBuf>,
    }

    impl MockWorkspaceResolver {
        pub fn new(folders: Vec<PathBuf>) -> Self {
            Self { folders }
        }

        pub fn empty() -> Self {
            Self::new(Vec::new())
        }
    }

    impl WorkspaceResolver for MockWorkspaceResolver {
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
}
