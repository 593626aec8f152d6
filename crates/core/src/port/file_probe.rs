// File Probe Port
// Async existence check, kept separate from process spawning so the
// classifier's cheap steps stay cheap.

use async_trait::async_trait;
use std::path::Path;

/// Async file-existence check.
#[async_trait]
pub trait FileProbe: Send + Sync {
    /// true iff `path` exists and is a regular file.
    async fn file_exists(&self, path: &Path) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Mock FileProbe backed by a set of paths that "exist".
    pub struct MockFileProbe {
        existing: Mutex<HashSet<PathBuf>>,
    }

    impl MockFileProbe {
        pub fn new() -> Self {
            Self {
                existing: Mutex::new(HashSet::new()),
            }
        }

        pub fn with_files<I, P>(paths: I) -> Self
        where
            I: IntoIterator<Item = P>,
            P: Into<PathBuf>,
        {
            let probe = Self::new();
            for path in paths {
                probe.add(path);
            }
            probe
        }

        pub fn add(&self, path: impl Into<PathBuf>) {
            self.existing.lock().unwrap().insert(path.into());
        }
    }

    impl Default for MockFileProbe {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl FileProbe for MockFileProbe {
        async fn file_exists(&self, path: &Path) -> bool {
            self.existing.lock().unwrap().contains(path)
        }
    }
}
