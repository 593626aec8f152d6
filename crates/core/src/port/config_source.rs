// Config Source Port

use std::path::Path;

/// Supplies the default interpreter path for an optional resource scope.
///
/// Callers re-read this on every access: an executor bound by resource
/// scope follows configuration changes between calls rather than pinning
/// the path it saw first.
pub trait ConfigSource: Send + Sync {
    fn interpreter_path(&self, resource: Option<&Path>) -> String;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Mock ConfigSource whose path tests can swap mid-flight, with a read
    /// counter to assert the re-resolution contract.
    pub struct MockConfigSource {
        path: Mutex<String>,
        reads: Mutex<usize>,
    }

    impl MockConfigSource {
        pub fn new(path: impl Into<String>) -> Self {
            Self {
                path: Mutex::new(path.into()),
                reads: Mutex::new(0),
            }
        }

        pub fn set_path(&self, path: impl Into<String>) {
            *self.path.lock().unwrap() = path.into();
        }

        pub fn read_count(&self) -> usize {
            *self.reads.lock().unwrap()
        }
    }

    impl ConfigSource for MockConfigSource {
        fn interpreter_path(&self, _resource: Option<&Path>) -> String {
            *self.reads.lock().unwrap() += 1;
            self.path.lock().unwrap().clone()
        }
    }
}
