// Environment Variables Port

use crate::domain::EnvironmentVariables;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Computes the merged environment variables for a resource scope.
#[async_trait]
pub trait EnvVarResolver: Send + Sync {
    /// # Errors
    /// `AppError::EnvVars` when the environment cannot be computed (the
    /// factory propagates this; it never degrades silently).
    async fn resolve(&self, resource: Option<&Path>) -> Result<EnvironmentVariables>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;

    /// Mock EnvVarResolver returning a fixed map, or a fixed error.
    pub struct MockEnvVarResolver {
        vars: EnvironmentVariables,
        fail: bool,
    }

    impl MockEnvVarResolver {
        pub fn new(vars: EnvironmentVariables) -> Self {
            Self { vars, fail: false }
        }

        pub fn empty() -> Self {
            Self::new(EnvironmentVariables::new())
        }

        pub fn failing() -> Self {
            Self {
                vars: EnvironmentVariables::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl EnvVarResolver for MockEnvVarResolver {
        async fn resolve(&self, _resource: Option<&Path>) -> Result<EnvironmentVariables> {
            if self.fail {
                return Err(AppError::EnvVars("mock resolver failure".to_string()));
            }
            Ok(self.vars.clone())
        }
    }
}
