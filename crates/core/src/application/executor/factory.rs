// Executor Factory
// Resolves which interpreter path / environment an executor binds to.
// Construction only touches configuration and environment variables; it
// never spawns the interpreter.

use super::InterpreterExecutor;
use crate::error::Result;
use crate::port::{
    ConfigSource, ConfiguredPathResolver, EnvVarResolver, FileProbe, FixedPathResolver,
    ProcessRunner,
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub struct ExecutorFactory {
    runner: Arc<dyn ProcessRunner>,
    file_probe: Arc<dyn FileProbe>,
    config: Arc<dyn ConfigSource>,
    env_vars: Arc<dyn EnvVarResolver>,
}

impl ExecutorFactory {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        file_probe: Arc<dyn FileProbe>,
        config: Arc<dyn ConfigSource>,
        env_vars: Arc<dyn EnvVarResolver>,
    ) -> Self {
        Self {
            runner,
            file_probe,
            config,
            env_vars,
        }
    }

    /// Executor bound directly to an explicit interpreter path.
    ///
    /// No environment-variable resolution happens here; only what callers
    /// pass per execution applies.
    pub fn for_interpreter(&self, interpreter_path: impl Into<String>) -> InterpreterExecutor {
        InterpreterExecutor::new(
            Arc::clone(&self.runner),
            Arc::clone(&self.file_probe),
            Arc::new(FixedPathResolver::new(interpreter_path)),
            None,
        )
    }

    /// Executor bound to an optional resource scope.
    ///
    /// Environment variables are resolved now; the interpreter path stays
    /// lazy and is re-read from the config source on every access.
    ///
    /// # Errors
    /// Propagates the env-var resolver's failure; nothing else here can
    /// fail.
    pub async fn create(&self, resource: Option<&Path>) -> Result<InterpreterExecutor> {
        let env_vars = self.env_vars.resolve(resource).await?;
        // An empty map means "nothing custom": leave the ambient
        // environment alone rather than wiping it.
        let env_vars = if env_vars.is_empty() {
            None
        } else {
            Some(env_vars)
        };
        debug!(resource = ?resource, custom_env = env_vars.is_some(), "Creating resource-bound executor");

        Ok(InterpreterExecutor::new(
            Arc::clone(&self.runner),
            Arc::clone(&self.file_probe),
            Arc::new(ConfiguredPathResolver::new(
                Arc::clone(&self.config),
                resource.map(Path::to_path_buf),
            )),
            env_vars,
        ))
    }
}
