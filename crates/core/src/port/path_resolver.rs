// Interpreter Path Resolution
// Capability interface: the executor never reads configuration directly,
// it holds one of these.

use super::ConfigSource;
use std::path::PathBuf;
use std::sync::Arc;

/// Resolves the interpreter path an executor is bound to.
///
/// `resolve` runs on every access. `FixedPathResolver` makes that a no-op;
/// `ConfiguredPathResolver` re-reads the config source each time, so a
/// resource-bound executor follows configuration changes between calls.
pub trait PathResolver: Send + Sync {
    fn resolve(&self) -> String;
}

/// Binds an executor to an explicit interpreter path.
pub struct FixedPathResolver {
    path: String,
}

impl FixedPathResolver {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl PathResolver for FixedPathResolver {
    fn resolve(&self) -> String {
        self.path.clone()
    }
}

/// Defers to the config source, keyed by an optional resource scope.
pub struct ConfiguredPathResolver {
    config: Arc<dyn ConfigSource>,
    resource: Option<PathBuf>,
}

impl ConfiguredPathResolver {
    pub fn new(config: Arc<dyn ConfigSource>, resource: Option<PathBuf>) -> Self {
        Self { config, resource }
    }
}

impl PathResolver for ConfiguredPathResolver {
    fn resolve(&self) -> String {
        self.config.interpreter_path(self.resource.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::config_source::mocks::MockConfigSource;

    #[test]
    fn test_fixed_resolver_is_stable() {
        let resolver = FixedPathResolver::new("/usr/bin/python3");
        assert_eq!(resolver.resolve(), "/usr/bin/python3");
        assert_eq!(resolver.resolve(), "/usr/bin/python3");
    }

    #[test]
    fn test_configured_resolver_rereads_every_call() {
        let config = Arc::new(MockConfigSource::new("/old/python"));
        let resolver = ConfiguredPathResolver::new(config.clone(), None);

        assert_eq!(resolver.resolve(), "/old/python");
        config.set_path("/new/python");
        assert_eq!(resolver.resolve(), "/new/python");
        assert_eq!(config.read_count(), 2);
    }
}
