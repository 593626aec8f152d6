// Port Layer - Interfaces for external dependencies

pub mod config_source;
pub mod env_var_resolver;
pub mod file_probe;
pub mod path_resolver;
pub mod pipenv_matcher;
pub mod process_runner;
pub mod workspace_resolver;

// Re-exports
pub use config_source::ConfigSource;
pub use env_var_resolver::EnvVarResolver;
pub use file_probe::FileProbe;
pub use path_resolver::{ConfiguredPathResolver, FixedPathResolver, PathResolver};
pub use pipenv_matcher::PipEnvMatcher;
pub use process_runner::{
    ExecutionResult, ObservableExecution, ProcessError, ProcessEvent, ProcessRunner, SpawnOptions,
};
pub use workspace_resolver::WorkspaceResolver;
