// pyrun Infrastructure - System Adapters
// Implements: ProcessRunner, FileProbe, plus local stand-ins for the
// IDE-side collaborators (config, env vars, workspace, pipenv relation)

pub mod file_probe;
pub mod local;
pub mod process_runner;

pub use file_probe::TokioFileProbe;
pub use local::{
    AmbientEnvVarResolver, DirWorkspaceResolver, PipfileMatcher, StaticConfigSource,
};
pub use process_runner::TokioProcessRunner;
