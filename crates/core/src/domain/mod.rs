// Domain Layer - Plain data, no I/O

pub mod environment;
pub mod interpreter;

// Re-exports
pub use environment::{Detection, EnvironmentKind};
pub use interpreter::{
    Architecture, EnvironmentVariables, InterpreterMetadata, PythonVersionInfo,
};
