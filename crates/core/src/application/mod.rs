// Application Layer - Core services over the ports

pub mod classifier;
pub mod executor;

// Re-exports
pub use classifier::EnvironmentClassifier;
pub use executor::{ExecutorFactory, InterpreterExecutor};
