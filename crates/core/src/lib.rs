// pyrun Core - Domain Logic & Ports
// NO infrastructure dependencies: process spawning, filesystem checks,
// configuration and workspace lookup all go through port traits.

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
