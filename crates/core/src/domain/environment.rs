// Environment Classification Domain Types

use serde::{Deserialize, Serialize};

/// Kind of isolation mechanism that produced a given interpreter.
///
/// `Unknown` also covers conda environments: conda is never positively
/// detected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentKind {
    Unknown,
    VirtualEnv,
    Venv,
    Pyenv,
    PipEnv,
}

impl std::fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EnvironmentKind::Unknown => "unknown",
            EnvironmentKind::VirtualEnv => "virtualenv",
            EnvironmentKind::Venv => "venv",
            EnvironmentKind::Pyenv => "pyenv",
            EnvironmentKind::PipEnv => "pipenv",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a single classification step.
///
/// Probe failures inside a step collapse to `NoSignal` and the chain moves
/// on; only the public boundary turns a fully unmatched chain into
/// `EnvironmentKind::Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Matched(EnvironmentKind),
    NoSignal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(EnvironmentKind::PipEnv.to_string(), "pipenv");
        assert_eq!(EnvironmentKind::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_kind_serializes_like_display() {
        let json = serde_json::to_string(&EnvironmentKind::VirtualEnv).unwrap();
        assert_eq!(json, "\"virtualenv\"");
    }
}
