// Interpreter Metadata Domain Types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Environment variables applied to every execution through one executor.
/// When bound, they replace the ambient process environment.
pub type EnvironmentVariables = HashMap<String, String>;

/// Pointer width of the interpreter binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    X86,
    X64,
}

/// Python version triple as printed by the introspection script,
/// e.g. `[3, 9, 1]`. Serializes as a JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythonVersionInfo(pub i64, pub i64, pub i64);

impl PythonVersionInfo {
    pub fn major(&self) -> i64 {
        self.0
    }

    pub fn minor(&self) -> i64 {
        self.1
    }

    pub fn micro(&self) -> i64 {
        self.2
    }
}

impl std::fmt::Display for PythonVersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}

/// Result of probing one interpreter.
///
/// Produced once per probe call and never cached by the core; caching is a
/// caller concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterMetadata {
    pub architecture: Architecture,
    pub path: String,
    /// Raw `--version` output, trimmed. Opaque display string.
    pub version: String,
    pub sys_version: String,
    pub version_info: PythonVersionInfo,
    pub sys_prefix: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info_accessors() {
        let version = PythonVersionInfo(3, 11, 4);
        assert_eq!(version.major(), 3);
        assert_eq!(version.minor(), 11);
        assert_eq!(version.micro(), 4);
        assert_eq!(version.to_string(), "3.11.4");
    }

    #[test]
    fn test_version_info_deserializes_from_array() {
        let version: PythonVersionInfo = serde_json::from_str("[3,9,1]").unwrap();
        assert_eq!(version, PythonVersionInfo(3, 9, 1));
    }
}
