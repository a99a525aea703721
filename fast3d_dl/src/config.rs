use serde::{Deserialize, Serialize};

use crate::vertex::DEFAULT_WINDOW_SIZE;

/// Resource limits for an [Interpreter](crate::interpret::Interpreter) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Number of slots in the vertex window, at most
    /// [MAX_WINDOW_SIZE](crate::vertex::MAX_WINDOW_SIZE).
    pub vertex_window_size: usize,
    /// Maximum number of nested display list calls.
    pub max_call_depth: usize,
    /// Maximum number of commands executed in one run, or `None` for no limit.
    pub command_limit: Option<usize>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            vertex_window_size: DEFAULT_WINDOW_SIZE,
            max_call_depth: 10,
            command_limit: Some(65536),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config: InterpreterConfig = serde_json::from_str(r#"{"max_call_depth": 4}"#).unwrap();
        assert_eq!(
            config,
            InterpreterConfig {
                max_call_depth: 4,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_unlimited_commands() {
        let config: InterpreterConfig =
            serde_json::from_str(r#"{"command_limit": null, "vertex_window_size": 64}"#).unwrap();
        assert_eq!(config.command_limit, None);
        assert_eq!(config.vertex_window_size, 64);
        assert_eq!(config.max_call_depth, 10);
    }

    #[test]
    fn test_serialize_defaults() {
        let json = serde_json::to_string(&InterpreterConfig::default()).unwrap();
        assert_eq!(
            json,
            r#"{"vertex_window_size":32,"max_call_depth":10,"command_limit":65536}"#
        );
    }
}
