use std::time::Duration;

use thiserror::Error;

use crate::theme::TOOLBAR_CONTAINER_CLASS;

/// Longest debounce window accepted from the command line.
pub const MAX_DEBOUNCE_MS: u64 = 5_000;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarConfig {
    /// Quiet period after the last selection change.
    pub selection_debounce: Duration,
    /// Settle window coalescing show/hide pressure into one decision.
    pub toggle_debounce: Duration,
    /// Class applied to the balloon while the toolbar is visible.
    pub class_name: String,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            selection_debounce: DEFAULT_DEBOUNCE,
            toggle_debounce: DEFAULT_DEBOUNCE,
            class_name: TOOLBAR_CONTAINER_CLASS.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be at most {max}ms (got {value}ms)", max = MAX_DEBOUNCE_MS)]
    DebounceOutOfRange { name: &'static str, value: u64 },
    #[error("class name must not be empty")]
    EmptyClassName,
}

impl ToolbarConfig {
    /// Build a config from raw millisecond values, validating each.
    pub fn from_millis(selection_ms: u64, toggle_ms: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            selection_debounce: checked_window("selection debounce", selection_ms)?,
            toggle_debounce: checked_window("toggle debounce", toggle_ms)?,
            ..Self::default()
        })
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Result<Self, ConfigError> {
        let class_name = class_name.into();
        if class_name.trim().is_empty() {
            return Err(ConfigError::EmptyClassName);
        }
        self.class_name = class_name;
        Ok(self)
    }
}

fn checked_window(name: &'static str, value: u64) -> Result<Duration, ConfigError> {
    if value > MAX_DEBOUNCE_MS {
        return Err(ConfigError::DebounceOutOfRange { name, value });
    }
    Ok(Duration::from_millis(value))
}
