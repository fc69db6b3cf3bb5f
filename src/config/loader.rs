// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::errors::ConfigError;

/// Per-session configuration.
///
/// Loaded from a YAML file or built in code via [`Default`]. Nothing in here
/// changes the control protocol; the knobs cover deployment texture only.
///
/// # Example
/// ```yaml
/// loop_thread_name: debuggee-flow
/// wait_timeout_ms: 30000
/// warn_on_stale_hits: false
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Name given to the session's loop thread.
    #[serde(default = "default_loop_thread_name")]
    pub loop_thread_name: String,

    /// Upper bound on a single blocking wait inside the backend, in
    /// milliseconds. `None` waits indefinitely, which matches how live
    /// debugging sessions normally run; a bound only makes the loop re-poll,
    /// it never surfaces to callers.
    #[serde(default)]
    pub wait_timeout_ms: Option<u64>,

    /// Log stale breakpoint hits (unknown or disabled ids) at `warn` instead
    /// of `debug`.
    #[serde(default = "default_warn_on_stale_hits")]
    pub warn_on_stale_hits: bool,
}

fn default_loop_thread_name() -> String {
    "debuggee-flow".to_string()
}

fn default_warn_on_stale_hits() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            loop_thread_name: default_loop_thread_name(),
            wait_timeout_ms: None,
            warn_on_stale_hits: default_warn_on_stale_hits(),
        }
    }
}

impl SessionConfig {
    /// The wait timeout as a [`Duration`], if one is configured.
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_ms.map(Duration::from_millis)
    }

    /// Check field values for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loop_thread_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "loop_thread_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.wait_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "wait_timeout_ms",
                reason: "must be positive; omit the field to wait indefinitely".to_string(),
            });
        }
        Ok(())
    }
}

/// Load a session configuration from a YAML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<SessionConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config = serde_yaml::from_str(&contents)?;
    Ok(config)
}

/// Load a session configuration and validate its field values.
pub fn load_and_validate_config(path: impl AsRef<Path>) -> Result<SessionConfig, ConfigError> {
    let config = load_config(path)?;
    config.validate()?;
    Ok(config)
}
