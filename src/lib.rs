// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // debugger backend implementations
pub mod breakpoints;   // breakpoint registry + handles
pub mod cache;         // invalidatable cache cells + the invalidation walk
pub mod config;        // session configuration
pub mod control;       // flow controller, dispatcher, session
pub mod errors;        // error handling
pub mod observability;
pub mod traits;        // backend + cache abstractions

pub use breakpoints::{
    break_debugger_action, release_debugger_action, BreakpointAction, BreakpointEventStatus,
    BreakpointHandle,
};
pub use cache::{invalidate_caches, CacheCell};
pub use config::SessionConfig;
pub use control::{DebugSession, ExecutionState};
pub use errors::{BackendError, ConfigError, ControlError};
pub use traits::{BreakpointId, DebuggerBackend, ExecutionStatus};
