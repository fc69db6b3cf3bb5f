// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for execution-control operations.

use thiserror::Error;

use crate::control::ExecutionState;
use crate::errors::BackendError;

/// Fault surfaced by `continue`/`break`/`terminate` and breakpoint
/// operations.
///
/// Precondition faults leave the session state unchanged; a rejected
/// transition never corrupts the state machine.
#[derive(Error, Debug)]
pub enum ControlError {
    /// The operation is not valid in the current execution state. Break can
    /// be executed only once per stop, and continue only from a stop.
    #[error("cannot {operation} while the target is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: ExecutionState,
    },

    /// The session was terminated, either before the call or while the
    /// caller was blocked inside it.
    #[error("session terminated")]
    SessionTerminated,

    /// The breakpoint behind this handle has been removed.
    #[error("breakpoint was removed")]
    BreakpointRemoved,

    /// The loop thread could not be spawned.
    #[error("failed to start loop thread: {0}")]
    LoopThread(#[source] std::io::Error),

    /// The backend rejected the underlying call.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
