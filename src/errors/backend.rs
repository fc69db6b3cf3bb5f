// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for native backend operations.

use thiserror::Error;

use crate::traits::BreakpointId;

/// A backend call was rejected or failed.
///
/// Backend calls are one-shot: nothing in this crate retries them. The
/// session state is left unchanged when one of these surfaces, so the caller
/// decides whether to retry.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend rejected an execution-control command.
    #[error("backend rejected {operation}: {reason}")]
    CommandRejected {
        operation: &'static str,
        reason: String,
    },

    /// Breakpoint creation failed; the expression did not resolve or the
    /// backend ran out of breakpoint slots.
    #[error("breakpoint creation failed for '{expression}': {reason}")]
    BreakpointCreation { expression: String, reason: String },

    /// The backend has no record of the breakpoint.
    #[error("backend knows no breakpoint {0}")]
    UnknownBreakpoint(BreakpointId),

    /// There is no attached target to operate on.
    #[error("no debuggee attached")]
    NoTarget,
}
