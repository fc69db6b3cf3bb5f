// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Abstraction over the native debugging backend.
//!
//! The backend is the external service that actually controls the debuggee:
//! process attach, execution control, and breakpoint bookkeeping. This crate
//! never talks to a debugger API directly; everything goes through
//! [`DebuggerBackend`], which keeps the flow controller testable against the
//! synthetic backends in `crate::backends::stub`.

use std::fmt;
use std::time::Duration;

use crate::errors::BackendError;

/// Opaque breakpoint identifier assigned by the backend.
///
/// Ids are only meaningful to the backend that issued them and are used as
/// registry keys; the registry relies on the backend never reusing an id
/// within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakpointId(pub u32);

impl fmt::Display for BreakpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bp#{}", self.0)
    }
}

/// Execution status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// The target is scheduled and running.
    Running,
    /// The target is halted and inspectable.
    Stopped,
    /// There is no target anymore (exited or detached).
    NoTarget,
}

/// Answer the dispatcher gives the backend after a breakpoint hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitDisposition {
    /// Keep the target running.
    Resume,
    /// Leave the target stopped.
    RemainStopped,
}

/// Sink for backend events.
///
/// The backend invokes these callbacks synchronously on the thread that is
/// blocked inside [`DebuggerBackend::wait_for_event`] — which is always the
/// session's loop thread. Implementations must not block and must not call
/// back into the backend except through the returned [`HitDisposition`].
pub trait DebugEventSink {
    /// The target's execution status changed.
    fn on_execution_status_changed(&mut self, status: ExecutionStatus);

    /// A breakpoint was hit. The return value tells the backend whether to
    /// resume the target or leave it stopped.
    fn on_breakpoint_hit(&mut self, id: BreakpointId) -> HitDisposition;
}

/// Interface consumed from the native debugging backend.
///
/// One implementation per debugger API (and the synthetic stubs used in
/// tests). All methods except [`wait_for_event`](Self::wait_for_event) must
/// return promptly; `wait_for_event` is the single blocking call and is only
/// ever issued from the session's loop thread.
pub trait DebuggerBackend: Send + Sync {
    /// Resume the halted target.
    fn resume_target(&self) -> Result<(), BackendError>;

    /// Request an asynchronous break. The request is latched by the backend;
    /// the actual stop is observed later through `wait_for_event`.
    fn request_async_break(&self) -> Result<(), BackendError>;

    /// Block until the backend has an event to report, delivering callbacks
    /// into `sink` on the calling thread. Returns when the target stopped,
    /// exited, or `timeout` elapsed; `None` waits indefinitely.
    fn wait_for_event(
        &self,
        timeout: Option<Duration>,
        sink: &mut dyn DebugEventSink,
    ) -> Result<(), BackendError>;

    /// Current execution status of the target.
    fn execution_status(&self) -> ExecutionStatus;

    /// Create a breakpoint at `expression`. The expression is opaque to this
    /// crate; the backend resolves it. Breakpoints are created enabled.
    fn create_breakpoint(&self, expression: &str) -> Result<BreakpointId, BackendError>;

    /// Toggle the backend-side enabled flag of a breakpoint.
    fn set_breakpoint_enabled(&self, id: BreakpointId, enabled: bool) -> Result<(), BackendError>;

    /// Unregister a breakpoint from the backend.
    fn remove_breakpoint(&self, id: BreakpointId) -> Result<(), BackendError>;

    /// End the debugging session. Must release any thread blocked inside
    /// `wait_for_event`; `terminate` relies on that to join the loop thread.
    fn end_session(&self) -> Result<(), BackendError>;
}
