// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Flow controller: the execution-control state machine and its loop thread.
//!
//! One controller per session. The controller serializes every transition
//! between `Running` and `Stopped` behind a single mutex, and runs exactly
//! one loop thread that performs the backend's blocking wait call. Callers
//! request transitions synchronously; the loop thread is the only place the
//! blocking backend call ever happens.
//!
//! Both cross-thread signals — resume-requested (caller to loop thread) and
//! stop-acknowledged (loop thread to caller) — travel through the bounded
//! [`ExecutionState`] value under the mutex. Waiters re-check the state
//! after acquiring the lock before blocking on the condvar, so a signal
//! issued before the corresponding wait is never lost.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::warn;

use crate::breakpoints::BreakpointRegistry;
use crate::config::SessionConfig;
use crate::control::dispatcher::EventDispatcher;
use crate::errors::ControlError;
use crate::observability::messages::control::{
    LoopThreadExited, StateTransition, StopAcknowledged, WaitForEventFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{DebuggerBackend, ExecutionStatus};

/// Execution state of the debuggee, as tracked by the flow controller.
///
/// Owned exclusively by the controller; mutated only on the loop thread or
/// under the session lock, and read by callers only through
/// [`FlowController::execution_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// The target is scheduled and running.
    Running,
    /// A break was requested and the caller is waiting for the stop to be
    /// acknowledged.
    BreakRequested,
    /// The target is halted; caches are fresh and debuggee state may be
    /// inspected.
    Stopped,
    /// The session is over; every operation except `terminate` faults.
    Terminated,
}

impl ExecutionState {
    pub(crate) fn name(self) -> &'static str {
        match self {
            ExecutionState::Running => "running",
            ExecutionState::BreakRequested => "break-requested",
            ExecutionState::Stopped => "stopped",
            ExecutionState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Callback that clears the session's cache graph; returns cleared count.
pub(crate) type Invalidator = Arc<dyn Fn() -> usize + Send + Sync>;

/// The per-session mutable state: execution state and breakpoint registry
/// under one lock, one condvar for both cross-thread signals.
pub(crate) struct SessionShared {
    inner: Mutex<SessionInner>,
    cond: Condvar,
}

pub(crate) struct SessionInner {
    pub(crate) state: ExecutionState,
    pub(crate) registry: BreakpointRegistry,
    loop_ready: bool,
}

impl SessionShared {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                // Freshly attached/created targets start halted.
                state: ExecutionState::Stopped,
                registry: BreakpointRegistry::new(),
                loop_ready: false,
            }),
            cond: Condvar::new(),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait<'a>(
        &self,
        guard: MutexGuard<'a, SessionInner>,
    ) -> MutexGuard<'a, SessionInner> {
        self.cond.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn notify_all(&self) {
        self.cond.notify_all();
    }

    /// Transition the state and wake every waiter. Must be called with the
    /// lock held, through the guard.
    pub(crate) fn transition(&self, inner: &mut SessionInner, to: ExecutionState) {
        StateTransition {
            from: inner.state.name(),
            to: to.name(),
        }
        .log();
        inner.state = to;
        self.notify_all();
    }
}

/// Controller for debuggee actions during live debugging.
pub(crate) struct FlowController {
    shared: Arc<SessionShared>,
    backend: Arc<dyn DebuggerBackend>,
    loop_thread: Mutex<Option<JoinHandle<()>>>,
}

impl FlowController {
    /// Spawn the loop thread and wait until it has installed the event sink.
    /// The controller is not handed out before the handshake completes, so a
    /// caller can never race the sink installation.
    pub(crate) fn start(
        backend: Arc<dyn DebuggerBackend>,
        shared: Arc<SessionShared>,
        invalidator: Invalidator,
        config: &SessionConfig,
    ) -> Result<Self, ControlError> {
        let loop_backend = Arc::clone(&backend);
        let loop_shared = Arc::clone(&shared);
        let wait_timeout = config.wait_timeout();
        let warn_on_stale_hits = config.warn_on_stale_hits;

        let handle = thread::Builder::new()
            .name(config.loop_thread_name.clone())
            .spawn(move || {
                run_event_loop(
                    loop_shared,
                    loop_backend,
                    invalidator,
                    wait_timeout,
                    warn_on_stale_hits,
                )
            })
            .map_err(ControlError::LoopThread)?;

        {
            let mut inner = shared.lock();
            while !inner.loop_ready {
                inner = shared.wait(inner);
            }
        }

        Ok(Self {
            shared,
            backend,
            loop_thread: Mutex::new(Some(handle)),
        })
    }

    /// Resume the target. Valid only while stopped.
    pub(crate) fn continue_execution(&self) -> Result<(), ControlError> {
        let mut inner = self.shared.lock();
        match inner.state {
            ExecutionState::Stopped => {}
            ExecutionState::Terminated => return Err(ControlError::SessionTerminated),
            state => {
                return Err(ControlError::InvalidTransition {
                    operation: "continue",
                    state,
                })
            }
        }

        // State is untouched if the backend rejects the resume.
        self.backend.resume_target()?;
        self.shared.transition(&mut inner, ExecutionState::Running);
        Ok(())
    }

    /// Interrupt the target and block until the loop thread acknowledges
    /// the stop. Valid only while running; a second break without an
    /// intervening continue faults.
    pub(crate) fn break_execution(&self) -> Result<(), ControlError> {
        let mut inner = self.shared.lock();
        match inner.state {
            ExecutionState::Running => {}
            ExecutionState::Terminated => return Err(ControlError::SessionTerminated),
            state => {
                return Err(ControlError::InvalidTransition {
                    operation: "break",
                    state,
                })
            }
        }

        self.shared
            .transition(&mut inner, ExecutionState::BreakRequested);
        if let Err(fault) = self.backend.request_async_break() {
            self.shared.transition(&mut inner, ExecutionState::Running);
            return Err(fault.into());
        }

        while inner.state == ExecutionState::BreakRequested {
            inner = self.shared.wait(inner);
        }

        match inner.state {
            ExecutionState::Terminated => Err(ControlError::SessionTerminated),
            _ => Ok(()),
        }
    }

    /// End the session. Valid from any state and idempotent; releases any
    /// caller blocked in `break_execution` and joins the loop thread.
    pub(crate) fn terminate(&self) -> Result<(), ControlError> {
        {
            let mut inner = self.shared.lock();
            if inner.state != ExecutionState::Terminated {
                self.shared.transition(&mut inner, ExecutionState::Terminated);
            }
        }

        // The backend contract requires end_session to release an in-flight
        // wait_for_event, which is what makes the join below finite.
        let backend_fault = self.backend.end_session().err();
        if let Some(fault) = &backend_fault {
            warn!(error = %fault, "backend end_session failed");
        }

        let handle = {
            let mut slot = self
                .loop_thread
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            slot.take()
        };
        if let Some(handle) = handle {
            let _ = handle.join();
        }

        match backend_fault {
            Some(fault) => Err(fault.into()),
            None => Ok(()),
        }
    }

    /// Synchronous snapshot of the execution state.
    pub(crate) fn execution_state(&self) -> ExecutionState {
        self.shared.lock().state
    }
}

/// Loop responsible for catching debug events and publishing debuggee state.
/// Runs until the session is terminated or the target exits.
fn run_event_loop(
    shared: Arc<SessionShared>,
    backend: Arc<dyn DebuggerBackend>,
    invalidator: Invalidator,
    wait_timeout: Option<Duration>,
    warn_on_stale_hits: bool,
) {
    let mut dispatcher = EventDispatcher::new(
        Arc::clone(&shared),
        Arc::clone(&invalidator),
        warn_on_stale_hits,
    );

    // Event sink is in place; release the constructor.
    {
        let mut inner = shared.lock();
        inner.loop_ready = true;
        shared.notify_all();
    }

    let reason = loop {
        // Park while stopped; a resume or a terminate wakes us.
        {
            let mut inner = shared.lock();
            while inner.state == ExecutionState::Stopped {
                inner = shared.wait(inner);
            }
            if inner.state == ExecutionState::Terminated {
                break "terminate requested";
            }
        }

        if let Err(fault) = backend.wait_for_event(wait_timeout, &mut dispatcher) {
            WaitForEventFailed { error: &fault }.log();
        }

        if shared.lock().state == ExecutionState::Terminated {
            break "terminate requested";
        }

        match backend.execution_status() {
            // Timed-out or spurious wait; go straight back in.
            ExecutionStatus::Running => continue,
            ExecutionStatus::NoTarget => {
                let mut inner = shared.lock();
                if inner.state != ExecutionState::Terminated {
                    shared.transition(&mut inner, ExecutionState::Terminated);
                }
                break "target exited";
            }
            ExecutionStatus::Stopped => {
                // A breakpoint action may already have published the stop
                // (and invalidated the caches) from inside the callback.
                let acknowledged = shared.lock().state == ExecutionState::Stopped;
                if !acknowledged {
                    let caches_cleared = invalidator();
                    let mut inner = shared.lock();
                    if inner.state == ExecutionState::Terminated {
                        break "terminate requested";
                    }
                    shared.transition(&mut inner, ExecutionState::Stopped);
                    StopAcknowledged { caches_cleared }.log();
                }
            }
        }
    };

    LoopThreadExited { reason }.log();
}
