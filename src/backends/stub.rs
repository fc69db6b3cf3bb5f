// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Synthetic debugger backends for testing and demo purposes.

use std::collections::{HashMap, VecDeque};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::errors::BackendError;
use crate::traits::{
    BreakpointId, DebugEventSink, DebuggerBackend, ExecutionStatus, HitDisposition,
};

#[derive(Debug, Clone, Copy)]
enum StubEvent {
    Stop,
    BreakpointHit(BreakpointId),
}

struct StubBreakpoint {
    expression: String,
    enabled: bool,
}

struct StubState {
    status: ExecutionStatus,
    pending: VecDeque<StubEvent>,
    ended: bool,
    next_breakpoint_id: u32,
    breakpoints: HashMap<BreakpointId, StubBreakpoint>,
}

/// A scripted in-process target.
///
/// The stub honors the backend contract: `wait_for_event` blocks until an
/// event is injected or the session ends, callbacks are delivered on the
/// waiting thread, and an async break request is latched as a pending stop
/// event. Tests drive it with [`inject_breakpoint_hit`] and
/// [`inject_stop`].
///
/// [`inject_breakpoint_hit`]: StubBackend::inject_breakpoint_hit
/// [`inject_stop`]: StubBackend::inject_stop
pub struct StubBackend {
    state: Mutex<StubState>,
    cond: Condvar,
    honor_break_requests: bool,
    fail_breakpoint_creation: bool,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::with_flags(true, false)
    }

    /// A stub that accepts break requests but never delivers the stop,
    /// simulating a wedged target. Only `end_session` gets the loop thread
    /// back.
    pub fn unresponsive() -> Self {
        Self::with_flags(false, false)
    }

    /// A stub whose `create_breakpoint` always fails.
    pub fn without_breakpoint_support() -> Self {
        Self::with_flags(true, true)
    }

    fn with_flags(honor_break_requests: bool, fail_breakpoint_creation: bool) -> Self {
        Self {
            state: Mutex::new(StubState {
                // Targets come up halted under a debugger.
                status: ExecutionStatus::Stopped,
                pending: VecDeque::new(),
                ended: false,
                next_breakpoint_id: 1,
                breakpoints: HashMap::new(),
            }),
            cond: Condvar::new(),
            honor_break_requests,
            fail_breakpoint_creation,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a breakpoint-hit event, as if the target ran into it.
    pub fn inject_breakpoint_hit(&self, id: BreakpointId) {
        let mut state = self.lock();
        state.pending.push_back(StubEvent::BreakpointHit(id));
        self.cond.notify_all();
    }

    /// Queue a plain stop event (first-chance exception, initial break).
    pub fn inject_stop(&self) {
        let mut state = self.lock();
        state.pending.push_back(StubEvent::Stop);
        self.cond.notify_all();
    }

    /// Simulate the target exiting on its own.
    pub fn exit_target(&self) {
        let mut state = self.lock();
        state.ended = true;
        self.cond.notify_all();
    }

    /// The id the stub assigned for `expression`, if one exists.
    pub fn breakpoint_id_for(&self, expression: &str) -> Option<BreakpointId> {
        let state = self.lock();
        state
            .breakpoints
            .iter()
            .find(|(_, bp)| bp.expression == expression)
            .map(|(id, _)| *id)
    }

    /// Backend-side enabled flag, for asserting enable/disable plumbing.
    pub fn is_breakpoint_enabled(&self, id: BreakpointId) -> Option<bool> {
        let state = self.lock();
        state.breakpoints.get(&id).map(|bp| bp.enabled)
    }

    pub fn has_breakpoint(&self, id: BreakpointId) -> bool {
        self.lock().breakpoints.contains_key(&id)
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DebuggerBackend for StubBackend {
    fn resume_target(&self) -> Result<(), BackendError> {
        let mut state = self.lock();
        if state.ended {
            return Err(BackendError::NoTarget);
        }
        state.status = ExecutionStatus::Running;
        self.cond.notify_all();
        Ok(())
    }

    fn request_async_break(&self) -> Result<(), BackendError> {
        let mut state = self.lock();
        if state.ended {
            return Err(BackendError::NoTarget);
        }
        if self.honor_break_requests {
            state.pending.push_back(StubEvent::Stop);
            self.cond.notify_all();
        }
        Ok(())
    }

    fn wait_for_event(
        &self,
        timeout: Option<Duration>,
        sink: &mut dyn DebugEventSink,
    ) -> Result<(), BackendError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.lock();

        loop {
            if state.ended {
                state.status = ExecutionStatus::NoTarget;
                drop(state);
                sink.on_execution_status_changed(ExecutionStatus::NoTarget);
                return Ok(());
            }

            if let Some(event) = state.pending.pop_front() {
                match event {
                    StubEvent::Stop => {
                        state.status = ExecutionStatus::Stopped;
                        drop(state);
                        sink.on_execution_status_changed(ExecutionStatus::Stopped);
                        return Ok(());
                    }
                    StubEvent::BreakpointHit(id) => {
                        // The target halts while the handler decides.
                        state.status = ExecutionStatus::Stopped;
                        drop(state);
                        match sink.on_breakpoint_hit(id) {
                            HitDisposition::RemainStopped => {
                                sink.on_execution_status_changed(ExecutionStatus::Stopped);
                                return Ok(());
                            }
                            HitDisposition::Resume => {
                                {
                                    let mut relocked = self.lock();
                                    relocked.status = ExecutionStatus::Running;
                                }
                                sink.on_execution_status_changed(ExecutionStatus::Running);
                                state = self.lock();
                            }
                        }
                    }
                }
                continue;
            }

            state = match deadline {
                None => self
                    .cond
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(());
                    }
                    let (guard, _) = self
                        .cond
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner);
                    guard
                }
            };
        }
    }

    fn execution_status(&self) -> ExecutionStatus {
        self.lock().status
    }

    fn create_breakpoint(&self, expression: &str) -> Result<BreakpointId, BackendError> {
        let mut state = self.lock();
        if self.fail_breakpoint_creation {
            return Err(BackendError::BreakpointCreation {
                expression: expression.to_string(),
                reason: "breakpoints unsupported by this stub".to_string(),
            });
        }
        if state.ended {
            return Err(BackendError::NoTarget);
        }

        let id = BreakpointId(state.next_breakpoint_id);
        state.next_breakpoint_id += 1;
        state.breakpoints.insert(
            id,
            StubBreakpoint {
                expression: expression.to_string(),
                enabled: true,
            },
        );
        Ok(id)
    }

    fn set_breakpoint_enabled(&self, id: BreakpointId, enabled: bool) -> Result<(), BackendError> {
        let mut state = self.lock();
        match state.breakpoints.get_mut(&id) {
            Some(bp) => {
                bp.enabled = enabled;
                Ok(())
            }
            None => Err(BackendError::UnknownBreakpoint(id)),
        }
    }

    fn remove_breakpoint(&self, id: BreakpointId) -> Result<(), BackendError> {
        let mut state = self.lock();
        match state.breakpoints.remove(&id) {
            Some(_) => Ok(()),
            None => Err(BackendError::UnknownBreakpoint(id)),
        }
    }

    fn end_session(&self) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.ended = true;
        self.cond.notify_all();
        Ok(())
    }
}

/// A backend that rejects every command, for fault-path testing.
pub struct FailingBackend;

impl FailingBackend {
    fn rejected(operation: &'static str) -> BackendError {
        BackendError::CommandRejected {
            operation,
            reason: "simulated backend failure".to_string(),
        }
    }
}

impl DebuggerBackend for FailingBackend {
    fn resume_target(&self) -> Result<(), BackendError> {
        Err(Self::rejected("resume"))
    }

    fn request_async_break(&self) -> Result<(), BackendError> {
        Err(Self::rejected("async break"))
    }

    fn wait_for_event(
        &self,
        _timeout: Option<Duration>,
        _sink: &mut dyn DebugEventSink,
    ) -> Result<(), BackendError> {
        Err(Self::rejected("wait for event"))
    }

    fn execution_status(&self) -> ExecutionStatus {
        ExecutionStatus::NoTarget
    }

    fn create_breakpoint(&self, expression: &str) -> Result<BreakpointId, BackendError> {
        Err(BackendError::BreakpointCreation {
            expression: expression.to_string(),
            reason: "simulated backend failure".to_string(),
        })
    }

    fn set_breakpoint_enabled(&self, _id: BreakpointId, _enabled: bool) -> Result<(), BackendError> {
        Err(Self::rejected("set breakpoint enabled"))
    }

    fn remove_breakpoint(&self, _id: BreakpointId) -> Result<(), BackendError> {
        Err(Self::rejected("remove breakpoint"))
    }

    fn end_session(&self) -> Result<(), BackendError> {
        Err(Self::rejected("end session"))
    }
}
