// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Debug session: one attached target, its flow controller, its breakpoint
//! registry, and its cache root.
//!
//! Multiple sessions may coexist (one per debuggee process); they share no
//! state. A session's lifetime runs from [`DebugSession::attach`] to
//! [`DebugSession::terminate`].

use std::sync::Arc;

use crate::breakpoints::{BreakpointAction, BreakpointHandle};
use crate::cache;
use crate::config::SessionConfig;
use crate::control::flow::{ExecutionState, FlowController, Invalidator, SessionShared};
use crate::errors::ControlError;
use crate::observability::messages::breakpoint::BreakpointCreated;
use crate::observability::messages::StructuredLog;
use crate::traits::{CacheOwner, DebuggerBackend};

/// Execution control for one debuggee.
///
/// All methods are callable from any thread; operations on the same session
/// serialize through its internal lock. The target starts halted, the way
/// targets are created under a debugger.
pub struct DebugSession {
    flow: FlowController,
    shared: Arc<SessionShared>,
    backend: Arc<dyn DebuggerBackend>,
    cache_root: Option<Arc<dyn CacheOwner>>,
}

impl DebugSession {
    /// Bind a session to an attached target.
    ///
    /// Spawns the session's loop thread and does not return until the
    /// thread has installed the backend event sink.
    pub fn attach(
        backend: Arc<dyn DebuggerBackend>,
        cache_root: Option<Arc<dyn CacheOwner>>,
        config: SessionConfig,
    ) -> Result<Self, ControlError> {
        let shared = Arc::new(SessionShared::new());
        let invalidator = make_invalidator(cache_root.clone());
        let flow = FlowController::start(
            Arc::clone(&backend),
            Arc::clone(&shared),
            invalidator,
            &config,
        )?;

        Ok(Self {
            flow,
            shared,
            backend,
            cache_root,
        })
    }

    /// Resume the target. Faults unless the target is stopped.
    pub fn continue_execution(&self) -> Result<(), ControlError> {
        self.flow.continue_execution()
    }

    /// Interrupt the target; blocks until the stop is acknowledged and the
    /// caches have been invalidated. Faults unless the target is running.
    pub fn break_execution(&self) -> Result<(), ControlError> {
        self.flow.break_execution()
    }

    /// End the session. Idempotent; releases any blocked caller and joins
    /// the loop thread before returning.
    pub fn terminate(&self) -> Result<(), ControlError> {
        self.flow.terminate()
    }

    /// Current execution state.
    pub fn execution_state(&self) -> ExecutionState {
        self.flow.execution_state()
    }

    /// Create a breakpoint at `expression` with `action` run on every hit.
    ///
    /// The backend resolves the expression and assigns the id; creation
    /// failure is surfaced as a fault and nothing is registered. Breakpoints
    /// are created enabled.
    pub fn set_breakpoint(
        &self,
        expression: &str,
        action: BreakpointAction,
    ) -> Result<BreakpointHandle, ControlError> {
        let id = self.backend.create_breakpoint(expression)?;

        let mut inner = self.shared.lock();
        if !inner.registry.add(id, expression.to_string(), action) {
            // Backend handed out an id that is still registered; the old
            // entry is gone either way.
            tracing::error!(id = id.0, "backend reused a live breakpoint id");
        }
        drop(inner);

        BreakpointCreated { id, expression }.log();
        Ok(BreakpointHandle::new(
            Arc::clone(&self.shared),
            Arc::clone(&self.backend),
            id,
        ))
    }

    /// Clear every invalidatable cache reachable from the session root.
    ///
    /// The loop thread does this automatically on every acknowledged stop;
    /// the method exists for callers that mutate debuggee state out of band
    /// (memory writes, register edits) while stopped.
    pub fn invalidate_caches(&self) -> usize {
        match &self.cache_root {
            Some(root) => cache::invalidate_caches(root),
            None => 0,
        }
    }
}

fn make_invalidator(root: Option<Arc<dyn CacheOwner>>) -> Invalidator {
    Arc::new(move || match &root {
        Some(root) => cache::invalidate_caches(root),
        None => 0,
    })
}
