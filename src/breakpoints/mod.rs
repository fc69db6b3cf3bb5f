// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Breakpoint registry and user-facing breakpoint handles.
//!
//! The registry maps backend-assigned breakpoint ids to user-supplied
//! actions. It is owned by the session and shares the session's single lock
//! with the execution state, so registry changes and state transitions never
//! need two locks. Dispatch on a hit happens on the loop thread through
//! `crate::control::dispatcher`.

mod handle;


use std::collections::HashMap;

pub use handle::BreakpointHandle;

use crate::traits::BreakpointId;

/// State of the debugger after a breakpoint action has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointEventStatus {
    /// Continue execution after the action.
    ReleaseDebugger,
    /// Break execution until a continue is issued.
    BreakDebugger,
}

/// Action invoked on the loop thread when its breakpoint is hit.
///
/// Actions may inspect debuggee state (caches are invalidated before the
/// action runs) but must not call `continue_execution` or `break_execution`
/// on the owning session — the loop thread is the only writer of execution
/// state and is not reentrant against its own callback.
pub type BreakpointAction = Box<dyn FnMut() -> BreakpointEventStatus + Send>;

/// Ready-made action that breaks the debugger on every hit.
pub fn break_debugger_action() -> BreakpointAction {
    Box::new(|| BreakpointEventStatus::BreakDebugger)
}

/// Ready-made action that lets the target keep running on every hit.
pub fn release_debugger_action() -> BreakpointAction {
    Box::new(|| BreakpointEventStatus::ReleaseDebugger)
}

pub(crate) struct BreakpointEntry {
    pub(crate) expression: String,
    pub(crate) enabled: bool,
    /// `None` while the action is out being dispatched.
    pub(crate) action: Option<BreakpointAction>,
}

/// Outcome of a registry lookup at dispatch time.
pub(crate) enum DispatchSlot {
    /// No entry for the id; stale delivery from the backend.
    Missing,
    /// Entry exists but is disabled; stale delivery after a disable.
    Disabled,
    /// The action is already out being dispatched.
    Busy,
    /// The action, taken out of the entry for the duration of the dispatch.
    Armed(BreakpointAction),
}

/// Id-to-entry map for one session's breakpoints.
#[derive(Default)]
pub(crate) struct BreakpointRegistry {
    entries: HashMap<BreakpointId, BreakpointEntry>,
}

impl BreakpointRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a breakpoint. Ids are assigned by the backend and must be
    /// unique within a session; a collision means the backend reused an id
    /// and the previous entry is replaced.
    pub(crate) fn add(&mut self, id: BreakpointId, expression: String, action: BreakpointAction) -> bool {
        let entry = BreakpointEntry {
            expression,
            enabled: true,
            action: Some(action),
        };
        self.entries.insert(id, entry).is_none()
    }

    pub(crate) fn contains(&self, id: BreakpointId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn remove(&mut self, id: BreakpointId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub(crate) fn set_enabled(&mut self, id: BreakpointId, enabled: bool) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub(crate) fn change_action(&mut self, id: BreakpointId, action: BreakpointAction) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.action = Some(action);
                true
            }
            None => false,
        }
    }

    pub(crate) fn expression(&self, id: BreakpointId) -> Option<&str> {
        self.entries.get(&id).map(|entry| entry.expression.as_str())
    }

    /// Take the action out of the entry so it can run without the session
    /// lock held.
    pub(crate) fn begin_dispatch(&mut self, id: BreakpointId) -> DispatchSlot {
        match self.entries.get_mut(&id) {
            None => DispatchSlot::Missing,
            Some(entry) if !entry.enabled => DispatchSlot::Disabled,
            Some(entry) => match entry.action.take() {
                Some(action) => DispatchSlot::Armed(action),
                None => DispatchSlot::Busy,
            },
        }
    }

    /// Put a dispatched action back. Dropped instead if the entry was
    /// removed meanwhile, or if `change_action` installed a replacement
    /// while the old action was running.
    pub(crate) fn finish_dispatch(&mut self, id: BreakpointId, action: BreakpointAction) {
        if let Some(entry) = self.entries.get_mut(&id) {
            if entry.action.is_none() {
                entry.action = Some(action);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
