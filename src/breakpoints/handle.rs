// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::control::flow::SessionShared;
use crate::errors::ControlError;
use crate::traits::{BreakpointId, DebuggerBackend};

/// Handle to a registered breakpoint.
///
/// Returned by `DebugSession::set_breakpoint`; the handle stays valid after
/// [`remove`](Self::remove) but every operation except a repeated `remove`
/// then faults with [`ControlError::BreakpointRemoved`].
pub struct BreakpointHandle {
    shared: Arc<SessionShared>,
    backend: Arc<dyn DebuggerBackend>,
    id: BreakpointId,
}

impl BreakpointHandle {
    pub(crate) fn new(
        shared: Arc<SessionShared>,
        backend: Arc<dyn DebuggerBackend>,
        id: BreakpointId,
    ) -> Self {
        Self {
            shared,
            backend,
            id,
        }
    }

    /// The backend-assigned id of this breakpoint.
    pub fn id(&self) -> BreakpointId {
        self.id
    }

    /// Enable the breakpoint. Idempotent.
    pub fn enable(&self) -> Result<(), ControlError> {
        self.set_enabled(true)
    }

    /// Disable the breakpoint without removing it. Idempotent; hits the
    /// backend may still deliver for the id are ignored while disabled.
    pub fn disable(&self) -> Result<(), ControlError> {
        self.set_enabled(false)
    }

    fn set_enabled(&self, enabled: bool) -> Result<(), ControlError> {
        let mut inner = self.shared.lock();
        if !inner.registry.contains(self.id) {
            return Err(ControlError::BreakpointRemoved);
        }
        self.backend.set_breakpoint_enabled(self.id, enabled)?;
        inner.registry.set_enabled(self.id, enabled);
        Ok(())
    }

    /// Unregister the breakpoint from the backend and drop the registry
    /// entry. A second `remove` is a no-op; hits the backend delivers after
    /// removal are ignored, since delivery ordering relative to removal is
    /// not guaranteed.
    pub fn remove(&self) -> Result<(), ControlError> {
        let mut inner = self.shared.lock();
        if !inner.registry.contains(self.id) {
            return Ok(());
        }
        self.backend.remove_breakpoint(self.id)?;
        inner.registry.remove(self.id);
        Ok(())
    }

    /// Replace the action that runs when this breakpoint is hit. Enablement
    /// is untouched.
    pub fn change_action(
        &self,
        action: crate::breakpoints::BreakpointAction,
    ) -> Result<(), ControlError> {
        let mut inner = self.shared.lock();
        if inner.registry.change_action(self.id, action) {
            Ok(())
        } else {
            Err(ControlError::BreakpointRemoved)
        }
    }
}
