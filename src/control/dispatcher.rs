// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Event dispatcher: the backend's callback sink.
//!
//! Lives on the loop thread for the whole session. The backend pushes
//! execution-status and breakpoint-hit notifications into it synchronously
//! from inside the blocking wait; the dispatcher drives the state machine
//! and the breakpoint registry and never blocks or calls back into the
//! backend except through the returned [`HitDisposition`].

use tracing::debug;

use std::sync::Arc;

use crate::breakpoints::{BreakpointEventStatus, DispatchSlot};
use crate::control::flow::{ExecutionState, Invalidator, SessionShared};
use crate::observability::messages::breakpoint::{
    BreakpointDispatched, DisabledBreakpointHit, UnknownBreakpointHit,
};
use crate::observability::messages::cache::CachesInvalidated;
use crate::observability::messages::control::BackendResumedTarget;
use crate::observability::messages::StructuredLog;
use crate::traits::{BreakpointId, DebugEventSink, ExecutionStatus, HitDisposition};

pub(crate) struct EventDispatcher {
    shared: Arc<SessionShared>,
    invalidator: Invalidator,
    warn_on_stale_hits: bool,
}

impl EventDispatcher {
    pub(crate) fn new(
        shared: Arc<SessionShared>,
        invalidator: Invalidator,
        warn_on_stale_hits: bool,
    ) -> Self {
        Self {
            shared,
            invalidator,
            warn_on_stale_hits,
        }
    }
}

impl DebugEventSink for EventDispatcher {
    fn on_execution_status_changed(&mut self, status: ExecutionStatus) {
        match status {
            ExecutionStatus::Running => {
                // Latch a backend-initiated resume; the state machine only
                // reaches Running through continue_execution otherwise.
                let mut inner = self.shared.lock();
                if inner.state == ExecutionState::Stopped {
                    BackendResumedTarget.log();
                    self.shared.transition(&mut inner, ExecutionState::Running);
                }
            }
            // Stops and target exit are handled by the loop body after the
            // wait call returns, where invalidation can run outside the
            // callback.
            ExecutionStatus::Stopped | ExecutionStatus::NoTarget => {
                debug!(status = ?status, "execution status reported during wait");
            }
        }
    }

    fn on_breakpoint_hit(&mut self, id: BreakpointId) -> HitDisposition {
        let mut action = {
            let mut inner = self.shared.lock();
            match inner.registry.begin_dispatch(id) {
                DispatchSlot::Missing => {
                    let msg = UnknownBreakpointHit { id };
                    if self.warn_on_stale_hits {
                        msg.log();
                    } else {
                        debug!(id = id.0, "{}", msg);
                    }
                    return HitDisposition::Resume;
                }
                DispatchSlot::Disabled => {
                    let msg = DisabledBreakpointHit { id };
                    if self.warn_on_stale_hits {
                        msg.log();
                    } else {
                        debug!(id = id.0, "{}", msg);
                    }
                    return HitDisposition::Resume;
                }
                DispatchSlot::Busy => return HitDisposition::Resume,
                DispatchSlot::Armed(action) => action,
            }
        };

        // The action may inspect debuggee state and must see a consistent
        // post-stop view: invalidate before it runs.
        let cleared = (self.invalidator)();
        CachesInvalidated { cleared }.log();

        let status = action();

        let mut inner = self.shared.lock();
        inner.registry.finish_dispatch(id, action);
        match status {
            BreakpointEventStatus::ReleaseDebugger => {
                BreakpointDispatched {
                    id,
                    outcome: "release",
                }
                .log();
                HitDisposition::Resume
            }
            BreakpointEventStatus::BreakDebugger => {
                BreakpointDispatched {
                    id,
                    outcome: "break",
                }
                .log();
                // The stop is published right here; no separate break call
                // is required, and a caller already parked in
                // break_execution is released by the same transition.
                if !matches!(
                    inner.state,
                    ExecutionState::Stopped | ExecutionState::Terminated
                ) {
                    self.shared.transition(&mut inner, ExecutionState::Stopped);
                }
                HitDisposition::RemainStopped
            }
        }
    }
}
