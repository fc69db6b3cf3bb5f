// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for flow controller and loop thread lifecycle events.

use std::fmt::{Display, Formatter};

use crate::observability::messages::StructuredLog;

/// The execution state machine took a transition.
///
/// # Log Level
/// `debug!` - high-frequency operational detail
pub struct StateTransition {
    pub from: &'static str,
    pub to: &'static str,
}

impl Display for StateTransition {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Execution state {} -> {}", self.from, self.to)
    }
}

impl StructuredLog for StateTransition {
    fn log(&self) {
        tracing::debug!(from = self.from, to = self.to, "{}", self);
    }
}

/// The loop thread observed a stop and published the acknowledgment.
///
/// # Log Level
/// `info!` - the stop is now caller-visible
pub struct StopAcknowledged {
    pub caches_cleared: usize,
}

impl Display for StopAcknowledged {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Target stopped; acknowledged after clearing {} cache cells",
            self.caches_cleared
        )
    }
}

impl StructuredLog for StopAcknowledged {
    fn log(&self) {
        tracing::info!(caches_cleared = self.caches_cleared, "{}", self);
    }
}

/// The loop thread exited.
///
/// # Log Level
/// `info!` - session lifecycle boundary
pub struct LoopThreadExited {
    pub reason: &'static str,
}

impl Display for LoopThreadExited {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loop thread exited: {}", self.reason)
    }
}

impl StructuredLog for LoopThreadExited {
    fn log(&self) {
        tracing::info!(reason = self.reason, "{}", self);
    }
}

/// The blocking wait call failed.
///
/// # Log Level
/// `error!` - backend fault with no caller to surface it to
pub struct WaitForEventFailed<'a> {
    pub error: &'a crate::errors::BackendError,
}

impl Display for WaitForEventFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Blocking wait for debug event failed: {}", self.error)
    }
}

impl StructuredLog for WaitForEventFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }
}

/// The backend resumed the target without a continue from this session.
///
/// # Log Level
/// `debug!` - expected when a breakpoint action releases the debugger
pub struct BackendResumedTarget;

impl Display for BackendResumedTarget {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Backend reported the target running; latching Running state")
    }
}

impl StructuredLog for BackendResumedTarget {
    fn log(&self) {
        tracing::debug!("{}", self);
    }
}
