// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for breakpoint registration and dispatch events.

use std::fmt::{Display, Formatter};

use crate::observability::messages::StructuredLog;
use crate::traits::BreakpointId;

/// A breakpoint was created and registered.
///
/// # Log Level
/// `info!` - caller-initiated configuration change
pub struct BreakpointCreated<'a> {
    pub id: BreakpointId,
    pub expression: &'a str,
}

impl Display for BreakpointCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Registered {} at '{}'", self.id, self.expression)
    }
}

impl StructuredLog for BreakpointCreated<'_> {
    fn log(&self) {
        tracing::info!(id = self.id.0, expression = self.expression, "{}", self);
    }
}

/// A hit arrived for an id the registry has no record of.
///
/// Benign: backend delivery ordering relative to removal is not guaranteed.
/// The target is resumed.
///
/// # Log Level
/// `warn!` or `debug!` depending on `warn_on_stale_hits`
pub struct UnknownBreakpointHit {
    pub id: BreakpointId,
}

impl Display for UnknownBreakpointHit {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Hit for unregistered {}; resuming", self.id)
    }
}

impl StructuredLog for UnknownBreakpointHit {
    fn log(&self) {
        tracing::warn!(id = self.id.0, "{}", self);
    }
}

/// A hit arrived for a breakpoint that is disabled.
///
/// # Log Level
/// `warn!` or `debug!` depending on `warn_on_stale_hits`
pub struct DisabledBreakpointHit {
    pub id: BreakpointId,
}

impl Display for DisabledBreakpointHit {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Hit for disabled {}; resuming", self.id)
    }
}

impl StructuredLog for DisabledBreakpointHit {
    fn log(&self) {
        tracing::warn!(id = self.id.0, "{}", self);
    }
}

/// A breakpoint action ran to completion.
///
/// # Log Level
/// `debug!` - high-frequency during instrumented runs
pub struct BreakpointDispatched {
    pub id: BreakpointId,
    pub outcome: &'static str,
}

impl Display for BreakpointDispatched {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dispatched {}: {}", self.id, self.outcome)
    }
}

impl StructuredLog for BreakpointDispatched {
    fn log(&self) {
        tracing::debug!(id = self.id.0, outcome = self.outcome, "{}", self);
    }
}
