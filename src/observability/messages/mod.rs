// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for human-readable output and
//! [`StructuredLog`] to emit itself with structured fields at its canonical
//! level.
//!
//! # Usage Pattern
//!
//! ```rust
//! use debuggee_control::observability::messages::control::StopAcknowledged;
//! use debuggee_control::observability::messages::StructuredLog;
//!
//! StopAcknowledged { caches_cleared: 4 }.log();
//! ```

pub mod breakpoint;
pub mod cache;
pub mod control;

use std::fmt::Display;

/// Emit the message through `tracing` with structured fields at the level
/// the message documents.
pub trait StructuredLog: Display {
    fn log(&self);
}
