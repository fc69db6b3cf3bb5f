// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! Centralized message types for all diagnostic logging in the crate.
//! Message types follow a struct-based pattern with a `Display`
//! implementation, which keeps log strings out of the control-flow code and
//! gives every subsystem a consistent vocabulary.
//!
//! Messages are organized by subsystem:
//! * `messages::control` - flow controller and loop thread lifecycle
//! * `messages::breakpoint` - breakpoint registration and dispatch
//! * `messages::cache` - cache invalidation passes

pub mod messages;
