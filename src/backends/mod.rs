// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Debugger backend implementations.
//!
//! Every backend implements `crate::traits::DebuggerBackend`. A production
//! build would carry one module per native debugger API here; this crate
//! ships the synthetic backends used by the test suite and the demo binary:
//!
//! - **StubBackend**: scripted in-process target; break requests, breakpoint
//!   hits and target exit are injected by the test or demo driver
//! - **FailingBackend**: rejects every command, for fault-path tests

pub mod stub;

pub use stub::{FailingBackend, StubBackend};
