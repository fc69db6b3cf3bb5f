// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub(crate) mod dispatcher;
pub(crate) mod flow;
mod session;

#[cfg(test)]
mod integration_tests;

pub use flow::ExecutionState;
pub use session::DebugSession;
