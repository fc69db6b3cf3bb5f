// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for cache invalidation passes.

use std::fmt::{Display, Formatter};

use crate::observability::messages::StructuredLog;

/// One invalidation pass over the session's cache graph completed.
///
/// # Log Level
/// `debug!` - runs on every stop
pub struct CachesInvalidated {
    pub cleared: usize,
}

impl Display for CachesInvalidated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Invalidated {} cache cells", self.cleared)
    }
}

impl StructuredLog for CachesInvalidated {
    fn log(&self) {
        tracing::debug!(cleared = self.cleared, "{}", self);
    }
}
