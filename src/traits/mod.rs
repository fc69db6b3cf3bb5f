pub mod backend;
pub mod invalidatable;

pub use backend::{BreakpointId, DebugEventSink, DebuggerBackend, ExecutionStatus, HitDisposition};
pub use invalidatable::{CacheOwner, CachedPayload, Invalidatable};
