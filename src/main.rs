// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scripted demo of the execution-control protocol against the stub
//! backend: attach, breakpoint, continue, hit, break, terminate.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use debuggee_control::backends::StubBackend;
use debuggee_control::cache::CacheCell;
use debuggee_control::config::load_and_validate_config;
use debuggee_control::traits::{CacheOwner, Invalidatable};
use debuggee_control::{BreakpointEventStatus, DebugSession, SessionConfig};

/// Stand-in for a process object memoizing its thread list.
struct DemoProcess {
    threads: CacheCell<Vec<u64>>,
}

impl CacheOwner for DemoProcess {
    fn invalidatable_slots(&self) -> Vec<&dyn Invalidatable> {
        vec![&self.threads]
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => load_and_validate_config(path)
            .with_context(|| format!("loading session config from {}", path))?,
        None => SessionConfig::default(),
    };

    println!("🔬 debuggee-control demo (stub backend)");
    println!("Config: {:?}", config);
    println!();

    let backend = Arc::new(StubBackend::new());
    let process = Arc::new(DemoProcess {
        threads: CacheCell::new(),
    });
    let session = DebugSession::attach(
        backend.clone(),
        Some(process.clone() as Arc<dyn CacheOwner>),
        config,
    )?;
    println!("1. Attached; state: {}", session.execution_state());

    let hits = Arc::new(AtomicUsize::new(0));
    let action_hits = Arc::clone(&hits);
    let handle = session.set_breakpoint("demo!worker_entry", {
        Box::new(move || {
            let count = action_hits.fetch_add(1, Ordering::SeqCst) + 1;
            println!("   • breakpoint action ran (hit {})", count);
            if count < 2 {
                BreakpointEventStatus::ReleaseDebugger
            } else {
                BreakpointEventStatus::BreakDebugger
            }
        })
    })?;
    println!("2. Breakpoint registered: {}", handle.id());

    // Prime the cache while stopped, the way scripts read debuggee state.
    let threads = process.threads.get_or_compute(|| vec![4404, 4408, 4412]);
    println!("3. Thread list cached: {:?}", threads);

    session.continue_execution()?;
    println!("4. Continued; state: {}", session.execution_state());

    backend.inject_breakpoint_hit(handle.id());
    backend.inject_breakpoint_hit(handle.id());
    while session.execution_state() != debuggee_control::ExecutionState::Stopped {
        std::thread::yield_now();
    }
    println!(
        "5. Second hit broke the debugger; state: {}, hits: {}",
        session.execution_state(),
        hits.load(Ordering::SeqCst)
    );
    println!(
        "   thread list cache after stop: {}",
        if process.threads.is_cached() {
            "stale (bug!)"
        } else {
            "cleared, will recompute"
        }
    );

    session.continue_execution()?;
    session.break_execution()?;
    println!("6. Broke on request; state: {}", session.execution_state());

    session.terminate()?;
    println!("7. Terminated; state: {}", session.execution_state());
    println!();
    println!("🎉 Demo complete");

    Ok(())
}
