use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use crate::backends::{FailingBackend, StubBackend};
use crate::breakpoints::BreakpointEventStatus;
use crate::cache::CacheCell;
use crate::config::SessionConfig;
use crate::control::{DebugSession, ExecutionState};
use crate::errors::ControlError;
use crate::traits::{CacheOwner, Invalidatable};

fn stub_session() -> (DebugSession, Arc<StubBackend>) {
    let backend = Arc::new(StubBackend::new());
    let session =
        DebugSession::attach(backend.clone(), None, SessionConfig::default()).expect("attach");
    (session, backend)
}

/// Poll until the session reaches `expected` or a second passes.
fn wait_for_state(session: &DebugSession, expected: ExecutionState) {
    let deadline = Instant::now() + Duration::from_secs(1);
    while Instant::now() < deadline {
        if session.execution_state() == expected {
            return;
        }
        thread::sleep(Duration::from_millis(2));
    }
    panic!(
        "session never reached {}, still {}",
        expected,
        session.execution_state()
    );
}

struct ProbeRoot {
    threads: CacheCell<Vec<u64>>,
}

impl ProbeRoot {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            threads: CacheCell::new(),
        })
    }
}

impl CacheOwner for ProbeRoot {
    fn invalidatable_slots(&self) -> Vec<&dyn Invalidatable> {
        vec![&self.threads]
    }
}

#[test]
fn fresh_session_starts_stopped() {
    let (session, _backend) = stub_session();
    assert_eq!(session.execution_state(), ExecutionState::Stopped);
    session.terminate().unwrap();
}

#[test]
fn break_while_running_returns_stopped() {
    let (session, _backend) = stub_session();

    session.continue_execution().unwrap();
    assert_eq!(session.execution_state(), ExecutionState::Running);

    session.break_execution().unwrap();
    assert_eq!(session.execution_state(), ExecutionState::Stopped);

    session.terminate().unwrap();
}

#[test]
fn break_can_be_executed_only_once() {
    let (session, _backend) = stub_session();

    session.continue_execution().unwrap();
    session.break_execution().unwrap();

    let second = session.break_execution();
    assert!(matches!(
        second,
        Err(ControlError::InvalidTransition {
            operation: "break",
            state: ExecutionState::Stopped,
        })
    ));
    // The rejected call must not corrupt the state machine.
    assert_eq!(session.execution_state(), ExecutionState::Stopped);

    session.terminate().unwrap();
}

#[test]
fn double_continue_faults() {
    let (session, _backend) = stub_session();

    session.continue_execution().unwrap();
    let second = session.continue_execution();
    assert!(matches!(
        second,
        Err(ControlError::InvalidTransition {
            operation: "continue",
            state: ExecutionState::Running,
        })
    ));

    session.terminate().unwrap();
}

#[test]
fn continue_break_cycles_stay_consistent() {
    let (session, _backend) = stub_session();

    for _ in 0..5 {
        session.continue_execution().unwrap();
        session.break_execution().unwrap();
        assert_eq!(session.execution_state(), ExecutionState::Stopped);
    }

    session.terminate().unwrap();
}

#[test]
fn terminate_unblocks_parked_break_caller() {
    let backend = Arc::new(StubBackend::unresponsive());
    let session = Arc::new(
        DebugSession::attach(backend.clone(), None, SessionConfig::default()).expect("attach"),
    );

    session.continue_execution().unwrap();

    let (tx, rx) = mpsc::channel();
    let blocked = Arc::clone(&session);
    thread::spawn(move || {
        tx.send(blocked.break_execution()).ok();
    });

    // Give the caller time to park inside break_execution.
    thread::sleep(Duration::from_millis(50));
    session.terminate().unwrap();

    let outcome = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("break caller still blocked after terminate");
    assert!(matches!(outcome, Err(ControlError::SessionTerminated)));
}

#[test]
fn terminate_is_idempotent() {
    let (session, _backend) = stub_session();
    session.terminate().unwrap();
    session.terminate().unwrap();

    assert_eq!(session.execution_state(), ExecutionState::Terminated);
    assert!(matches!(
        session.continue_execution(),
        Err(ControlError::SessionTerminated)
    ));
    assert!(matches!(
        session.break_execution(),
        Err(ControlError::SessionTerminated)
    ));
}

#[test]
fn target_exit_terminates_session() {
    let (session, backend) = stub_session();

    session.continue_execution().unwrap();
    backend.exit_target();

    wait_for_state(&session, ExecutionState::Terminated);
    session.terminate().unwrap();
}

#[test]
fn stop_invalidates_caches_before_state_is_published() {
    let root = ProbeRoot::new();
    root.threads.set(vec![1, 2, 3]);

    let backend = Arc::new(StubBackend::new());
    let session = DebugSession::attach(
        backend.clone(),
        Some(root.clone() as Arc<dyn CacheOwner>),
        SessionConfig::default(),
    )
    .expect("attach");

    session.continue_execution().unwrap();
    session.break_execution().unwrap();

    // break_execution returning means the stop was acknowledged, and the
    // acknowledgment is ordered after the invalidation pass.
    assert!(!root.threads.is_cached());

    session.terminate().unwrap();
}

#[test]
fn release_action_keeps_target_running() {
    let (session, backend) = stub_session();

    let hits = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel();
    let action_hits = Arc::clone(&hits);
    let handle = session
        .set_breakpoint("ntdll!NtTerminateProcess", {
            Box::new(move || {
                action_hits.fetch_add(1, Ordering::SeqCst);
                tx.send(()).ok();
                BreakpointEventStatus::ReleaseDebugger
            })
        })
        .unwrap();

    session.continue_execution().unwrap();
    backend.inject_breakpoint_hit(handle.id());

    rx.recv_timeout(Duration::from_secs(1)).expect("action never ran");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(session.execution_state(), ExecutionState::Running);

    session.terminate().unwrap();
}

#[test]
fn break_action_stops_target_without_break_call() {
    let (session, backend) = stub_session();

    let handle = session
        .set_breakpoint("module!function", {
            Box::new(|| BreakpointEventStatus::BreakDebugger)
        })
        .unwrap();

    session.continue_execution().unwrap();
    backend.inject_breakpoint_hit(handle.id());

    wait_for_state(&session, ExecutionState::Stopped);
    // A regular continue must work from an action-initiated stop.
    session.continue_execution().unwrap();
    assert_eq!(session.execution_state(), ExecutionState::Running);

    session.terminate().unwrap();
}

#[test]
fn action_sees_invalidated_caches() {
    let root = ProbeRoot::new();

    let backend = Arc::new(StubBackend::new());
    let session = Arc::new(
        DebugSession::attach(
            backend.clone(),
            Some(root.clone() as Arc<dyn CacheOwner>),
            SessionConfig::default(),
        )
        .expect("attach"),
    );

    let (tx, rx) = mpsc::channel();
    let action_root = Arc::clone(&root);
    let handle = session
        .set_breakpoint("module!function", {
            Box::new(move || {
                // The thread-list cache was primed before the hit; the
                // invalidation pass must have cleared it by now.
                tx.send(action_root.threads.is_cached()).ok();
                BreakpointEventStatus::ReleaseDebugger
            })
        })
        .unwrap();

    root.threads.set(vec![10, 20]);
    session.continue_execution().unwrap();
    backend.inject_breakpoint_hit(handle.id());

    let cached_during_action = rx
        .recv_timeout(Duration::from_secs(1))
        .expect("action never ran");
    assert!(!cached_during_action);

    session.terminate().unwrap();
}

#[test]
fn disabled_breakpoint_hit_is_ignored() {
    let (session, backend) = stub_session();

    let hits = Arc::new(AtomicUsize::new(0));
    let action_hits = Arc::clone(&hits);
    let handle = session
        .set_breakpoint("module!function", {
            Box::new(move || {
                action_hits.fetch_add(1, Ordering::SeqCst);
                BreakpointEventStatus::BreakDebugger
            })
        })
        .unwrap();

    handle.disable().unwrap();
    assert_eq!(backend.is_breakpoint_enabled(handle.id()), Some(false));

    session.continue_execution().unwrap();
    // A stale hit can still arrive after the disable; it must be ignored,
    // not faulted.
    backend.inject_breakpoint_hit(handle.id());

    session.break_execution().unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(session.execution_state(), ExecutionState::Stopped);

    session.terminate().unwrap();
}

#[test]
fn removed_breakpoint_hit_is_ignored() {
    let (session, backend) = stub_session();

    let hits = Arc::new(AtomicUsize::new(0));
    let action_hits = Arc::clone(&hits);
    let handle = session
        .set_breakpoint("module!function", {
            Box::new(move || {
                action_hits.fetch_add(1, Ordering::SeqCst);
                BreakpointEventStatus::BreakDebugger
            })
        })
        .unwrap();
    let id = handle.id();

    handle.remove().unwrap();
    assert!(!backend.has_breakpoint(id));
    // Removing through a stale handle is a no-op, not a fault.
    handle.remove().unwrap();

    session.continue_execution().unwrap();
    backend.inject_breakpoint_hit(id);

    session.break_execution().unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    session.terminate().unwrap();
}

#[test]
fn change_action_replaces_behavior() {
    let (session, backend) = stub_session();

    let first_hits = Arc::new(AtomicUsize::new(0));
    let action_hits = Arc::clone(&first_hits);
    let handle = session
        .set_breakpoint("module!function", {
            Box::new(move || {
                action_hits.fetch_add(1, Ordering::SeqCst);
                BreakpointEventStatus::ReleaseDebugger
            })
        })
        .unwrap();

    let second_hits = Arc::new(AtomicUsize::new(0));
    let replacement_hits = Arc::clone(&second_hits);
    let (tx, rx) = mpsc::channel();
    handle
        .change_action(Box::new(move || {
            replacement_hits.fetch_add(1, Ordering::SeqCst);
            tx.send(()).ok();
            BreakpointEventStatus::ReleaseDebugger
        }))
        .unwrap();

    session.continue_execution().unwrap();
    backend.inject_breakpoint_hit(handle.id());

    rx.recv_timeout(Duration::from_secs(1))
        .expect("replacement action never ran");
    assert_eq!(first_hits.load(Ordering::SeqCst), 0);
    assert_eq!(second_hits.load(Ordering::SeqCst), 1);

    session.terminate().unwrap();
}

#[test]
fn handle_operations_fault_after_remove() {
    let (session, _backend) = stub_session();

    let handle = session
        .set_breakpoint("module!function", {
            Box::new(|| BreakpointEventStatus::BreakDebugger)
        })
        .unwrap();
    handle.remove().unwrap();

    assert!(matches!(
        handle.enable(),
        Err(ControlError::BreakpointRemoved)
    ));
    assert!(matches!(
        handle.disable(),
        Err(ControlError::BreakpointRemoved)
    ));
    assert!(matches!(
        handle.change_action(Box::new(|| BreakpointEventStatus::BreakDebugger)),
        Err(ControlError::BreakpointRemoved)
    ));

    session.terminate().unwrap();
}

#[test]
fn breakpoint_creation_failure_surfaces_fault() {
    let backend = Arc::new(StubBackend::without_breakpoint_support());
    let session =
        DebugSession::attach(backend.clone(), None, SessionConfig::default()).expect("attach");

    let result = session.set_breakpoint("module!function", {
        Box::new(|| BreakpointEventStatus::BreakDebugger)
    });
    assert!(matches!(result, Err(ControlError::Backend(_))));

    session.terminate().unwrap();
}

#[test]
fn failing_backend_surfaces_resume_fault() {
    let backend = Arc::new(FailingBackend);
    let session =
        DebugSession::attach(backend.clone(), None, SessionConfig::default()).expect("attach");

    let result = session.continue_execution();
    assert!(matches!(result, Err(ControlError::Backend(_))));
    // State untouched by the rejected resume.
    assert_eq!(session.execution_state(), ExecutionState::Stopped);

    let shutdown = session.terminate();
    assert!(matches!(shutdown, Err(ControlError::Backend(_))));
    assert_eq!(session.execution_state(), ExecutionState::Terminated);
}

#[test]
fn sessions_do_not_share_state() {
    let (first, _b1) = stub_session();
    let (second, _b2) = stub_session();

    first.continue_execution().unwrap();
    assert_eq!(first.execution_state(), ExecutionState::Running);
    assert_eq!(second.execution_state(), ExecutionState::Stopped);

    first.terminate().unwrap();
    assert_eq!(second.execution_state(), ExecutionState::Stopped);
    second.terminate().unwrap();
}

#[test]
fn bounded_wait_timeout_keeps_loop_healthy() {
    let backend = Arc::new(StubBackend::new());
    let config = SessionConfig {
        wait_timeout_ms: Some(10),
        ..SessionConfig::default()
    };
    let session = DebugSession::attach(backend.clone(), None, config).expect("attach");

    session.continue_execution().unwrap();
    // Let several waits time out and re-enter before breaking.
    thread::sleep(Duration::from_millis(50));
    session.break_execution().unwrap();
    assert_eq!(session.execution_state(), ExecutionState::Stopped);

    session.terminate().unwrap();
}
