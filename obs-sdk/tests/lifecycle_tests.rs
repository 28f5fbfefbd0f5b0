//! Reference-count lifecycle tests for the shared connection
//!
//! The manager must be started exactly once per 0→1 transition and stopped
//! exactly once per 1→0 transition, whatever the order of acquires and
//! releases.

use proptest::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use obs_client::{MockTransport, Request, Transport};
use obs_sdk::{
    ConnectionLease, EventHandler, EventKind, LifecycleStats, ManagerConfig, ObsEvent,
    SharedConnection, StaticSettings,
};
use parking_lot::Mutex;

// ============================================================================
// Test Helpers
// ============================================================================

fn shared_with(mock: &Arc<MockTransport>) -> SharedConnection {
    let mock = Arc::clone(mock);
    SharedConnection::new(StaticSettings::default(), move |_: &obs_sdk::Settings| {
        Arc::clone(&mock) as Arc<dyn Transport>
    })
    .with_manager_config(ManagerConfig::new().with_poll_interval(Duration::from_millis(2)))
}

fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

#[derive(Debug, Clone)]
enum Op {
    Acquire,
    /// Release the lease at this index (modulo the number held)
    Release(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Acquire), any::<usize>().prop_map(Op::Release)]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Starts match 0→1 transitions, stops match starts once balanced
    #[test]
    fn prop_manager_started_once_per_activation(ops in prop::collection::vec(op_strategy(), 0..24)) {
        let mock = Arc::new(MockTransport::unreachable());
        let shared = shared_with(&mock);

        let mut held: Vec<ConnectionLease<'_>> = Vec::new();
        let mut activations = 0;

        for op in ops {
            match op {
                Op::Acquire => {
                    if held.is_empty() {
                        activations += 1;
                    }
                    held.push(shared.acquire());
                }
                Op::Release(index) => {
                    if !held.is_empty() {
                        let lease = held.remove(index % held.len());
                        lease.release();
                    }
                }
            }

            prop_assert_eq!(shared.ref_count(), held.len());
            prop_assert_eq!(shared.is_active(), !held.is_empty());
        }

        held.clear();

        let stats = shared.lifecycle_stats();
        prop_assert_eq!(stats, LifecycleStats { started: activations, stopped: activations });
        prop_assert_eq!(shared.ref_count(), 0);
        prop_assert!(!shared.is_active());
        prop_assert!(!mock.has_push_handler());
    }
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_consumers_share_one_manager() {
    let mock = Arc::new(MockTransport::new());
    let shared = shared_with(&mock);

    let anchor = shared.acquire();
    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..10 {
                    let lease = shared.acquire();
                    let _ = lease.is_connected();
                    lease.release();
                }
            });
        }
    });
    assert_eq!(shared.ref_count(), 1);
    anchor.release();

    assert_eq!(
        shared.lifecycle_stats(),
        LifecycleStats {
            started: 1,
            stopped: 1
        }
    );
}

#[test]
fn test_concurrent_churn_stays_balanced() {
    let mock = Arc::new(MockTransport::unreachable());
    let shared = shared_with(&mock);

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..10 {
                    let first = shared.acquire();
                    let second = first.clone();
                    drop(first);
                    drop(second);
                }
            });
        }
    });

    let stats = shared.lifecycle_stats();
    assert_eq!(stats.started, stats.stopped);
    assert!(stats.started >= 1);
    assert_eq!(shared.ref_count(), 0);
    assert!(!shared.is_active());
}

#[test]
fn test_last_lease_dropped_inside_subscriber() {
    let mock = Arc::new(MockTransport::unreachable());
    let shared: &'static SharedConnection = Box::leak(Box::new(shared_with(&mock)));

    let slot: Arc<Mutex<Option<ConnectionLease<'static>>>> = Arc::new(Mutex::new(None));
    let handler: EventHandler = {
        let slot = Arc::clone(&slot);
        Arc::new(move |_: &ObsEvent| {
            let lease = slot.lock().take();
            drop(lease);
        })
    };

    let lease = shared.acquire();
    lease.subscribe(EventKind::ConnectionEstablished, &handler);
    *slot.lock() = Some(lease);
    mock.set_reachable(true);

    assert!(wait_until(|| !shared.is_active()));
    assert_eq!(shared.ref_count(), 0);
    assert!(!mock.is_connected());
    assert!(!mock.has_push_handler());

    let again = shared.acquire();
    assert!(shared.is_active());
    again.release();
    assert_eq!(
        shared.lifecycle_stats(),
        LifecycleStats {
            started: 2,
            stopped: 2
        }
    );
}

// ============================================================================
// Forwarding
// ============================================================================

#[test]
fn test_lease_forwards_to_live_manager() {
    let mock = Arc::new(MockTransport::unreachable().with_scene("Intro"));
    let shared = shared_with(&mock);

    let established = Arc::new(Mutex::new(0));
    let handler: EventHandler = {
        let established = Arc::clone(&established);
        Arc::new(move |_: &ObsEvent| *established.lock() += 1)
    };

    let lease = shared.acquire();
    lease.subscribe(EventKind::ConnectionEstablished, &handler);
    mock.set_reachable(true);

    assert!(wait_until(|| lease.is_connected() && lease.current_scene().is_some()));
    assert_eq!(lease.current_scene().as_deref(), Some("Intro"));
    assert!(wait_until(|| lease.stream_status().is_some()));
    assert!(wait_until(|| *established.lock() == 1));

    lease.set_scene("Outro");
    lease.start_streaming();
    lease.toggle_recording();
    lease.release();

    assert!(!mock.is_connected());
    assert_eq!(
        mock.commands(),
        vec![
            Request::SetCurrentScene {
                scene_name: "Outro".to_string()
            },
            Request::StartStreaming,
            Request::StartRecording,
        ]
    );
}

#[test]
fn test_commands_dropped_while_unreachable() {
    let mock = Arc::new(MockTransport::unreachable());
    let shared = shared_with(&mock);

    let lease = shared.acquire();
    lease.set_scene("X");
    lease.stop_recording();
    lease.release();

    assert!(mock.calls().is_empty());
}
