//! Checkout preconditions and the reconciliation contract.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use canteen_core::{GatewayOrderId, OrderStatus};
use canteen_server::services::checkout::{ReconcilePolicy, poll_until};

// =============================================================================
// Reconciliation Contract
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_reconcile_horizon_is_thirty_probes() {
    // 2 s interval, 60 s timeout: the poll gives up after at most 30 probes
    // and reports "not found" rather than an error.
    let policy = ReconcilePolicy::default();
    let probes = AtomicU32::new(0);

    let outcome: Result<Option<GatewayOrderId>, std::convert::Infallible> =
        poll_until(policy, || {
            probes.fetch_add(1, Ordering::SeqCst);
            async { Ok(None) }
        })
        .await;

    assert!(matches!(outcome, Ok(None)));
    assert!(probes.load(Ordering::SeqCst) <= 30);
    assert_eq!(probes.load(Ordering::SeqCst), 30);
}

#[tokio::test(start_paused = true)]
async fn test_reconcile_stops_at_first_sighting() {
    // The webhook lands mid-poll: detection happens on the next probe, not
    // after the full horizon.
    let policy = ReconcilePolicy::default();
    let probes = AtomicU32::new(0);

    let outcome: Result<Option<GatewayOrderId>, std::convert::Infallible> =
        poll_until(policy, || {
            let n = probes.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok((n == 3).then(|| GatewayOrderId::new("order_abc"))) }
        })
        .await;

    assert_eq!(
        outcome.expect("no probe error"),
        Some(GatewayOrderId::new("order_abc"))
    );
    assert_eq!(probes.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_tight_policy_for_tests_probes_quickly() {
    let policy = ReconcilePolicy {
        interval: Duration::from_millis(1),
        timeout: Duration::from_millis(10),
    };
    let probes = AtomicU32::new(0);

    let outcome: Result<Option<u8>, std::convert::Infallible> = poll_until(policy, || {
        probes.fetch_add(1, Ordering::SeqCst);
        async { Ok(None) }
    })
    .await;

    assert!(matches!(outcome, Ok(None)));
    assert_eq!(probes.load(Ordering::SeqCst), 10);
}

// =============================================================================
// Status Lifecycle
// =============================================================================

#[test]
fn test_order_status_lifecycle_order() {
    // Admin pickers walk ALL in lifecycle order.
    assert_eq!(
        OrderStatus::ALL,
        [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::ReadyForPickup,
            OrderStatus::Completed,
        ]
    );
}

#[test]
fn test_status_labels_match_stored_values() {
    for status in OrderStatus::ALL {
        let parsed: OrderStatus = status.as_str().parse().expect("round trip");
        assert_eq!(parsed, status);
    }
    assert_eq!(OrderStatus::ReadyForPickup.as_str(), "Ready for Pickup");
}
