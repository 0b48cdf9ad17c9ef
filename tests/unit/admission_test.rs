//! Tests for scoring and admission queue selection

use order_admission::core::{
    score, score_at, AdmissionQueue, CustomerRef, OrderRequest, ProductRef, Tier,
};

const T0: u128 = 1_700_000_000_000;

fn request(name: &str, tier: Tier, enqueued_at_ms: u128) -> OrderRequest {
    OrderRequest::new(
        CustomerRef {
            id: 1,
            name: name.into(),
            tier,
        },
        ProductRef {
            id: 1,
            name: "Coat".into(),
            unit_price: 150.0,
        },
        1,
        enqueued_at_ms,
    )
    .unwrap()
}

#[test]
fn test_score_is_non_decreasing_over_time() {
    let req = request("a", Tier::Standard, T0);
    let mut last = score(&req, T0);
    for step in 1..=60u128 {
        let next = score(&req, T0 + step * 500);
        assert!(next >= last);
        last = next;
    }
}

#[test]
fn test_premium_selected_first_at_equal_wait() {
    let queue = AdmissionQueue::new();
    queue.enqueue(request("standard", Tier::Standard, T0));
    queue.enqueue(request("premium", Tier::Premium, T0));

    let first = queue.select_highest(T0).unwrap();
    assert_eq!(first.customer().name, "premium");
    let second = queue.select_highest(T0).unwrap();
    assert_eq!(second.customer().name, "standard");
    assert!(queue.select_highest(T0).is_none());
}

#[test]
fn test_standard_overtakes_after_twenty_seconds_extra_wait() {
    let queue = AdmissionQueue::new();
    queue.enqueue(request("old standard", Tier::Standard, T0));
    let now = T0 + 25_000;
    queue.enqueue(request("fresh premium", Tier::Premium, now));

    assert!((score_at(Tier::Standard, T0, now) - 22.5).abs() < 1e-9);
    assert_eq!(queue.select_highest(now).unwrap().customer().name, "old standard");
}

#[test]
fn test_empty_queue_returns_none() {
    let queue = AdmissionQueue::new();
    assert!(queue.select_highest(T0).is_none());
    assert!(queue.snapshot(T0).is_empty());
}

#[test]
fn test_snapshot_sorted_descending_and_non_destructive() {
    let queue = AdmissionQueue::new();
    queue.enqueue(request("low", Tier::Standard, T0 + 10_000));
    queue.enqueue(request("high", Tier::Premium, T0));
    queue.enqueue(request("mid", Tier::Standard, T0));

    let snapshot = queue.snapshot(T0 + 10_000);
    let names: Vec<&str> = snapshot.iter().map(|e| e.customer_name.as_str()).collect();
    assert_eq!(names, ["high", "mid", "low"]);
    assert!(snapshot.windows(2).all(|w| w[0].score > w[1].score));
    assert_eq!(snapshot[0].wait_secs, 10);
    assert_eq!(queue.len(), 3);
}
