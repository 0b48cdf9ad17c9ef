//! Admission queue with on-demand re-ranking.
//!
//! Pending requests are kept in insertion order. Every selection re-scores all of them
//! at the current instant and removes the best one, so the scheduler always picks the
//! request that is highest *now* rather than a stale heap position. Ties go to the
//! earliest inserted request.

use parking_lot::Mutex;

use crate::core::request::{OrderRequest, SnapshotEntry};
use crate::core::score::{score, wait_secs};

/// Unbounded, lock-protected queue of pending order requests.
#[derive(Debug, Default)]
pub struct AdmissionQueue {
    pending: Mutex<Vec<OrderRequest>>,
}

impl AdmissionQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request. Never rejects.
    pub fn enqueue(&self, request: OrderRequest) {
        self.pending.lock().push(request);
    }

    /// Remove and return the highest-scoring request at `now_ms`, if any.
    #[must_use]
    pub fn select_highest(&self, now_ms: u128) -> Option<OrderRequest> {
        let mut pending = self.pending.lock();
        let mut best: Option<(usize, f64)> = None;
        for (idx, request) in pending.iter().enumerate() {
            let s = score(request, now_ms);
            // strict comparison keeps the earliest request on ties
            if best.is_none_or(|(_, top)| s > top) {
                best = Some((idx, s));
            }
        }
        best.map(|(idx, _)| pending.remove(idx))
    }

    /// Current queue contents sorted by score, highest first.
    #[must_use]
    pub fn snapshot(&self, now_ms: u128) -> Vec<SnapshotEntry> {
        let pending = self.pending.lock();
        let mut scored: Vec<(f64, &OrderRequest)> =
            pending.iter().map(|r| (score(r, now_ms), r)).collect();
        // stable sort: equal scores keep insertion order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .map(|(s, r)| SnapshotEntry {
                customer_name: r.customer().name.clone(),
                tier: r.customer_tier(),
                product_name: r.product().name.clone(),
                quantity: r.quantity(),
                wait_secs: whole_secs(wait_secs(r.enqueued_at_ms(), now_ms)),
                score: (s * 10.0).round() / 10.0,
            })
            .collect()
    }

    /// Number of pending requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_secs(secs: f64) -> u64 {
    secs.floor() as u64
}
