//! Coordinator lock serializing order completion against administrative writes.

use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

/// Process-wide reentrant lock shared by the scheduler's completion phase and every
/// administrative product/customer mutation.
///
/// Cloning yields another handle to the same lock. The lock is global rather than
/// per-customer, which is coarse but keeps check-then-write sequences (such as tier
/// promotion) atomic with respect to each other.
#[derive(Debug, Clone, Default)]
pub struct Coordinator {
    lock: Arc<ReentrantMutex<()>>,
}

/// Guard holding the coordinator lock until dropped.
pub type CoordinatorGuard<'a> = ReentrantMutexGuard<'a, ()>;

impl Coordinator {
    /// Create a new, unlocked coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock is held by this thread.
    #[must_use]
    pub fn lock(&self) -> CoordinatorGuard<'_> {
        self.lock.lock()
    }

    /// Try to take the lock without blocking.
    #[must_use]
    pub fn try_lock(&self) -> Option<CoordinatorGuard<'_>> {
        self.lock.try_lock()
    }

    /// Run `f` while holding the lock.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.lock.lock();
        f()
    }

    /// Whether any thread currently holds the lock.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }
}
