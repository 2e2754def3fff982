//! Re-entrancy guard for two-way synchronization.
//!
//! When two pieces of state mirror each other (a selection model and a set of
//! boolean controls, for instance), updating one side fires events that would
//! update the other side, which fires events back. A [`SyncGuard`] breaks the
//! loop: only the first caller gets a [`SyncToken`]; nested attempts get
//! `None` and should return without doing anything.

use std::sync::atomic::{AtomicBool, Ordering};

/// A compare-and-set flag marking that a synchronization pass is in flight.
///
/// ```
/// use arbor_core::SyncGuard;
///
/// let guard = SyncGuard::new();
/// let token = guard.try_enter().expect("first entry succeeds");
/// assert!(guard.try_enter().is_none());
/// drop(token);
/// assert!(guard.try_enter().is_some());
/// ```
#[derive(Debug, Default)]
pub struct SyncGuard {
    active: AtomicBool,
}

impl SyncGuard {
    /// Create an inactive guard.
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    /// Try to start a synchronization pass.
    ///
    /// Returns `None` if a pass is already in flight.
    pub fn try_enter(&self) -> Option<SyncToken<'_>> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SyncToken { guard: self })
    }

    /// Whether a synchronization pass is in flight.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Proof of an active synchronization pass; ends the pass when dropped.
#[derive(Debug)]
#[must_use = "the synchronization pass ends when the token is dropped"]
pub struct SyncToken<'a> {
    guard: &'a SyncGuard,
}

impl Drop for SyncToken<'_> {
    fn drop(&mut self) {
        self.guard.active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_entry_is_refused() {
        let guard = SyncGuard::new();
        assert!(!guard.is_active());

        let token = guard.try_enter();
        assert!(token.is_some());
        assert!(guard.is_active());
        assert!(guard.try_enter().is_none());

        drop(token);
        assert!(!guard.is_active());
    }

    #[test]
    fn test_single_winner_across_threads() {
        use std::sync::atomic::AtomicUsize;
        use std::sync::{Arc, Barrier};

        let guard = Arc::new(SyncGuard::new());
        let winners = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));
        let hold = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                let winners = winners.clone();
                let barrier = barrier.clone();
                let hold = hold.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    let token = guard.try_enter();
                    if token.is_some() {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                    // Keep the token alive until everyone has tried.
                    hold.wait();
                    drop(token);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
