//! Fixed-capacity permit pool bounding how many boxes are processed at once.
//!
//! A unit holds one permit from validation through post-download
//! verification. `drain` takes every permit, so it only completes once all
//! in-flight units have released theirs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting permit pool with an instrumented in-use counter.
#[derive(Debug)]
pub struct PermitPool {
    capacity: usize,
    semaphore: Arc<Semaphore>,
    in_use: Arc<AtomicUsize>,
    peak: AtomicUsize,
}

impl PermitPool {
    /// Create a pool with `capacity` permits (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
            in_use: Arc::new(AtomicUsize::new(0)),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently held by units.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    /// Highest number of simultaneously held permits since the last `reset_peak`.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }

    pub fn reset_peak(&self) {
        self.peak.store(self.in_use(), Ordering::Release);
    }

    /// Wait for a free permit. The returned guard releases it on drop.
    pub async fn acquire(&self) -> PermitGuard {
        let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(p) => p,
            Err(_) => unreachable!("permit pool semaphore is never closed"),
        };
        let now = self.in_use.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::AcqRel);
        PermitGuard {
            in_use: Arc::clone(&self.in_use),
            _permit: permit,
        }
    }

    /// Barrier: wait until every permit is free and hold all of them.
    /// Dropping the returned permit makes the pool usable again.
    pub async fn drain(&self) -> OwnedSemaphorePermit {
        match Arc::clone(&self.semaphore)
            .acquire_many_owned(self.capacity as u32)
            .await
        {
            Ok(p) => p,
            Err(_) => unreachable!("permit pool semaphore is never closed"),
        }
    }
}

/// One held permit. The counter is decremented before the permit itself
/// is returned, so `in_use` never over-reports.
#[derive(Debug)]
pub struct PermitGuard {
    in_use: Arc<AtomicUsize>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for PermitGuard {
    fn drop(&mut self) {
        self.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn acquire_and_release_track_usage() {
        let pool = PermitPool::new(2);
        let a = pool.acquire().await;
        let b = pool.acquire().await;
        assert_eq!(pool.in_use(), 2);
        assert_eq!(pool.peak(), 2);
        drop(a);
        assert_eq!(pool.in_use(), 1);
        drop(b);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.peak(), 2);
        pool.reset_peak();
        assert_eq!(pool.peak(), 0);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(PermitPool::new(0).capacity(), 1);
    }

    #[tokio::test]
    async fn acquire_blocks_when_full() {
        let pool = PermitPool::new(1);
        let held = pool.acquire().await;
        let blocked = tokio::time::timeout(Duration::from_millis(50), pool.acquire()).await;
        assert!(blocked.is_err(), "second acquire must wait while the pool is full");
        drop(held);
        let _again = tokio::time::timeout(Duration::from_secs(1), pool.acquire())
            .await
            .expect("permit released");
    }

    #[tokio::test]
    async fn drain_waits_for_outstanding_permits() {
        let pool = Arc::new(PermitPool::new(3));
        let held = pool.acquire().await;
        let early = tokio::time::timeout(Duration::from_millis(50), pool.drain()).await;
        assert!(early.is_err(), "drain must wait for the held permit");

        let worker = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(held);
        });
        let barrier = tokio::time::timeout(Duration::from_secs(1), pool.drain())
            .await
            .expect("drain completes after release");
        worker.await.unwrap();
        drop(barrier);
        let _p = pool.acquire().await;
    }
}
