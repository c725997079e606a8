//! Counting permit pool bounding how many external calls run at once.
//!
//! The pool is a bounded [`crossbeam_channel`] pre-filled with one token per
//! unit of capacity. Acquiring a permit receives a token, dropping the
//! [`Permit`] sends it back, so release happens on every exit path including
//! early returns and unwinding.
//!
//! A pool is constructed by the caller of a batch and passed in explicitly;
//! clones share the same tokens.
//!
//! ```rust
//! use slowsort_rt::permits::PermitPool;
//!
//! let pool = PermitPool::new(2).unwrap();
//! let a = pool.acquire();
//! let _b = pool.acquire();
//! assert!(pool.try_acquire().is_none());
//! drop(a);
//! assert!(pool.try_acquire().is_some());
//! ```

use std::fmt;

use crossbeam_channel::{self as cb, TryRecvError};

use crate::error::ConfigError;

#[derive(Clone)]
pub struct PermitPool {
    tokens_tx: cb::Sender<()>,
    tokens_rx: cb::Receiver<()>,
    capacity: usize,
}

impl PermitPool {
    /// Create a pool with `capacity` free permits.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroPermits);
        }
        let (tokens_tx, tokens_rx) = cb::bounded(capacity);
        for _ in 0..capacity {
            // Cannot fail: the channel has exactly `capacity` slots and we
            // hold the receiver.
            let _ = tokens_tx.try_send(());
        }
        Ok(Self {
            tokens_tx,
            tokens_rx,
            capacity,
        })
    }

    /// Block until a permit is free and take it.
    pub fn acquire(&self) -> Permit<'_> {
        let received = self.tokens_rx.recv();
        // The pool owns a sender, so the channel never disconnects.
        debug_assert!(received.is_ok(), "permit pool channel disconnected");
        Permit { pool: self }
    }

    /// Take a permit if one is free right now.
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        match self.tokens_rx.try_recv() {
            Ok(()) => Some(Permit { pool: self }),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held by anyone.
    pub fn available(&self) -> usize {
        self.tokens_rx.len()
    }

    fn release(&self) {
        let _ = self.tokens_tx.try_send(());
    }
}

impl fmt::Debug for PermitPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermitPool")
            .field("capacity", &self.capacity)
            .field("available", &self.available())
            .finish()
    }
}

/// One unit of pool capacity, returned on drop.
#[must_use = "a permit is released as soon as it is dropped"]
pub struct Permit<'a> {
    pool: &'a PermitPool,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.pool.release();
    }
}

impl fmt::Debug for Permit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permit")
            .field("capacity", &self.pool.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    // 1. Zero capacity is a configuration error
    #[test]
    fn zero_capacity_rejected() {
        assert_eq!(PermitPool::new(0).unwrap_err(), ConfigError::ZeroPermits);
    }

    // 2. Fresh pool has every permit available
    #[test]
    fn new_pool_is_full() {
        let pool = PermitPool::new(3).unwrap();
        assert_eq!(pool.capacity(), 3);
        assert_eq!(pool.available(), 3);
    }

    // 3. Dropping a permit returns it
    #[test]
    fn drop_releases_permit() {
        let pool = PermitPool::new(1).unwrap();
        {
            let _permit = pool.acquire();
            assert_eq!(pool.available(), 0);
            assert!(pool.try_acquire().is_none());
        }
        assert_eq!(pool.available(), 1);
    }

    // 4. Permits are released while unwinding
    #[test]
    fn panic_while_holding_releases_permit() {
        let pool = PermitPool::new(1).unwrap();
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _permit = pool.acquire();
            panic!("holder panicked");
        }));
        assert!(result.is_err());
        assert_eq!(pool.available(), 1);
    }

    // 5. Clones share capacity
    #[test]
    fn clones_share_tokens() {
        let pool = PermitPool::new(2).unwrap();
        let other = pool.clone();
        let _a = pool.acquire();
        let _b = other.acquire();
        assert!(pool.try_acquire().is_none());
        assert!(other.try_acquire().is_none());
    }

    // 6. acquire blocks until a holder releases
    #[test]
    fn acquire_blocks_until_release() {
        let pool = PermitPool::new(1).unwrap();
        let held = pool.acquire();
        let acquired = AtomicUsize::new(0);

        thread::scope(|s| {
            s.spawn(|| {
                let _permit = pool.acquire();
                acquired.store(1, Ordering::Release);
            });
            thread::sleep(Duration::from_millis(30));
            assert_eq!(acquired.load(Ordering::Acquire), 0);
            drop(held);
        });

        assert_eq!(acquired.load(Ordering::Acquire), 1);
        assert_eq!(pool.available(), 1);
    }

    // 7. Never more holders than capacity
    #[test]
    fn concurrent_holders_never_exceed_capacity() {
        let pool = PermitPool::new(2).unwrap();
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        thread::scope(|s| {
            for _ in 0..8 {
                let pool = &pool;
                let current = Arc::clone(&current);
                let peak = Arc::clone(&peak);
                s.spawn(move || {
                    for _ in 0..5 {
                        let _permit = pool.acquire();
                        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(1));
                        current.fetch_sub(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(pool.available(), 2);
    }

    // 8. Debug format
    #[test]
    fn debug_format() {
        let pool = PermitPool::new(2).unwrap();
        let dbg = format!("{:?}", pool);
        assert!(dbg.contains("capacity: 2"));
        assert!(dbg.contains("available: 2"));
    }
}
