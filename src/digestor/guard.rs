//! Striped lock serializing digest computation per cache key.
//!
//! Digest computation takes a lock only on a cache miss, and only the stripe
//! selected by the cache key. The same key always maps to the same stripe,
//! so double-checked locking still yields at most one computation per key,
//! while computations for unrelated keys rarely wait on each other.
//!
//! Lock hold time is one full tree build plus digest, which grows with the
//! depth of the dependency graph. Two keys sharing a stripe serialize for
//! that long.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

/// A fixed set of mutexes selected by key hash.
#[derive(Debug)]
pub struct StripedLock {
    stripes: Box<[Mutex<()>]>,
    mask: usize,
}

impl StripedLock {
    /// Create a lock with `stripes` stripes, rounded up to a power of two.
    pub fn new(stripes: usize) -> Self {
        let count = stripes.max(1).next_power_of_two();
        Self {
            stripes: (0..count).map(|_| Mutex::new(())).collect(),
            mask: count - 1,
        }
    }

    /// Number of stripes.
    pub fn stripe_count(&self) -> usize {
        self.stripes.len()
    }

    /// Index of the stripe guarding `key`.
    pub fn stripe_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) & self.mask
    }

    /// Lock the stripe guarding `key`.
    ///
    /// The stripes guard no data, so a stripe poisoned by a panicking holder
    /// is taken over as is.
    pub fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        let index = self.stripe_for(key);
        let stripe = &self.stripes[index];
        match stripe.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                tracing::debug!("Waiting for digest lock stripe {index} ({key})");
                stripe.lock().unwrap_or_else(PoisonError::into_inner)
            }
        }
    }
}

impl Default for StripedLock {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_LOCK_STRIPES)
    }
}
