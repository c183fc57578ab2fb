//! Time-limited cache for an open warehouse session.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

struct Cached<T> {
    value: T,
    opened_at: Instant,
}

/// Holds one session handle and reopens it once it is older than `ttl`.
pub struct SessionCache<T> {
    ttl: Duration,
    slot: Mutex<Option<Cached<T>>>,
}

impl<T: Clone> SessionCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached handle, opening a new one when absent or expired.
    pub fn get_or_try_open<E>(&self, open: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = slot.as_ref() {
            if cached.opened_at.elapsed() < self.ttl {
                return Ok(cached.value.clone());
            }
            debug!(age = ?cached.opened_at.elapsed(), "session expired, reopening");
        }
        let value = open()?;
        *slot = Some(Cached {
            value: value.clone(),
            opened_at: Instant::now(),
        });
        Ok(value)
    }

    /// Drop the cached handle so the next call reopens.
    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Age of the cached handle, if one is open.
    pub fn age(&self) -> Option<Duration> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|cached| cached.opened_at.elapsed())
    }
}
