//! Per-key gates for single-flight compute-on-miss.
//!
//! The first caller to miss on a key closes that key's gate and computes.
//! Callers missing on the same key meanwhile wait at the gate and, once
//! it reopens, look in the cache again before deciding to compute
//! themselves. A gate is dropped from the map when nobody holds it.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// A closable gate for one key.
#[derive(Debug, Default)]
struct Gate {
    busy: Mutex<bool>,
    reopened: Condvar,
}

impl Gate {
    fn close(&self) {
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
        while *busy {
            busy = self
                .reopened
                .wait(busy)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *busy = true;
    }

    fn open(&self) {
        *self.busy.lock().unwrap_or_else(PoisonError::into_inner) = false;
        self.reopened.notify_one();
    }
}

/// Map of keys that currently have a computation in flight.
#[derive(Debug)]
pub(crate) struct InFlight<K> {
    gates: Mutex<HashMap<K, Arc<Gate>>>,
}

impl<K> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            gates: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> InFlight<K>
where
    K: Hash + Eq + Clone,
{
    /// Block until this caller holds the gate for `key`.
    pub(crate) fn enter(&self, key: &K) -> FlightGuard<'_, K> {
        let gate = {
            let mut gates = self.lock_gates();
            Arc::clone(gates.entry(key.clone()).or_default())
        };

        // The guard exists before waiting so that a waiter is counted as
        // a holder by `release`.
        let mut guard = FlightGuard {
            flights: self,
            key: key.clone(),
            gate: Some(gate),
            closed: false,
        };
        if let Some(gate) = &guard.gate {
            gate.close();
        }
        guard.closed = true;
        guard
    }

    /// Number of keys with a live gate.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock_gates().len()
    }

    fn lock_gates(&self) -> MutexGuard<'_, HashMap<K, Arc<Gate>>> {
        self.gates.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forget the gate for `key` unless another caller still holds it.
    ///
    /// The departing reference is dropped before the map lock is released,
    /// so the last of several departing holders always sees itself as last.
    fn release(&self, key: &K, gate: Arc<Gate>) {
        let mut gates = self.lock_gates();
        // One reference in the map, one held by the departing guard.
        let last = Arc::strong_count(&gate) <= 2;
        if last && gates.get(key).is_some_and(|current| Arc::ptr_eq(current, &gate)) {
            gates.remove(key);
        }
        drop(gate);
    }
}

/// Held by the caller that is computing for a key. Dropping it, including
/// during a panic, reopens the gate.
pub(crate) struct FlightGuard<'a, K>
where
    K: Hash + Eq + Clone,
{
    flights: &'a InFlight<K>,
    key: K,
    gate: Option<Arc<Gate>>,
    closed: bool,
}

impl<K> Drop for FlightGuard<'_, K>
where
    K: Hash + Eq + Clone,
{
    fn drop(&mut self) {
        let Some(gate) = self.gate.take() else {
            return;
        };
        if self.closed {
            gate.open();
        }
        self.flights.release(&self.key, gate);
    }
}
