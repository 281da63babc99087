//! # Single-flight
//! Concurrent callers asking for the same key share one in-flight computation.
//!
//! The computation runs on its own tokio task, so a caller that drops its
//! future does not cancel it; the task finishes and clears its registry slot.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type Flight<V> = Shared<BoxFuture<'static, Result<V, String>>>;

pub struct SingleFlight<V> {
    inflight: Mutex<HashMap<String, (u64, Flight<V>)>>,
    next_id: Mutex<u64>,
}

impl<V> Default for SingleFlight<V> {
    fn default() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
            next_id: Mutex::new(0),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> SingleFlight<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<String, (u64, Flight<V>)>> {
        match self.inflight.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    fn fresh_id(&self) -> u64 {
        let mut g = match self.next_id.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        };
        *g += 1;
        *g
    }

    /// Number of computations currently registered.
    pub fn in_flight(&self) -> usize {
        self.registry().len()
    }

    /// Join the flight for `key`, starting it with `make` if none is running.
    ///
    /// `Err` carries the panic message if the computation panicked.
    pub async fn run<F>(self: &Arc<Self>, key: &str, make: F) -> anyhow::Result<V>
    where
        F: FnOnce() -> BoxFuture<'static, V>,
    {
        let flight = {
            let mut reg = self.registry();
            match reg.get(key) {
                Some((_, f)) => f.clone(),
                None => {
                    let id = self.fresh_id();
                    let this = Arc::clone(self);
                    let owned_key = key.to_string();
                    let work = make();
                    let handle = tokio::spawn(async move {
                        // Clears the slot on completion and on panic.
                        let _slot = SlotGuard {
                            flights: this,
                            key: owned_key,
                            id,
                        };
                        work.await
                    });
                    let shared = async move { handle.await.map_err(|e| e.to_string()) }
                        .boxed()
                        .shared();
                    reg.insert(key.to_string(), (id, shared.clone()));
                    shared
                }
            }
        };
        flight.await.map_err(|e| anyhow::anyhow!("in-flight computation failed: {e}"))
    }

    fn finish(&self, key: &str, id: u64) {
        let mut reg = self.registry();
        if reg.get(key).is_some_and(|(cur, _)| *cur == id) {
            reg.remove(key);
        }
    }
}

struct SlotGuard<V: Clone + Send + Sync + 'static> {
    flights: Arc<SingleFlight<V>>,
    key: String,
    id: u64,
}

impl<V: Clone + Send + Sync + 'static> Drop for SlotGuard<V> {
    fn drop(&mut self) {
        self.flights.finish(&self.key, self.id);
    }
}
