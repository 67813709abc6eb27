use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Default)]
struct Counter {
    in_flight: usize,
    generation: u64,
}

#[derive(Debug)]
struct Inner {
    counter: Mutex<Counter>,
    tx: watch::Sender<bool>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Counter> {
        self.counter
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, loading: bool) {
        self.tx.send_if_modified(|current| {
            if *current == loading {
                false
            } else {
                *current = loading;
                true
            }
        });
    }
}

/// Shared "a request is in flight" flag.
///
/// Every call takes a [`LoadingGuard`]; the flag is raised while at least one guard
/// is alive and lowered when the last one drops, on success, failure or
/// cancellation alike.
#[derive(Debug, Clone)]
pub struct LoadingState {
    inner: Arc<Inner>,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                counter: Mutex::new(Counter::default()),
                tx,
            }),
        }
    }

    pub fn begin(&self) -> LoadingGuard {
        let generation = {
            let mut counter = self.inner.lock();
            counter.in_flight += 1;
            self.inner.publish(true);
            counter.generation
        };

        LoadingGuard {
            inner: Arc::clone(&self.inner),
            generation,
        }
    }

    pub fn is_loading(&self) -> bool {
        *self.inner.tx.borrow()
    }

    pub fn in_flight(&self) -> usize {
        self.inner.lock().in_flight
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.tx.subscribe()
    }

    /// Forces the flag down. Guards taken before the reset no longer count.
    pub fn reset(&self) {
        let mut counter = self.inner.lock();
        if counter.in_flight > 0 {
            debug!("Resetting loading state with {} in flight", counter.in_flight);
        }
        counter.in_flight = 0;
        counter.generation = counter.generation.wrapping_add(1);
        self.inner.publish(false);
    }
}

#[must_use = "the loading flag drops as soon as the guard does"]
#[derive(Debug)]
pub struct LoadingGuard {
    inner: Arc<Inner>,
    generation: u64,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut counter = self.inner.lock();
        if counter.generation != self.generation {
            return;
        }
        counter.in_flight = counter.in_flight.saturating_sub(1);
        if counter.in_flight == 0 {
            self.inner.publish(false);
        }
    }
}
