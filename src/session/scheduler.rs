//! Idle-debounce scheduler.
//!
//! One worker thread, one deadline. `arm` sets (or resets) the deadline;
//! the callback fires once when the deadline passes without another `arm`.
//! State machine: disarmed -> armed -> (re-armed)* -> firing -> disarmed.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::trace;

struct State {
    deadline: Option<Instant>,
    shutdown: bool,
}

struct Shared {
    state: Mutex<State>,
    condvar: Condvar,
}

/// Debounce timer with a dedicated worker thread. Dropping the scheduler
/// cancels any armed deadline and joins the worker.
pub struct IdleScheduler {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl IdleScheduler {
    pub fn spawn(callback: impl Fn() + Send + 'static) -> IdleScheduler {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                deadline: None,
                shutdown: false,
            }),
            condvar: Condvar::new(),
        });
        let worker_shared = shared.clone();
        let worker = thread::Builder::new()
            .name("stencil-idle".into())
            .spawn(move || run(worker_shared, callback))
            .ok();
        IdleScheduler { shared, worker }
    }

    /// Arm (or reset) the deadline to `delay` from now.
    pub fn arm(&self, delay: Duration) {
        let mut state = self.shared.state.lock();
        state.deadline = Some(Instant::now() + delay);
        self.shared.condvar.notify_all();
    }

    /// Disarm without firing.
    pub fn cancel(&self) {
        let mut state = self.shared.state.lock();
        state.deadline = None;
        self.shared.condvar.notify_all();
    }
}

impl Drop for IdleScheduler {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
            state.deadline = None;
            self.shared.condvar.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run(shared: Arc<Shared>, callback: impl Fn()) {
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            return;
        }
        match state.deadline {
            None => {
                shared.condvar.wait(&mut state);
            }
            Some(deadline) => {
                if Instant::now() < deadline {
                    shared.condvar.wait_until(&mut state, deadline);
                    // Re-check: the deadline may have moved or been cancelled
                    // while waiting.
                    continue;
                }
                state.deadline = None;
                drop(state);
                trace!("idle deadline reached");
                callback();
                state = shared.state.lock();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn wait_for(fired: &AtomicUsize, expected: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if fired.load(Ordering::SeqCst) == expected {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn rearming_coalesces_into_one_fire() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let scheduler = IdleScheduler::spawn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        for _ in 0..5 {
            scheduler.arm(Duration::from_millis(40));
            thread::sleep(Duration::from_millis(5));
        }
        assert!(wait_for(&fired, 1));
        thread::sleep(Duration::from_millis(80));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_prevents_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let scheduler = IdleScheduler::spawn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        scheduler.arm(Duration::from_millis(30));
        scheduler.cancel();
        thread::sleep(Duration::from_millis(90));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
