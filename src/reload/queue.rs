//! Main-Thread Work Queue
//!
//! Background threads (watch callbacks, debounce timer, HTTP accept loop)
//! never touch host content directly. They enqueue a unit of work here and
//! the host drains the queue once per tick on its main thread.

use crossbeam::channel::{self, Receiver, Sender};

/// A unit of work to run on the main thread.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Cross-thread handoff onto the host's main update loop.
///
/// `WorkQueue` is the default implementation. Hosts that already own a
/// main-thread dispatcher can implement this directly.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, work: Work);
}

// =============================================================================
// Work Queue
// =============================================================================

/// FIFO queue of work units with a single consumer.
pub struct WorkQueue {
    tx: Sender<Work>,
    rx: Receiver<Work>,
}

impl WorkQueue {
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    /// Run every unit queued before this call, in enqueue order.
    ///
    /// Must be called from the host's main thread. Work scheduled while
    /// draining runs on the next drain. Returns the number of units run.
    pub fn drain(&self) -> usize {
        let queued = self.rx.len();
        let mut ran = 0;
        while ran < queued {
            let Ok(work) = self.rx.try_recv() else {
                break;
            };
            work();
            ran += 1;
        }
        ran
    }

    /// Number of units waiting for the next drain.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for WorkQueue {
    fn schedule(&self, work: Work) {
        // The receiver lives in `self`, so the channel cannot be disconnected here.
        let _ = self.tx.send(work);
    }
}

// =============================================================================
// Tests
// =============================================================================
