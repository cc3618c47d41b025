use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

use super::types::WatchError;
use crate::debug;
use crate::registry::ModEntry;
use crate::reload::ReloadRequest;

/// Receives each coalesced reload request (runs on the timer thread).
pub type ReloadSink = Box<dyn Fn(ReloadRequest) + Send + 'static>;

// =============================================================================
// Pending Change Set
// =============================================================================

/// Mods with at least one unprocessed change, first-touched order.
///
/// A set: burst events for one mod collapse into a single entry.
#[derive(Default)]
pub(super) struct PendingChanges {
    names: FxHashSet<String>,
    mods: Vec<Arc<ModEntry>>,
}

impl PendingChanges {
    /// Returns true if the mod was not pending yet.
    pub(super) fn insert(&mut self, entry: &Arc<ModEntry>) -> bool {
        if !self.names.insert(entry.name().to_ascii_lowercase()) {
            return false;
        }
        self.mods.push(Arc::clone(entry));
        true
    }

    /// Swap the set out for a fresh empty one.
    pub(super) fn take(&mut self) -> Vec<Arc<ModEntry>> {
        self.names.clear();
        std::mem::take(&mut self.mods)
    }

    pub(super) fn len(&self) -> usize {
        self.mods.len()
    }
}

// =============================================================================
// Timer State Machine
// =============================================================================

/// Debounce timer: idle, or waiting for a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TimerState {
    Idle,
    Pending(Instant),
}

impl TimerState {
    /// A change at `at` always pushes the deadline to `at + quiet`.
    pub(super) fn touch(self, at: Instant, quiet: Duration) -> Self {
        let deadline = at + quiet;
        match self {
            Self::Pending(current) if current > deadline => Self::Pending(current),
            _ => Self::Pending(deadline),
        }
    }
}

enum Signal {
    Touched(Instant),
    Shutdown,
}

// =============================================================================
// Coalescer
// =============================================================================

/// Global debounce across all watched mods.
///
/// `notify` may be called from any thread. After `quiet` without any new
/// notification, the pending set is swapped out and handed to the sink as
/// one `ReloadRequest`.
pub struct DebounceCoalescer {
    pending: Arc<Mutex<PendingChanges>>,
    signal_tx: mpsc::UnboundedSender<Signal>,
    timer: Mutex<Option<JoinHandle<()>>>,
    stopped: AtomicBool,
}

impl DebounceCoalescer {
    /// Spawn the timer thread.
    pub fn start(quiet: Duration, sink: ReloadSink) -> Result<Self, WatchError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(WatchError::Timer)?;

        let pending = Arc::new(Mutex::new(PendingChanges::default()));
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        let timer_pending = Arc::clone(&pending);
        let timer = thread::Builder::new()
            .name("modreload-debounce".to_string())
            .spawn(move || {
                runtime.block_on(run_timer(signal_rx, timer_pending, quiet, sink));
            })
            .map_err(WatchError::Timer)?;

        Ok(Self {
            pending,
            signal_tx,
            timer: Mutex::new(Some(timer)),
            stopped: AtomicBool::new(false),
        })
    }

    /// Record a change for `entry` and restart the quiet period.
    pub fn notify(&self, entry: &Arc<ModEntry>) {
        if self.stopped.load(Ordering::Acquire) {
            return;
        }

        if self.pending.lock().insert(entry) {
            debug!("watch"; "change in {}", entry.name());
        }
        let _ = self.signal_tx.send(Signal::Touched(Instant::now()));
    }

    /// Number of mods waiting for the timer.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Stop the timer. Pending changes are dropped, not flushed.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        let _ = self.signal_tx.send(Signal::Shutdown);
        if let Some(timer) = self.timer.lock().take() {
            let _ = timer.join();
        }

        let dropped = self.pending.lock().take();
        if !dropped.is_empty() {
            debug!("watch"; "dropped {} pending change(s) on shutdown", dropped.len());
        }
    }
}

impl Drop for DebounceCoalescer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_timer(
    mut signal_rx: mpsc::UnboundedReceiver<Signal>,
    pending: Arc<Mutex<PendingChanges>>,
    quiet: Duration,
    sink: ReloadSink,
) {
    let mut state = TimerState::Idle;

    loop {
        state = match state {
            TimerState::Idle => match signal_rx.recv().await {
                Some(Signal::Touched(at)) => state.touch(at, quiet),
                Some(Signal::Shutdown) | None => break,
            },
            TimerState::Pending(deadline) => {
                let deadline = tokio::time::Instant::from_std(deadline);
                tokio::select! {
                    biased;
                    signal = signal_rx.recv() => match signal {
                        Some(Signal::Touched(at)) => state.touch(at, quiet),
                        Some(Signal::Shutdown) | None => break,
                    },
                    _ = tokio::time::sleep_until(deadline) => {
                        fire(&pending, &sink);
                        TimerState::Idle
                    }
                }
            }
        };
    }
}

/// Snapshot-and-clear the pending set, emitting one request if non-empty.
pub(super) fn fire(pending: &Mutex<PendingChanges>, sink: &ReloadSink) -> bool {
    let batch = pending.lock().take();
    if batch.is_empty() {
        return false;
    }

    debug!("watch"; "quiet period elapsed, {} mod(s) changed", batch.len());
    sink(ReloadRequest::mods(batch));
    true
}
