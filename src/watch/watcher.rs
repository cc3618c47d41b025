use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;

use super::DebounceCoalescer;
use super::types::{WatchError, is_change};
use crate::registry::ModEntry;
use crate::{debug, log};

// =============================================================================
// Watch Subscription
// =============================================================================

/// One recursive watch on one mod root, carrying its mod identity.
pub struct WatchSubscription {
    entry: Arc<ModEntry>,
    watcher: Option<RecommendedWatcher>,
}

impl WatchSubscription {
    /// Open a recursive watch on the mod root.
    ///
    /// Every change event under the root becomes `coalescer.notify(entry)`
    /// while `active` is set.
    fn open(
        entry: Arc<ModEntry>,
        coalescer: Arc<DebounceCoalescer>,
        active: Arc<AtomicBool>,
    ) -> Result<Self, WatchError> {
        let subscribe_err = |source: notify::Error| WatchError::Subscribe {
            mod_name: entry.name().to_string(),
            root: entry.root().to_path_buf(),
            source,
        };

        let callback_entry = Arc::clone(&entry);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) if active.load(Ordering::Acquire) && is_change(&event.kind) => {
                    coalescer.notify(&callback_entry);
                }
                Ok(_) => {}
                Err(e) => debug!("watch"; "{}: notify error: {}", callback_entry.name(), e),
            }
        })
        .map_err(subscribe_err)?;

        watcher
            .watch(entry.root(), RecursiveMode::Recursive)
            .map_err(subscribe_err)?;

        Ok(Self {
            entry,
            watcher: Some(watcher),
        })
    }

    pub fn entry(&self) -> &Arc<ModEntry> {
        &self.entry
    }

    /// Release the OS watch. Errors are swallowed; calling twice is a no-op.
    pub fn release(&mut self) {
        let Some(mut watcher) = self.watcher.take() else {
            return;
        };
        if let Err(e) = watcher.unwatch(self.entry.root()) {
            debug!("watch"; "{}: unwatch failed: {}", self.entry.name(), e);
        }
    }
}

impl Drop for WatchSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

// =============================================================================
// File Watch Manager
// =============================================================================

/// Owns one subscription per mod with `watch = true`.
pub struct FileWatchManager {
    coalescer: Arc<DebounceCoalescer>,
    active: Arc<AtomicBool>,
    subscriptions: Mutex<Vec<WatchSubscription>>,
}

impl FileWatchManager {
    pub fn new(coalescer: Arc<DebounceCoalescer>) -> Self {
        Self {
            coalescer,
            active: Arc::new(AtomicBool::new(true)),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe every mod that wants watching.
    ///
    /// A failure for one mod is logged and does not affect the others.
    /// Returns the number of subscriptions established.
    pub fn start<'a>(&self, mods: impl IntoIterator<Item = &'a Arc<ModEntry>>) -> usize {
        let mut subscriptions = self.subscriptions.lock();
        let mut opened = 0;

        for entry in mods {
            if !entry.config().watch {
                debug!("watch"; "{}: watch disabled", entry.name());
                continue;
            }
            if subscriptions.iter().any(|s| s.entry.is_named(entry.name())) {
                continue;
            }

            match WatchSubscription::open(
                Arc::clone(entry),
                Arc::clone(&self.coalescer),
                Arc::clone(&self.active),
            ) {
                Ok(subscription) => {
                    debug!("watch"; "{}: {}", entry.name(), entry.root().display());
                    subscriptions.push(subscription);
                    opened += 1;
                }
                Err(e) => log!("warn"; "{:#}", anyhow::Error::from(e)),
            }
        }

        opened
    }

    /// Disable delivery and release every watch. Idempotent.
    pub fn stop(&self) {
        self.active.store(false, Ordering::Release);
        let mut subscriptions = self.subscriptions.lock();
        for mut subscription in subscriptions.drain(..) {
            subscription.release();
        }
    }

    pub fn is_watching(&self, name: &str) -> bool {
        self.subscriptions
            .lock()
            .iter()
            .any(|s| s.entry.is_named(name))
    }

    pub fn len(&self) -> usize {
        self.subscriptions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.lock().is_empty()
    }
}

impl Drop for FileWatchManager {
    fn drop(&mut self) {
        self.stop();
    }
}
