//! Change Detection
//!
//! Watches mod roots and turns bursts of filesystem events into coalesced
//! reload requests.
//!
//! Architecture:
//! ```text
//! notify (per mod) → WatchSubscription → DebounceCoalescer → ReloadSink
//!                     (mod identity)     (global quiet period)
//! ```

// Global debounce and the pending change set.
mod debouncer;
// Shared error and event filter.
mod types;
// Per-mod watch subscriptions.
mod watcher;

#[cfg(test)]
mod tests;

pub use debouncer::{DebounceCoalescer, ReloadSink};
pub use types::WatchError;
pub use watcher::{FileWatchManager, WatchSubscription};
