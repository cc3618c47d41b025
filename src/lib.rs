//! modreload - development-time hot reload for game mods.
//!
//! Watches each managed mod's directory, coalesces bursts of file events
//! behind a global quiet period and reloads the mod's content in place
//! through the host's [`ContentHost`] primitives. A loopback HTTP endpoint
//! accepts manual and scripted triggers.
//!
//! All host calls happen on the host's main thread: background components
//! only ever hand work to a [`Scheduler`] (usually a [`WorkQueue`] the host
//! drains once per tick).
//!
//! ```ignore
//! let queue = Arc::new(WorkQueue::new());
//! let engine = HotReload::start(mods, host, queue.clone(), EngineConfig::default());
//! loop {
//!     queue.drain();
//!     // ...
//! }
//! ```

pub mod config;
pub mod engine;
pub mod logger;
pub mod registry;
pub mod reload;
pub mod server;
pub mod watch;

pub use config::{EngineConfig, ModConfig};
pub use engine::HotReload;
pub use registry::{LoadedMod, ModEntry, ModRegistry};
pub use reload::{AssetCategory, ContentHost, ReloadRequest, Scheduler, WorkQueue};
