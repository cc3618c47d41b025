//! Reload Dispatcher
//!
//! The single authority for executing a reload pass. Ordering within a pass:
//!
//! 1. One global definition reload, if any target has `defs = true`
//! 2. Per target with `assets = true`: audio, then textures, then strings
//!
//! Every pass is scheduled onto the main thread. Host failures are logged
//! and isolated to the mod/category that failed.

use std::sync::Arc;
use std::time::Instant;

use super::{ReloadRequest, Scheduler};
use crate::registry::{ModEntry, ModRegistry};
use crate::{debug, log};

// =============================================================================
// Host Seam
// =============================================================================

/// Asset holders reloaded per mod, in reload order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetCategory {
    Audio,
    Texture,
    String,
}

impl AssetCategory {
    /// Mandatory reload order within one mod.
    pub const ORDER: [Self; 3] = [Self::Audio, Self::Texture, Self::String];

    pub fn label(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Texture => "textures",
            Self::String => "strings",
        }
    }
}

/// The host's content reload primitives.
///
/// Only ever called from the thread that drains the scheduler.
pub trait ContentHost: Send + Sync {
    /// Reload all definitions (global, not scoped to a mod).
    fn reload_definitions(&self) -> anyhow::Result<()>;

    /// Reload one asset holder of one mod.
    fn reload_asset_holder(&self, entry: &ModEntry, category: AssetCategory)
    -> anyhow::Result<()>;
}

// =============================================================================
// Pass Report
// =============================================================================

/// Outcome of one reload pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Mods the pass covered.
    pub mods: usize,
    /// Whether the global definition reload ran.
    pub definitions: bool,
    /// Number of asset holder reloads attempted.
    pub asset_reloads: usize,
    /// One line per failed host call.
    pub failures: Vec<String>,
}

impl PassReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Schedules and executes reload passes.
#[derive(Clone)]
pub struct ReloadDispatcher {
    registry: Arc<ModRegistry>,
    host: Arc<dyn ContentHost>,
    scheduler: Arc<dyn Scheduler>,
}

impl ReloadDispatcher {
    pub fn new(
        registry: Arc<ModRegistry>,
        host: Arc<dyn ContentHost>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            registry,
            host,
            scheduler,
        }
    }

    pub fn registry(&self) -> &Arc<ModRegistry> {
        &self.registry
    }

    /// Schedule a reload pass on the main thread.
    ///
    /// Returns immediately; the pass runs on the scheduler's next drain.
    pub fn reload(&self, request: ReloadRequest) {
        debug!("reload"; "scheduled: {}", request.describe());

        let registry = Arc::clone(&self.registry);
        let host = Arc::clone(&self.host);
        self.scheduler.schedule(Box::new(move || {
            run_pass(&registry, host.as_ref(), &request);
        }));
    }

    /// Execute a pass synchronously on the current thread.
    ///
    /// Only call this from the main thread.
    pub fn run_pass(&self, request: &ReloadRequest) -> PassReport {
        run_pass(&self.registry, self.host.as_ref(), request)
    }
}

/// Execute one ordered reload pass.
fn run_pass(registry: &ModRegistry, host: &dyn ContentHost, request: &ReloadRequest) -> PassReport {
    let started = Instant::now();
    let targets = request.resolve(registry);
    let mut report = PassReport {
        mods: targets.len(),
        ..PassReport::default()
    };

    if targets.iter().any(|m| m.config().defs) {
        debug!("reload"; "reload definitions");
        report.definitions = true;
        if let Err(e) = host.reload_definitions() {
            log!("error"; "definition reload failed: {:#}", e);
            report.failures.push(format!("definitions: {e:#}"));
        }
    }

    for entry in targets.iter().filter(|m| m.config().assets) {
        for category in AssetCategory::ORDER {
            debug!("reload"; "{}: reload {}", entry.name(), category.label());
            report.asset_reloads += 1;
            if let Err(e) = host.reload_asset_holder(entry, category) {
                log!("error"; "{}: {} reload failed: {:#}", entry.name(), category.label(), e);
                report
                    .failures
                    .push(format!("{} {}: {e:#}", entry.name(), category.label()));
            }
        }
    }

    if report.is_clean() {
        log!("reload"; "reloaded {} in {:.0?}", request.describe(), started.elapsed());
    } else {
        log!("reload"; "reloaded {} with {} failure(s) in {:.0?}",
            request.describe(), report.failures.len(), started.elapsed());
    }

    report
}

// =============================================================================
// Tests
// =============================================================================
