//! Reload Module
//!
//! Decides what gets reloaded and marshals it onto the host's main thread.
//!
//! # Architecture
//!
//! ```text
//! Debouncer ─┐
//! Server ────┼─> ReloadDispatcher ─schedule─> WorkQueue ─drain─> ContentHost
//! Manual ────┘                                (main thread)
//! ```
//!
//! # Modules
//!
//! - `dispatcher` - Reload ordering policy and the host content seam
//! - `queue` - Main-thread work queue and the scheduler seam

pub mod dispatcher;
pub mod queue;

use std::sync::Arc;

use crate::registry::{ModEntry, ModRegistry};

pub use dispatcher::{AssetCategory, ContentHost, PassReport, ReloadDispatcher};
pub use queue::{Scheduler, Work, WorkQueue};

// =============================================================================
// Reload Request
// =============================================================================

/// A request to reload a set of mods.
///
/// An empty target set means "every managed mod".
#[derive(Debug, Clone, Default)]
pub struct ReloadRequest {
    targets: Vec<Arc<ModEntry>>,
}

impl ReloadRequest {
    /// Reload every managed mod.
    pub fn all() -> Self {
        Self::default()
    }

    /// Reload the given mods, collapsing duplicates by name.
    pub fn mods(mods: impl IntoIterator<Item = Arc<ModEntry>>) -> Self {
        let mut targets: Vec<Arc<ModEntry>> = Vec::new();
        for entry in mods {
            if !targets.iter().any(|t| t.is_named(entry.name())) {
                targets.push(entry);
            }
        }
        Self { targets }
    }

    pub fn is_all(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[Arc<ModEntry>] {
        &self.targets
    }

    /// Resolve the target set against the registry.
    pub fn resolve<'a>(&'a self, registry: &'a ModRegistry) -> &'a [Arc<ModEntry>] {
        if self.is_all() {
            registry.all()
        } else {
            &self.targets
        }
    }

    /// Short human readable description for log lines.
    pub fn describe(&self) -> String {
        if self.is_all() {
            "all mods".to_string()
        } else {
            self.targets
                .iter()
                .map(|t| t.name())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModConfig;

    fn entry(name: &str) -> Arc<ModEntry> {
        Arc::new(ModEntry::new(name, format!("/mods/{name}"), ModConfig::default()))
    }

    #[test]
    fn test_mods_dedup_by_name() {
        let request = ReloadRequest::mods([entry("Alpha"), entry("Beta"), entry("alpha")]);
        let names: Vec<_> = request.targets().iter().map(|t| t.name()).collect();
        assert_eq!(names, ["Alpha", "Beta"]);
    }

    #[test]
    fn test_empty_resolves_to_registry() {
        let registry = ModRegistry::from_entries([
            ModEntry::new("A", "/a", ModConfig::default()),
            ModEntry::new("B", "/b", ModConfig::default()),
        ]);
        let request = ReloadRequest::all();
        assert!(request.is_all());
        assert_eq!(request.resolve(&registry).len(), 2);
        assert_eq!(request.describe(), "all mods");
    }

    #[test]
    fn test_scoped_resolves_to_targets() {
        let registry = ModRegistry::from_entries([
            ModEntry::new("A", "/a", ModConfig::default()),
            ModEntry::new("B", "/b", ModConfig::default()),
        ]);
        let request = ReloadRequest::mods([registry.find("b").unwrap().clone()]);
        let resolved = request.resolve(&registry);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name(), "B");
        assert_eq!(request.describe(), "B");
    }
}
