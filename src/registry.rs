//! Managed mod registry.
//!
//! Built once at startup from the host's loaded mods and never mutated
//! afterwards. Components share it through `Arc<ModRegistry>`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::config::{MANIFEST_FILE, Manifest, ModConfig, manifest::schema_help};
use crate::{debug, log, logger};

/// A mod as reported by the host (`enumerateLoadedMods`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedMod {
    pub name: String,
    pub root: PathBuf,
}

impl LoadedMod {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }
}

/// One enabled mod under hot reload management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModEntry {
    name: String,
    root: PathBuf,
    config: ModConfig,
}

impl ModEntry {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>, config: ModConfig) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ModConfig {
        &self.config
    }

    /// ASCII case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// The immutable set of managed mods.
#[derive(Debug, Default)]
pub struct ModRegistry {
    mods: Vec<Arc<ModEntry>>,
}

impl ModRegistry {
    /// Build a registry directly from entries.
    ///
    /// Disabled entries are dropped so the managed set never contains them.
    pub fn from_entries(entries: impl IntoIterator<Item = ModEntry>) -> Self {
        let mut seen = FxHashSet::default();
        let mods = entries
            .into_iter()
            .filter(|entry| entry.config.enabled)
            .filter(|entry| seen.insert(entry.name.to_ascii_lowercase()))
            .map(Arc::new)
            .collect();
        Self { mods }
    }

    /// Scan loaded mods for a manifest and build the managed set.
    ///
    /// Missing manifests skip the mod silently. Malformed manifests skip it
    /// with a warning. Nothing here aborts startup.
    pub fn load(loaded: impl IntoIterator<Item = LoadedMod>) -> Self {
        let mut seen = FxHashSet::default();
        let mut mods = Vec::new();

        for LoadedMod { name, root } in loaded {
            let manifest = match Manifest::read(&root) {
                Ok(Some(manifest)) => manifest,
                Ok(None) => {
                    debug!("registry"; "{}: no {}, skipping", name, MANIFEST_FILE);
                    continue;
                }
                Err(e) => {
                    log!("warn"; "{}: failed to read {}: {}", name, MANIFEST_FILE, e);
                    continue;
                }
            };

            if !manifest.ignored.is_empty() {
                log!("warn"; "{}: unknown fields in {}: {}",
                    name, MANIFEST_FILE, manifest.ignored.join(", "));
            }

            if !manifest.config.enabled {
                debug!("registry"; "{}: disabled in {}", name, MANIFEST_FILE);
                continue;
            }

            if !seen.insert(name.to_ascii_lowercase()) {
                log!("warn"; "{}: duplicate mod name, keeping the first one", name);
                continue;
            }

            mods.push(Arc::new(ModEntry::new(name, root, manifest.config)));
        }

        Self { mods }
    }

    /// Find a managed mod by name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<&Arc<ModEntry>> {
        self.mods.iter().find(|m| m.is_named(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModEntry>> {
        self.mods.iter()
    }

    pub fn all(&self) -> &[Arc<ModEntry>] {
        &self.mods
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// Whether any managed mod asked for the HTTP control server.
    pub fn any_api(&self) -> bool {
        self.mods.iter().any(|m| m.config.api)
    }

    /// Comma separated mod names, for log lines.
    pub fn names(&self) -> String {
        self.mods
            .iter()
            .map(|m| m.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Print the guidance banner shown when nothing is managed.
    pub fn log_empty_guidance() {
        let mut lines = vec![format!("No mods with {MANIFEST_FILE} found, hot reload is idle.")];
        lines.extend(schema_help());
        logger::banner("registry", &lines);
    }
}
