//! Stand-in game host for the dev harness.
//!
//! "Reloading" a holder means rescanning the mod tree for the files that
//! holder owns and logging what was found.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jwalk::WalkDir;

use modreload::registry::{LoadedMod, ModEntry};
use modreload::reload::{AssetCategory, ContentHost};
use modreload::{debug, log};

/// File extensions each asset holder picks up.
fn extensions(category: AssetCategory) -> &'static [&'static str] {
    match category {
        AssetCategory::Audio => &["wav", "ogg", "mp3"],
        AssetCategory::Texture => &["png", "jpg", "jpeg", "dds", "psd"],
        AssetCategory::String => &["txt", "csv"],
    }
}

/// Host whose reload primitives only rescan and log.
pub struct LoggingHost {
    mods: Vec<LoadedMod>,
}

impl LoggingHost {
    pub fn new(mods: Vec<LoadedMod>) -> Self {
        Self { mods }
    }
}

impl ContentHost for LoggingHost {
    fn reload_definitions(&self) -> Result<()> {
        let mut total = 0;
        for loaded in &self.mods {
            total += count_files(&loaded.root, &["xml"])
                .with_context(|| format!("{}: failed to scan definitions", loaded.name))?;
        }
        log!("host"; "reloaded definitions ({} file(s))", total);
        Ok(())
    }

    fn reload_asset_holder(&self, entry: &ModEntry, category: AssetCategory) -> Result<()> {
        let count = count_files(entry.root(), extensions(category))
            .with_context(|| format!("failed to scan {}", entry.root().display()))?;
        log!("host"; "{}: reloaded {} ({} file(s))", entry.name(), category.label(), count);
        Ok(())
    }
}

/// Count files below `root` whose extension is in `exts` (case-insensitive).
fn count_files(root: &Path, exts: &[&str]) -> Result<usize> {
    if !root.is_dir() {
        anyhow::bail!("`{}` is not a directory", root.display());
    }

    let count = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_extension(&e.path(), exts))
        .count();
    Ok(count)
}

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| exts.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Every immediate subdirectory of `dir` is a loaded mod, sorted by name.
pub fn discover_mods(dir: &Path) -> Result<Vec<LoadedMod>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read mods directory `{}`", dir.display()))?;

    let mut roots: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            roots.push(entry.path());
        }
    }
    roots.sort();

    let mods: Vec<LoadedMod> = roots
        .into_iter()
        .filter_map(|root| {
            let name = root.file_name()?.to_str()?.to_string();
            Some(LoadedMod::new(name, root))
        })
        .collect();

    debug!("host"; "found {} mod folder(s) in {}", mods.len(), dir.display());
    Ok(mods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modreload::config::ModConfig;
    use tempfile::TempDir;

    #[test]
    fn test_discover_mods_lists_directories_only() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Beta")).unwrap();
        fs::create_dir(temp.path().join("Alpha")).unwrap();
        fs::write(temp.path().join("readme.txt"), "").unwrap();

        let mods = discover_mods(temp.path()).unwrap();
        let names: Vec<_> = mods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta"]);
        assert_eq!(mods[0].root, temp.path().join("Alpha"));
    }

    #[test]
    fn test_discover_mods_missing_dir() {
        let temp = TempDir::new().unwrap();
        assert!(discover_mods(&temp.path().join("missing")).is_err());
    }

    #[test]
    fn test_count_files_by_extension() {
        let temp = TempDir::new().unwrap();
        let sounds = temp.path().join("Sounds").join("Ambient");
        fs::create_dir_all(&sounds).unwrap();
        fs::write(sounds.join("wind.ogg"), "").unwrap();
        fs::write(sounds.join("rain.WAV"), "").unwrap();
        fs::write(temp.path().join("icon.png"), "").unwrap();
        fs::create_dir(temp.path().join("music.ogg")).unwrap();
        fs::write(temp.path().join("ogg"), "").unwrap();

        assert_eq!(count_files(temp.path(), extensions(AssetCategory::Audio)).unwrap(), 2);
        assert_eq!(count_files(temp.path(), extensions(AssetCategory::Texture)).unwrap(), 1);
        assert_eq!(count_files(temp.path(), extensions(AssetCategory::String)).unwrap(), 0);
    }

    #[test]
    fn test_host_reports_scan_failure() {
        let temp = TempDir::new().unwrap();
        let entry = ModEntry::new("Gone", temp.path().join("gone"), ModConfig::default());
        let host = LoggingHost::new(Vec::new());

        assert!(host.reload_definitions().is_ok());
        assert!(host.reload_asset_holder(&entry, AssetCategory::Audio).is_err());
    }
}
