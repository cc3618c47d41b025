//! Per-mod `hotreload.json` manifest.
//!
//! # Example
//!
//! ```json
//! {
//!   "enabled": true,
//!   "assets": true,
//!   "defs": true,
//!   "watch": true,
//!   "api": false
//! }
//! ```
//!
//! Every field is optional; missing fields take the defaults below.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

use super::ManifestError;

/// Fixed manifest location relative to a mod's root directory.
pub const MANIFEST_FILE: &str = "hotreload.json";

/// Hot reload options recognized in a mod manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModConfig {
    /// Manage this mod at all.
    pub enabled: bool,
    /// Reload audio, textures and strings of this mod.
    pub assets: bool,
    /// Request a global definition reload when this mod is reloaded.
    pub defs: bool,
    /// Watch the mod root and reload automatically on change.
    pub watch: bool,
    /// Ask for the HTTP control server.
    pub api: bool,
}

impl Default for ModConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            assets: true,
            defs: true,
            watch: true,
            api: false,
        }
    }
}

/// A parsed manifest plus any keys that were not recognized.
#[derive(Debug)]
pub struct Manifest {
    pub config: ModConfig,
    pub ignored: Vec<String>,
}

impl Manifest {
    /// Read the manifest from a mod root.
    ///
    /// Returns `Ok(None)` when the mod has no manifest (not managed).
    pub fn read(root: &Path) -> Result<Option<Self>, ManifestError> {
        let path = root.join(MANIFEST_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ManifestError::Io(path, err)),
        };

        Self::parse(&content)
            .map(Some)
            .map_err(|err| ManifestError::Json(path, err))
    }

    /// Parse manifest JSON, collecting any unknown keys.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let mut ignored = Vec::new();
        let mut deserializer = serde_json::Deserializer::from_str(content);
        let config = serde_ignored::deserialize(&mut deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        deserializer.end()?;
        Ok(Self { config, ignored })
    }
}

/// Guidance lines describing the manifest schema.
pub fn schema_help() -> Vec<String> {
    vec![
        format!("Create a {MANIFEST_FILE} file in your mod folder to enable hot reload."),
        "Example content:".to_string(),
        "{".to_string(),
        "  \"enabled\": true,".to_string(),
        "  \"assets\": true,".to_string(),
        "  \"defs\": true,".to_string(),
        "  \"watch\": true,".to_string(),
        "  \"api\": false".to_string(),
        "}".to_string(),
        "`enabled`: Enable hot reload for this mod. (default true)".to_string(),
        "`assets`: Reload audio, textures and strings. (default true)".to_string(),
        "`defs`: Reload definitions. (default true)".to_string(),
        "`watch`: Reload automatically on file change. (default true)".to_string(),
        "`api`: Enable the HTTP control server. (default false)".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ModConfig::default();
        assert!(config.enabled);
        assert!(config.assets);
        assert!(config.defs);
        assert!(config.watch);
        assert!(!config.api);
    }

    #[test]
    fn test_partial_manifest_fills_defaults() {
        let manifest = Manifest::parse(r#"{ "defs": false, "api": true }"#).unwrap();
        assert_eq!(
            manifest.config,
            ModConfig {
                defs: false,
                api: true,
                ..ModConfig::default()
            }
        );
        assert!(manifest.ignored.is_empty());
    }

    #[test]
    fn test_empty_object() {
        let manifest = Manifest::parse("{}").unwrap();
        assert_eq!(manifest.config, ModConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_collected() {
        let manifest = Manifest::parse(r#"{ "watch": false, "textures": true }"#).unwrap();
        assert!(!manifest.config.watch);
        assert_eq!(manifest.ignored, vec!["textures".to_string()]);
    }

    #[test]
    fn test_malformed_json() {
        assert!(Manifest::parse("{ enabled: true").is_err());
        assert!(Manifest::parse(r#"{ "enabled": "yes" }"#).is_err());
        assert!(Manifest::parse("{} trailing").is_err());
    }

    #[test]
    fn test_read_missing_manifest() {
        let dir = TempDir::new().unwrap();
        assert!(Manifest::read(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_read_invalid_manifest_names_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "not json").unwrap();

        let err = Manifest::read(dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Json(..)));
        assert_eq!(err.path(), &dir.path().join(MANIFEST_FILE));
    }
}
