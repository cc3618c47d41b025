//! Configuration for the hot reload engine.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error      # ManifestError
//! ├── manifest   # hotreload.json (ModConfig)
//! └── mod.rs     # EngineConfig (this file)
//! ```

mod error;
pub mod manifest;

pub use error::ManifestError;
pub use manifest::{MANIFEST_FILE, Manifest, ModConfig};

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default quiet period before a coalesced reload fires.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Default control server port.
pub const DEFAULT_PORT: u16 = 8700;

/// How the host exposes the manual "reload all" action, shown in the banner.
pub const DEFAULT_TRIGGER_HINT: &str = "HotReload::trigger_reload_all";

/// Runtime settings of the engine.
///
/// The engine never reads the environment; the host (or the dev harness)
/// fills this in.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Debounce window applied globally across all watched mods.
    pub quiet_period: Duration,

    /// Network interface for the control server. Must be a loopback
    /// address; anything else leaves the server disabled.
    pub interface: IpAddr,

    /// Control server port.
    pub port: u16,

    /// Allow the control server (it still needs a mod with `api = true`).
    pub server: bool,

    /// Allow filesystem watching (per-mod `watch` still applies).
    pub watch: bool,

    /// Banner text describing the manual trigger.
    pub trigger_hint: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            server: true,
            watch: true,
            trigger_hint: DEFAULT_TRIGGER_HINT.to_string(),
        }
    }
}

impl EngineConfig {
    /// Socket address the control server binds to.
    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.interface, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.quiet_period, Duration::from_millis(500));
        assert_eq!(config.server_addr().to_string(), "127.0.0.1:8700");
        assert!(config.server);
        assert!(config.watch);
        assert!(config.interface.is_loopback());
        assert_eq!(config.trigger_hint, DEFAULT_TRIGGER_HINT);
    }
}
