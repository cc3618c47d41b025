//! Command-line interface definitions.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};

use modreload::config::{DEFAULT_PORT, EngineConfig};

/// Development host for mod hot reload.
///
/// Treats every subdirectory of MODS_DIR as a loaded mod and reloads it
/// when its files change or a trigger arrives.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory containing one subdirectory per mod (`~` is expanded)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub mods_dir: String,

    /// Control server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Loopback interface for the control server
    #[arg(short, long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST), value_parser = parse_loopback)]
    pub interface: IpAddr,

    /// Quiet period before a change burst triggers a reload (milliseconds)
    #[arg(long, default_value_t = 500)]
    pub debounce_ms: u64,

    /// Main loop tick, how often scheduled reloads are drained (milliseconds)
    #[arg(long, default_value_t = 50)]
    pub tick_ms: u64,

    /// Never start the HTTP control server
    #[arg(long)]
    pub no_server: bool,

    /// Never watch mod directories
    #[arg(long)]
    pub no_watch: bool,

    /// Print debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}

/// The control server is unauthenticated, so it only listens on loopback.
fn parse_loopback(value: &str) -> Result<IpAddr, String> {
    let addr: IpAddr = value.parse().map_err(|e| format!("{e}"))?;
    if !addr.is_loopback() {
        return Err(format!("{addr} is not a loopback address"));
    }
    Ok(addr)
}

impl Cli {
    /// The mods directory with `~` expanded.
    pub fn mods_dir(&self) -> Result<PathBuf> {
        let expanded = shellexpand::tilde(&self.mods_dir);
        let path = PathBuf::from(expanded.as_ref());
        if !path.is_dir() {
            anyhow::bail!("mods directory `{}` does not exist", path.display());
        }
        path.canonicalize()
            .with_context(|| format!("failed to resolve `{}`", path.display()))
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            quiet_period: Duration::from_millis(self.debounce_ms),
            interface: self.interface,
            port: self.port,
            server: !self.no_server,
            watch: !self.no_watch,
            ..EngineConfig::default()
        }
    }
}
