//! Hot reload engine.
//!
//! Wires the registry, the debounce coalescer, the watch manager, the
//! control server and the dispatcher together, and owns their shutdown.
//!
//! ```text
//! FileWatchManager → DebounceCoalescer ─┐
//! ControlServer → router ───────────────┼→ ReloadDispatcher → Scheduler → ContentHost
//! trigger_reload_all ───────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::EngineConfig;
use crate::registry::{LoadedMod, ModRegistry};
use crate::reload::{ContentHost, ReloadDispatcher, ReloadRequest, Scheduler};
use crate::server::{ControlServer, RELOAD_PATH};
use crate::watch::{DebounceCoalescer, FileWatchManager};
use crate::{debug, log, logger};

/// A running hot reload engine.
///
/// Every background component is optional: a failure to start one is
/// logged and the rest keep working.
pub struct HotReload {
    registry: Arc<ModRegistry>,
    dispatcher: ReloadDispatcher,
    coalescer: Option<Arc<DebounceCoalescer>>,
    watcher: Option<FileWatchManager>,
    server: Option<ControlServer>,
    stopped: AtomicBool,
}

impl HotReload {
    /// Build the managed set and start the background components.
    ///
    /// Never fails: missing manifests, bind failures and watch failures
    /// only disable the affected part.
    pub fn start(
        loaded: impl IntoIterator<Item = LoadedMod>,
        host: Arc<dyn ContentHost>,
        scheduler: Arc<dyn Scheduler>,
        config: EngineConfig,
    ) -> Self {
        let registry = Arc::new(ModRegistry::load(loaded));
        let dispatcher = ReloadDispatcher::new(Arc::clone(&registry), host, scheduler);

        let mut engine = Self {
            registry,
            dispatcher,
            coalescer: None,
            watcher: None,
            server: None,
            stopped: AtomicBool::new(false),
        };

        if engine.registry.is_empty() {
            ModRegistry::log_empty_guidance();
            return engine;
        }

        if config.watch {
            engine.start_watching(&config);
        }
        if config.server && engine.registry.any_api() {
            engine.start_server(&config);
        }

        engine.log_banner(&config);
        engine
    }

    fn start_watching(&mut self, config: &EngineConfig) {
        if !self.registry.iter().any(|m| m.config().watch) {
            debug!("watch"; "no mod asked for file watching");
            return;
        }

        let dispatcher = self.dispatcher.clone();
        let sink = Box::new(move |request: ReloadRequest| dispatcher.reload(request));
        let coalescer = match DebounceCoalescer::start(config.quiet_period, sink) {
            Ok(coalescer) => Arc::new(coalescer),
            Err(e) => {
                log!("warn"; "{:#}, auto reload disabled", anyhow::Error::from(e));
                return;
            }
        };

        let watcher = FileWatchManager::new(Arc::clone(&coalescer));
        let opened = watcher.start(self.registry.iter());
        debug!("watch"; "watching {} mod(s)", opened);

        self.coalescer = Some(coalescer);
        self.watcher = Some(watcher);
    }

    fn start_server(&mut self, config: &EngineConfig) {
        if !config.interface.is_loopback() {
            log!("warn"; "refusing to expose the control server on {}, use a loopback address",
                config.interface);
            return;
        }
        match ControlServer::start(config.server_addr(), self.dispatcher.clone()) {
            Ok(server) => self.server = Some(server),
            Err(e) => log!("warn"; "{:#}, control server disabled", anyhow::Error::from(e)),
        }
    }

    fn log_banner(&self, config: &EngineConfig) {
        let mut lines = vec![
            format!("Mods: {}", self.registry.names()),
            format!("Manual trigger: {}", config.trigger_hint),
        ];
        if let Some(addr) = self.server_addr() {
            lines.push(format!("Web trigger: GET http://{addr}/"));
            lines.push(format!("API trigger: POST http://{addr}{RELOAD_PATH}"));
        }
        if self.watcher.as_ref().is_some_and(|w| !w.is_empty()) {
            lines.push("Auto reload: Enabled".to_string());
        }
        logger::banner("reload", &lines);
    }

    /// Schedule a reload of every managed mod (the manual trigger).
    pub fn trigger_reload_all(&self) {
        if self.registry.is_empty() {
            debug!("reload"; "nothing managed, ignoring manual trigger");
            return;
        }
        log!("reload"; "manual trigger");
        self.dispatcher.reload(ReloadRequest::all());
    }

    pub fn registry(&self) -> &Arc<ModRegistry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &ReloadDispatcher {
        &self.dispatcher
    }

    /// Bound control server address, if the server is running.
    pub fn server_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(ControlServer::addr)
    }

    /// Whether `name` has an active watch subscription.
    pub fn is_watching(&self, name: &str) -> bool {
        self.watcher.as_ref().is_some_and(|w| w.is_watching(name))
    }

    /// Stop watches, then the timer, then the listener. Idempotent.
    ///
    /// Work already handed to the scheduler is left alone and runs on the
    /// host's next drain.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(watcher) = &self.watcher {
            watcher.stop();
        }
        if let Some(coalescer) = &self.coalescer {
            coalescer.shutdown();
        }
        if let Some(server) = &self.server {
            server.shutdown();
        }
        debug!("reload"; "engine stopped");
    }
}

impl Drop for HotReload {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// =============================================================================
// Tests
// =============================================================================
