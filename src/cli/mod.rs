//! Dev harness: a standalone host that drives the engine.

mod args;
mod host;

pub use args::Cli;

use std::io::{self, BufRead, BufReader};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use anyhow::Result;

use modreload::reload::WorkQueue;
use modreload::{HotReload, debug, log};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Banner text for the harness's manual trigger.
const TRIGGER_HINT: &str = "press Enter";

/// Setup the Ctrl+C handler. Call once at program start.
pub fn setup_shutdown_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        if !SHUTDOWN.swap(true, Ordering::SeqCst) {
            log!("host"; "shutting down...");
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Raise `requested` for every line read. Ends at EOF or on a read error.
fn spawn_trigger_reader<R>(reader: R, requested: Arc<AtomicBool>) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("modreload-stdin".to_string())
        .spawn(move || {
            for line in reader.lines() {
                if line.is_err() {
                    break;
                }
                requested.store(true, Ordering::Release);
            }
            debug!("host"; "stdin closed, manual trigger unavailable");
        })
}

/// Discover mods, start the engine and run the main loop until Ctrl+C.
pub fn run(cli: &Cli) -> Result<()> {
    let mods_dir = cli.mods_dir()?;
    let loaded = host::discover_mods(&mods_dir)?;

    let mut config = cli.engine_config();
    config.trigger_hint = TRIGGER_HINT.to_string();

    let content = Arc::new(host::LoggingHost::new(loaded.clone()));
    let queue = Arc::new(WorkQueue::new());
    let engine = HotReload::start(loaded, content, queue.clone(), config);

    if engine.registry().is_empty() {
        return Ok(());
    }

    // Detached: blocked on stdin until the process exits.
    let requested = Arc::new(AtomicBool::new(false));
    spawn_trigger_reader(BufReader::new(io::stdin()), Arc::clone(&requested))?;

    // Host main loop: reloads only ever run here.
    let tick = cli.tick();
    while !is_shutdown() {
        if requested.swap(false, Ordering::AcqRel) {
            engine.trigger_reload_all();
        }
        queue.drain();
        thread::sleep(tick);
    }

    engine.shutdown();
    // Passes already handed over still run to completion.
    queue.drain();
    Ok(())
}
