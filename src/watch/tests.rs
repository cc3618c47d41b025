use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver};
use parking_lot::Mutex;
use tempfile::TempDir;

use super::debouncer::{PendingChanges, TimerState, fire};
use super::types::is_change;
use super::{DebounceCoalescer, FileWatchManager, ReloadSink};
use crate::config::ModConfig;
use crate::registry::ModEntry;
use crate::reload::ReloadRequest;

fn entry(name: &str) -> Arc<ModEntry> {
    Arc::new(ModEntry::new(name, format!("/mods/{name}"), ModConfig::default()))
}

fn entry_at(name: &str, root: &Path, watch: bool) -> Arc<ModEntry> {
    let config = ModConfig {
        watch,
        ..ModConfig::default()
    };
    Arc::new(ModEntry::new(name, root, config))
}

fn channel_sink() -> (ReloadSink, Receiver<ReloadRequest>) {
    let (tx, rx) = channel::unbounded();
    let sink: ReloadSink = Box::new(move |request| {
        let _ = tx.send(request);
    });
    (sink, rx)
}

fn names(request: &ReloadRequest) -> Vec<String> {
    let mut names: Vec<_> = request.targets().iter().map(|t| t.name().to_string()).collect();
    names.sort();
    names
}

// =============================================================================
// Pending set and timer state
// =============================================================================

#[test]
fn test_pending_changes_is_a_set() {
    let mut pending = PendingChanges::default();
    let alpha = entry("Alpha");

    assert!(pending.insert(&alpha));
    assert!(!pending.insert(&alpha));
    assert!(pending.insert(&entry("Beta")));
    assert_eq!(pending.len(), 2);

    let taken = pending.take();
    assert_eq!(taken.len(), 2);
    assert_eq!(pending.len(), 0);

    // Fresh set after the swap accepts the same mod again.
    assert!(pending.insert(&alpha));
}

#[test]
fn test_touch_pushes_deadline_forward() {
    let quiet = Duration::from_millis(500);
    let t0 = Instant::now();
    let t1 = t0 + Duration::from_millis(200);

    let state = TimerState::Idle.touch(t0, quiet);
    assert_eq!(state, TimerState::Pending(t0 + quiet));

    let state = state.touch(t1, quiet);
    assert_eq!(state, TimerState::Pending(t1 + quiet));
}

#[test]
fn test_touch_never_moves_deadline_back() {
    let quiet = Duration::from_millis(500);
    let t0 = Instant::now();
    let later = TimerState::Pending(t0 + Duration::from_secs(2));

    assert_eq!(later.touch(t0, quiet), later);
}

#[test]
fn test_fire_with_empty_set_emits_nothing() {
    let (sink, rx) = channel_sink();
    let pending = Mutex::new(PendingChanges::default());

    assert!(!fire(&pending, &sink));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_fire_swaps_out_the_set() {
    let (sink, rx) = channel_sink();
    let pending = Mutex::new(PendingChanges::default());
    pending.lock().insert(&entry("Alpha"));

    assert!(fire(&pending, &sink));
    assert_eq!(names(&rx.try_recv().unwrap()), ["Alpha"]);
    assert_eq!(pending.lock().len(), 0);
    assert!(!fire(&pending, &sink));
}

#[test]
fn test_event_filter() {
    use notify::EventKind;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind, RenameMode};

    assert!(is_change(&EventKind::Create(CreateKind::File)));
    assert!(is_change(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))));
    assert!(is_change(&EventKind::Modify(ModifyKind::Any)));
    assert!(is_change(&EventKind::Remove(RemoveKind::Folder)));
    assert!(!is_change(&EventKind::Access(AccessKind::Any)));
    assert!(!is_change(&EventKind::Other));
}

// =============================================================================
// Coalescer timing
// =============================================================================

#[test]
fn test_burst_coalesces_into_one_request() {
    let (sink, rx) = channel_sink();
    let coalescer = DebounceCoalescer::start(Duration::from_millis(150), sink).unwrap();

    let alpha = entry("Alpha");
    let beta = entry("Beta");
    for mod_entry in [&alpha, &beta, &alpha, &entry("Gamma"), &beta] {
        coalescer.notify(mod_entry);
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(coalescer.pending(), 3);

    let request = rx.recv_timeout(Duration::from_secs(3)).unwrap();
    assert_eq!(names(&request), ["Alpha", "Beta", "Gamma"]);
    assert!(rx.recv_timeout(Duration::from_millis(400)).is_err());
    assert_eq!(coalescer.pending(), 0);
}

#[test]
fn test_notify_from_many_threads() {
    let (sink, rx) = channel_sink();
    let coalescer = Arc::new(DebounceCoalescer::start(Duration::from_millis(200), sink).unwrap());

    let handles: Vec<_> = ["A", "B", "C", "D"]
        .into_iter()
        .map(|name| {
            let coalescer = Arc::clone(&coalescer);
            let mod_entry = entry(name);
            thread::spawn(move || {
                for _ in 0..20 {
                    coalescer.notify(&mod_entry);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let request = rx.recv_timeout(Duration::from_secs(3)).unwrap();
    assert_eq!(names(&request), ["A", "B", "C", "D"]);
    assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
}

#[test]
fn test_new_event_restarts_quiet_period() {
    let (sink, rx) = channel_sink();
    let coalescer = DebounceCoalescer::start(Duration::from_millis(400), sink).unwrap();

    coalescer.notify(&entry("Alpha"));
    thread::sleep(Duration::from_millis(50));
    coalescer.notify(&entry("Beta"));

    // The deadline moved with the second event; nothing may fire yet.
    assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());

    let request = rx.recv_timeout(Duration::from_secs(3)).unwrap();
    assert_eq!(names(&request), ["Alpha", "Beta"]);
}

#[test]
fn test_separate_bursts_fire_separately() {
    let (sink, rx) = channel_sink();
    let coalescer = DebounceCoalescer::start(Duration::from_millis(100), sink).unwrap();

    coalescer.notify(&entry("Alpha"));
    let first = rx.recv_timeout(Duration::from_secs(3)).unwrap();
    assert_eq!(names(&first), ["Alpha"]);

    coalescer.notify(&entry("Beta"));
    let second = rx.recv_timeout(Duration::from_secs(3)).unwrap();
    assert_eq!(names(&second), ["Beta"]);
}

#[test]
fn test_shutdown_drops_pending_changes() {
    let (sink, rx) = channel_sink();
    let coalescer = DebounceCoalescer::start(Duration::from_millis(100), sink).unwrap();

    coalescer.notify(&entry("Alpha"));
    coalescer.shutdown();
    assert_eq!(coalescer.pending(), 0);
    assert!(rx.recv_timeout(Duration::from_millis(400)).is_err());

    // Second shutdown and late notifications are no-ops.
    coalescer.shutdown();
    coalescer.notify(&entry("Beta"));
    assert_eq!(coalescer.pending(), 0);
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
}

// =============================================================================
// File watching
// =============================================================================

#[test]
fn test_watch_failure_is_isolated() {
    let temp = TempDir::new().unwrap();
    let good_root = temp.path().join("beta");
    fs::create_dir_all(&good_root).unwrap();

    let (sink, _rx) = channel_sink();
    let coalescer = Arc::new(DebounceCoalescer::start(Duration::from_millis(100), sink).unwrap());
    let manager = FileWatchManager::new(coalescer);

    let mods = [
        entry_at("Alpha", &temp.path().join("missing"), true),
        entry_at("Beta", &good_root, true),
    ];
    assert_eq!(manager.start(&mods), 1);
    assert!(!manager.is_watching("Alpha"));
    assert!(manager.is_watching("Beta"));
}

#[test]
fn test_watch_flag_respected() {
    let temp = TempDir::new().unwrap();

    let (sink, _rx) = channel_sink();
    let coalescer = Arc::new(DebounceCoalescer::start(Duration::from_millis(100), sink).unwrap());
    let manager = FileWatchManager::new(coalescer);

    let mods = [entry_at("Quiet", temp.path(), false)];
    assert_eq!(manager.start(&mods), 0);
    assert!(manager.is_empty());
}

#[test]
fn test_file_change_triggers_request() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("alpha");
    fs::create_dir_all(root.join("Textures")).unwrap();

    let (sink, rx) = channel_sink();
    let coalescer = Arc::new(DebounceCoalescer::start(Duration::from_millis(100), sink).unwrap());
    let manager = FileWatchManager::new(coalescer);
    assert_eq!(manager.start(&[entry_at("Alpha", &root, true)]), 1);

    fs::write(root.join("Textures").join("icon.png"), b"png").unwrap();
    fs::write(root.join("About.xml"), b"<about/>").unwrap();

    let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(names(&request), ["Alpha"]);
}

#[test]
fn test_stop_releases_watches() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("alpha");
    fs::create_dir_all(&root).unwrap();

    let (sink, rx) = channel_sink();
    let coalescer = Arc::new(DebounceCoalescer::start(Duration::from_millis(100), sink).unwrap());
    let manager = FileWatchManager::new(coalescer);
    manager.start(&[entry_at("Alpha", &root, true)]);

    manager.stop();
    manager.stop();
    assert!(manager.is_empty());

    fs::write(root.join("Defs.xml"), b"<defs/>").unwrap();
    assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
}
