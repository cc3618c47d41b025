use std::path::PathBuf;

use notify::EventKind;
use thiserror::Error;

/// Failures acquiring watch resources. Never fatal: the affected mod or
/// subsystem is left without automatic reload.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to start debounce timer")]
    Timer(#[source] std::io::Error),

    #[error("failed to watch `{}` for {mod_name}", root.display())]
    Subscribe {
        mod_name: String,
        root: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Whether a raw event counts as a change under a mod root.
///
/// Create, modify (including rename) and remove all count the same.
/// Access and unknown events do not.
pub(super) fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
