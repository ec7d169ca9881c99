use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the file watcher to the `watch` loop.
#[derive(Debug, PartialEq, Eq)]
pub enum FileEvent {
    /// The state record was written (or replaced) by another process.
    StateChanged,
}

/// Watches the directory holding the state record.
///
/// Atomic writes replace the file via rename, so the directory is watched
/// rather than the file itself.
pub struct StateWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl StateWatcher {
    /// Start watching `state_path`.
    /// Returns a `StateWatcher` whose `poll()` method should be called each tick.
    pub fn start(state_path: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let dir = match state_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        // Backends report resolved paths, so compare against the resolved dir
        let dir = dir.canonicalize().unwrap_or(dir);
        let target = match state_path.file_name() {
            Some(name) => dir.join(name),
            None => state_path.to_path_buf(),
        };

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };
                if is_state_event(&event, &target) {
                    let _ = tx.send(FileEvent::StateChanged);
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(StateWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll for pending file events.
    /// Returns all queued events (may be empty).
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

/// Only creates and modifications of the state record itself count; the
/// lock file, backups, and the recovery log live in the same directory.
fn is_state_event(event: &Event, target: &Path) -> bool {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => {}
        _ => return false,
    }
    event.paths.iter().any(|p| p == target)
}
