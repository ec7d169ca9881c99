use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::io::state::{self as state_io, StateIoError};
use crate::model::config::DebounceConfig;
use crate::model::state::AppState;
use crate::ops::brain_ops::{self, BrainError};
use crate::ops::post_ops::{self, PostError};
use crate::ops::reducer::{self, Action};

use super::debounce::Debouncer;

/// Debounce delays for a `Store`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    pub persist_delay: Duration,
    pub recompute_delay: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings::from(&DebounceConfig::default())
    }
}

impl From<&DebounceConfig> for StoreSettings {
    fn from(config: &DebounceConfig) -> Self {
        StoreSettings {
            persist_delay: Duration::from_millis(config.persist_ms),
            recompute_delay: Duration::from_millis(config.recompute_ms),
        }
    }
}

/// Error type for the brain dump helpers on `Store`
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Post(#[from] PostError),
    #[error(transparent)]
    Brain(#[from] BrainError),
}

/// What a `tick` did
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// The brain dump was re-derived
    pub recomputed: bool,
    /// A write was attempted. An `Err` is non-fatal: the state stays in
    /// memory and is written again on the next change or `flush`.
    pub persisted: Option<Result<(), StateIoError>>,
}

/// Owns the application state and its side effects.
///
/// All changes go through `dispatch`, which runs the pure reducer and
/// schedules persistence and brain dump recomputation.
pub struct Store {
    state: AppState,
    path: PathBuf,
    brain_dump: Vec<String>,
    persist: Debouncer,
    recompute: Debouncer,
    /// State differs from what was last written
    dirty: bool,
}

impl Store {
    pub fn new(state: AppState, path: PathBuf, settings: StoreSettings) -> Self {
        let brain_dump = derive_brain_dump(&state);
        Store {
            state,
            path,
            brain_dump,
            persist: Debouncer::new(settings.persist_delay),
            recompute: Debouncer::new(settings.recompute_delay),
            dirty: false,
        }
    }

    /// Load the state record at `path` (or start empty if there is none).
    pub fn open(path: &Path, settings: StoreSettings) -> Result<Self, StateIoError> {
        let state = state_io::load_state(path)?;
        Ok(Store::new(state, path.to_path_buf(), settings))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Brain dump labels of the selected post, as of the last recompute
    pub fn brain_dump(&self) -> &[String] {
        &self.brain_dump
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Run `action` through the reducer. Returns whether the state changed.
    pub fn dispatch(&mut self, action: Action, now: Instant) -> bool {
        let kind = action.kind();
        let rejected = rejection(&self.state, &action);
        let next = reducer::apply(&self.state, action);
        if next == self.state {
            match rejected {
                Some(reason) => log::warn!(
                    "event=dispatch action={} status=noop reason={}",
                    kind,
                    reason
                ),
                None => log::debug!("event=dispatch action={} status=noop", kind),
            }
            return false;
        }

        let view_changed = next.selected_post_id != self.state.selected_post_id
            || next.selected_body() != self.state.selected_body()
            || next.immediate != self.state.immediate;

        log::debug!(
            "event=dispatch action={} status=ok posts={}->{} view_changed={} immediate={}",
            kind,
            self.state.posts.len(),
            next.posts.len(),
            view_changed,
            next.immediate
        );

        self.state = next;
        self.dirty = true;
        self.persist.arm(now);

        if view_changed {
            if self.state.immediate {
                self.recompute.cancel();
                self.brain_dump = derive_brain_dump(&self.state);
            } else {
                self.recompute.arm(now);
            }
        }
        true
    }

    /// Fire any debounced work that is due.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if self.recompute.fire_if_due(now) {
            self.brain_dump = derive_brain_dump(&self.state);
            outcome.recomputed = true;
        }

        if self.persist.fire_if_due(now) && self.dirty {
            outcome.persisted = Some(self.save());
        }

        outcome
    }

    /// Time until the next debounced job, if any is pending.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        match (
            self.persist.time_until_due(now),
            self.recompute.time_until_due(now),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Write pending changes now, skipping the debounce. Also brings the
    /// brain dump up to date.
    pub fn flush(&mut self) -> Result<(), StateIoError> {
        if self.recompute.cancel() {
            self.brain_dump = derive_brain_dump(&self.state);
        }
        self.persist.cancel();
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }

    /// Append a brain dump item to the selected post.
    pub fn add_brain(&mut self, label: &str, now: Instant) -> Result<(), StoreError> {
        post_ops::require_selection(&self.state)?;
        let label = brain_ops::normalize_label(label)?;
        self.dispatch(
            Action::AddBrain {
                label: label.to_string(),
            },
            now,
        );
        Ok(())
    }

    /// Reorder the selected post's brain dump. `to == None` is a cancelled move.
    /// Returns whether the body changed.
    pub fn move_brain_item(
        &mut self,
        from: usize,
        to: Option<usize>,
        now: Instant,
    ) -> Result<bool, StoreError> {
        let post = post_ops::require_selection(&self.state)?;
        let body = brain_ops::move_item(&post.body, from, to)?;
        if body == post.body {
            return Ok(false);
        }
        Ok(self.dispatch(
            Action::UpdateBody {
                body,
                immediate: true,
            },
            now,
        ))
    }

    fn save(&mut self) -> Result<(), StateIoError> {
        match state_io::save_state(&self.path, &self.state) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                log::warn!("event=persist status=deferred error={}", e);
                Err(e)
            }
        }
    }
}

/// Why the reducer will ignore `action`, for actions it cannot apply.
fn rejection(state: &AppState, action: &Action) -> Option<&'static str> {
    match action {
        Action::AddPost { label } if label.trim().is_empty() => Some("empty_label"),
        Action::UpdateBody { .. } if state.selected_post().is_none() => Some("no_selection"),
        Action::AddBrain { .. } if state.selected_post().is_none() => Some("no_selection"),
        Action::AddBrain { label } => brain_ops::normalize_label(label)
            .err()
            .map(|_| "invalid_label"),
        _ => None,
    }
}

fn derive_brain_dump(state: &AppState) -> Vec<String> {
    state
        .selected_body()
        .map(brain_ops::extract)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::post::Post;
    use tempfile::TempDir;

    const DELAY: Duration = Duration::from_millis(500);

    fn settings() -> StoreSettings {
        StoreSettings {
            persist_delay: DELAY,
            recompute_delay: DELAY,
        }
    }

    fn store_in(dir: &TempDir) -> Store {
        Store::new(
            AppState::default(),
            dir.path().join("state.json"),
            settings(),
        )
    }

    fn with_post(store: &mut Store, label: &str, body: &str, now: Instant) {
        store.dispatch(Action::AddPost { label: label.into() }, now);
        store.dispatch(
            Action::UpdateBody {
                body: body.into(),
                immediate: true,
            },
            now,
        );
    }

    #[test]
    fn test_new_store_derives_brain_dump() {
        let dir = TempDir::new().unwrap();
        let state = AppState {
            posts: vec![Post {
                id: "p".into(),
                label: "P".into(),
                body: "~ a\n~ b".into(),
            }],
            selected_post_id: Some("p".into()),
            ..Default::default()
        };
        let store = Store::new(state, dir.path().join("state.json"), settings());
        assert_eq!(store.brain_dump(), ["a", "b"]);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_rejected_actions_are_reported() {
        let empty = AppState::default();
        assert_eq!(
            rejection(&empty, &Action::AddPost { label: " \t".into() }),
            Some("empty_label")
        );
        assert_eq!(
            rejection(
                &empty,
                &Action::UpdateBody {
                    body: "x".into(),
                    immediate: false
                }
            ),
            Some("no_selection")
        );
        assert_eq!(
            rejection(&empty, &Action::AddBrain { label: "x".into() }),
            Some("no_selection")
        );
        assert_eq!(
            rejection(&empty, &Action::AddPost { label: "A".into() }),
            None
        );
        assert_eq!(
            rejection(&empty, &Action::NoDisturb { value: Some(false) }),
            None
        );

        let selected = reducer::apply(&empty, Action::AddPost { label: "A".into() });
        assert_eq!(
            rejection(&selected, &Action::AddBrain { label: "a\nb".into() }),
            Some("invalid_label")
        );
        assert_eq!(
            rejection(
                &selected,
                &Action::UpdateBody {
                    body: "x".into(),
                    immediate: false
                }
            ),
            None
        );
    }

    #[test]
    fn test_noop_dispatch_schedules_nothing() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let t0 = Instant::now();
        assert!(!store.dispatch(Action::AddPost { label: "  ".into() }, t0));
        assert!(!store.is_dirty());
        assert_eq!(store.next_deadline(t0), None);
    }

    #[test]
    fn test_persistence_is_debounced() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let t0 = Instant::now();

        store.dispatch(Action::AddPost { label: "A".into() }, t0);
        store.dispatch(
            Action::AddPost { label: "B".into() },
            t0 + Duration::from_millis(300),
        );

        // First deadline was superseded by the second change
        let outcome = store.tick(t0 + Duration::from_millis(600));
        assert!(outcome.persisted.is_none());
        assert!(!store.path().exists());

        let outcome = store.tick(t0 + Duration::from_millis(800));
        assert!(matches!(outcome.persisted, Some(Ok(()))));
        assert!(!store.is_dirty());

        let loaded = state_io::load_state(store.path()).unwrap();
        assert_eq!(loaded.posts.len(), 2);
    }

    #[test]
    fn test_body_edits_recompute_after_delay() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let t0 = Instant::now();
        store.dispatch(Action::AddPost { label: "A".into() }, t0);
        store.dispatch(
            Action::UpdateBody {
                body: "~ typed".into(),
                immediate: false,
            },
            t0,
        );
        assert!(store.brain_dump().is_empty());

        let outcome = store.tick(t0 + DELAY);
        assert!(outcome.recomputed);
        assert_eq!(store.brain_dump(), ["typed"]);
    }

    #[test]
    fn test_immediate_edits_recompute_at_once() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let t0 = Instant::now();
        with_post(&mut store, "A", "~ one\n~ two", t0);
        assert_eq!(store.brain_dump(), ["one", "two"]);
        assert!(!store.tick(t0 + DELAY).recomputed);
    }

    #[test]
    fn test_add_brain_requires_selection() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert_eq!(
            store.add_brain("x", Instant::now()),
            Err(StoreError::Post(PostError::NoSelection))
        );
    }

    #[test]
    fn test_add_brain_rejects_blank_label() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let t0 = Instant::now();
        store.dispatch(Action::AddPost { label: "A".into() }, t0);
        assert_eq!(
            store.add_brain("   ", t0),
            Err(StoreError::Brain(BrainError::EmptyLabel))
        );
    }

    #[test]
    fn test_add_then_move_brain_items() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let t0 = Instant::now();
        store.dispatch(Action::AddPost { label: "A".into() }, t0);
        store.add_brain("first", t0).unwrap();
        store.add_brain("second", t0).unwrap();
        assert_eq!(store.brain_dump(), ["first", "second"]);

        assert!(store.move_brain_item(1, Some(0), t0).unwrap());
        assert_eq!(store.brain_dump(), ["second", "first"]);
    }

    #[test]
    fn test_cancelled_move_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let t0 = Instant::now();
        with_post(&mut store, "A", "~ one\n~ two", t0);
        let before = store.state().clone();
        assert!(!store.move_brain_item(0, None, t0).unwrap());
        assert!(!store.move_brain_item(1, Some(1), t0).unwrap());
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_move_out_of_range_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let t0 = Instant::now();
        with_post(&mut store, "A", "~ one", t0);
        assert_eq!(
            store.move_brain_item(0, Some(4), t0),
            Err(StoreError::Brain(BrainError::IndexOutOfRange { index: 4, len: 1 }))
        );
    }

    #[test]
    fn test_failed_write_keeps_state_and_retries() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let mut store = Store::new(
            AppState::default(),
            blocker.join("state.json"),
            settings(),
        );
        let t0 = Instant::now();
        store.dispatch(Action::AddPost { label: "A".into() }, t0);

        let outcome = store.tick(t0 + DELAY);
        assert!(matches!(outcome.persisted, Some(Err(_))));
        assert!(store.is_dirty());
        assert_eq!(store.state().posts.len(), 1);
        assert!(store.flush().is_err());
    }

    #[test]
    fn test_flush_writes_pending_state() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let t0 = Instant::now();
        store.dispatch(Action::AddPost { label: "A".into() }, t0);
        store.flush().unwrap();
        assert!(!store.is_dirty());
        assert_eq!(store.next_deadline(t0), None);

        let reopened = Store::open(store.path(), settings()).unwrap();
        assert_eq!(reopened.state().posts[0].label, "A");
    }

    #[test]
    fn test_flush_without_changes_does_not_write() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.flush().unwrap();
        assert!(!store.path().exists());
    }
}
