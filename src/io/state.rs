use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::state::AppState;

/// Error type for state record I/O
#[derive(Debug, thiserror::Error)]
pub enum StateIoError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not serialize state: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Default state record location, respecting XDG_DATA_HOME
pub fn default_state_path() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local").join("share"));
    data_dir.join("braindump").join("state.json")
}

/// Get the user's home directory
pub(crate) fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Directory holding the state record (and its lock, recovery log, backups)
pub fn state_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Load the state record.
///
/// A missing file yields the empty default. A malformed file is backed up as
/// `<path>.bak`, noted in the recovery log, and replaced by the empty
/// default; if the backup cannot be made, the raw record goes into the
/// recovery entry instead. Only an unreadable file is an error.
pub fn load_state(path: &Path) -> Result<AppState, StateIoError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("event=state_load status=missing path={}", path.display());
            return Ok(AppState::default());
        }
        Err(e) => {
            return Err(StateIoError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    match serde_json::from_str::<AppState>(&content) {
        Ok(state) => {
            log::info!(
                "event=state_load status=ok path={} posts={}",
                path.display(),
                state.posts.len()
            );
            Ok(state)
        }
        Err(e) => {
            let bak = backup_path(path);
            let mut fields = vec![
                ("Source".to_string(), path.display().to_string()),
                ("Error".to_string(), e.to_string()),
            ];
            // Without a backup the recovery log holds the only copy
            let (backed_up, body) = match fs::copy(path, &bak) {
                Ok(_) => {
                    fields.push(("Backup".to_string(), bak.display().to_string()));
                    (true, String::new())
                }
                Err(copy_err) => {
                    fields.push(("Backup-Error".to_string(), copy_err.to_string()));
                    (false, content)
                }
            };
            log::warn!(
                "event=state_load status=malformed path={} backed_up={} error={}",
                path.display(),
                backed_up,
                e
            );
            recovery::log_recovery(
                state_dir(path),
                RecoveryEntry {
                    timestamp: Utc::now(),
                    category: RecoveryCategory::Load,
                    description: "malformed state record replaced".to_string(),
                    fields,
                    body,
                },
            );
            Ok(AppState::default())
        }
    }
}

/// Write the state record atomically. On failure the serialized record is
/// kept in the recovery log.
pub fn save_state(path: &Path, state: &AppState) -> Result<(), StateIoError> {
    let content = serde_json::to_string_pretty(state)?;
    let dir = state_dir(path);

    let result =
        fs::create_dir_all(dir).and_then(|_| recovery::atomic_write(path, content.as_bytes()));
    if let Err(e) = result {
        log::error!(
            "event=state_save status=error path={} error={}",
            path.display(),
            e
        );
        recovery::log_recovery(
            dir,
            RecoveryEntry {
                timestamp: Utc::now(),
                category: RecoveryCategory::Write,
                description: "state write failed".to_string(),
                fields: vec![
                    ("Target".to_string(), path.display().to_string()),
                    ("Error".to_string(), e.to_string()),
                ],
                body: content,
            },
        );
        return Err(StateIoError::WriteError {
            path: path.to_path_buf(),
            source: e,
        });
    }

    log::debug!(
        "event=state_save status=ok path={} posts={}",
        path.display(),
        state.posts.len()
    );
    Ok(())
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::recovery::read_recovery_entries;
    use crate::model::post::Post;
    use tempfile::TempDir;

    fn sample_state() -> AppState {
        AppState {
            posts: vec![Post {
                id: "p1".into(),
                label: "Ideas".into(),
                body: "Intro\n\n~ first\n".into(),
            }],
            selected_post_id: Some("p1".into()),
            no_disturb: true,
            immediate: true,
        }
    }

    #[test]
    fn test_write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        save_state(&path, &sample_state()).unwrap();

        let loaded = load_state(&path).unwrap();
        assert_eq!(loaded.posts, sample_state().posts);
        assert_eq!(loaded.selected_post_id, Some("p1".into()));
        assert!(loaded.no_disturb);
        // transient flag is not persisted
        assert!(!loaded.immediate);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/state.json");
        save_state(&path, &AppState::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_read_missing_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let state = load_state(&dir.path().join("state.json")).unwrap();
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn test_read_malformed_json_falls_back_and_backs_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json {{{").unwrap();

        let state = load_state(&path).unwrap();
        assert_eq!(state, AppState::default());

        let bak = dir.path().join("state.json.bak");
        assert_eq!(fs::read_to_string(bak).unwrap(), "not json {{{");
        let entries = read_recovery_entries(dir.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Load);
    }

    #[test]
    fn test_malformed_record_kept_in_recovery_log_when_backup_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let raw = r#"{"posts":[{"id":"a","label":"precious","body":"~ keep"},]}"#;
        fs::write(&path, raw).unwrap();
        // A directory where the backup should go makes the copy fail
        fs::create_dir_all(dir.path().join("state.json.bak").join("occupied")).unwrap();

        let state = load_state(&path).unwrap();
        assert_eq!(state, AppState::default());
        save_state(&path, &state).unwrap();

        let entries = read_recovery_entries(dir.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Load);
        assert_eq!(entries[0].body, raw);
        assert!(entries[0].fields.iter().any(|(k, _)| k == "Backup-Error"));
        assert!(!entries[0].fields.iter().any(|(k, _)| k == "Backup"));
    }

    #[test]
    fn test_read_record_without_optional_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"posts":[{"id":"a","label":"Shopping","body":"~ milk"}]}"#,
        )
        .unwrap();

        let state = load_state(&path).unwrap();
        assert_eq!(state.posts.len(), 1);
        assert!(state.selected_post_id.is_none());
        assert!(!state.no_disturb);
    }

    #[test]
    fn test_failed_write_returns_write_error() {
        let dir = TempDir::new().unwrap();
        // A regular file where a directory is expected makes the write fail
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let path = blocker.join("state.json");

        let err = save_state(&path, &sample_state()).unwrap_err();
        assert!(matches!(err, StateIoError::WriteError { .. }));
    }

    #[test]
    fn test_failed_write_is_kept_in_recovery_log() {
        let dir = TempDir::new().unwrap();
        // The target path is a directory, so the final rename fails
        let path = dir.path().join("state.json");
        fs::create_dir_all(path.join("occupied")).unwrap();

        assert!(save_state(&path, &sample_state()).is_err());

        let entries = read_recovery_entries(dir.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Write);
        assert!(entries[0].body.contains("\"label\": \"Ideas\""));
    }

    #[test]
    fn test_backup_path_appends_extension() {
        assert_eq!(
            backup_path(Path::new("/tmp/x/state.json")),
            PathBuf::from("/tmp/x/state.json.bak")
        );
    }
}
