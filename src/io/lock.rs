use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LOCK_FILE: &str = ".lock";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive advisory lock held by a `bd` process while it loads, changes
/// and saves the state record. Released when dropped.
///
/// The lock file stays on disk: removing it on release would let a waiter
/// that already opened the old file and a newcomer that creates a fresh one
/// both believe they hold the lock.
#[derive(Debug)]
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError { path: PathBuf, source: io::Error },
    #[error("timed out waiting for {path}: another bd process is writing")]
    Timeout { path: PathBuf },
    #[error("lock error: {0}")]
    IoError(#[from] io::Error),
}

impl FileLock {
    /// Lock `<state_dir>/.lock`, creating the directory if needed and
    /// retrying until `timeout` elapses.
    pub fn acquire(state_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        fs::create_dir_all(state_dir)?;
        let path = state_dir.join(LOCK_FILE);
        let file = open_lock_file(&path)?;

        let deadline = Instant::now() + timeout;
        while !try_lock(&file)? {
            if Instant::now() >= deadline {
                log::warn!("event=lock status=timeout path={}", path.display());
                return Err(LockError::Timeout { path });
            }
            std::thread::sleep(RETRY_INTERVAL);
        }

        log::debug!("event=lock status=acquired path={}", path.display());
        Ok(FileLock { _file: file, path })
    }

    pub fn acquire_default(state_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(state_dir, DEFAULT_TIMEOUT)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_lock_file(path: &Path) -> Result<File, LockError> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|source| LockError::CreateError {
            path: path.to_path_buf(),
            source,
        })
}

/// Non-blocking exclusive flock. `Ok(false)` means someone else holds it.
#[cfg(unix)]
fn try_lock(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::EWOULDBLOCK) | Some(libc::EINTR) => Ok(false),
        _ => Err(err),
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> io::Result<bool> {
    Ok(true)
}
