//! Host-wide lock file. While held it carries one JSON line naming the holder,
//! so a contending run can say whose batch it is waiting for.
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use super::{LockGuard, LockHolder, LockManager};
use crate::constants::LOCK_POLL_MS;
use crate::types::errors::{Error, ErrorKind, Result};

#[derive(Debug)]
pub struct FileLockManager {
    path: PathBuf,
}

impl FileLockManager {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Holder recorded by the current owner. `None` when free or unreadable.
    #[must_use]
    pub fn holder(&self) -> Option<LockHolder> {
        let text = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(text.trim()).ok()
    }

    fn io_err(&self, e: &std::io::Error) -> Error {
        Error::new(ErrorKind::Io, format!("lock {}: {e}", self.path.display()))
    }

    fn open(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(&e))?;
            }
        }
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io_err(&e))
    }

    fn contended(&self, waited: Duration) -> Error {
        let who = self.holder().map_or_else(
            || "another invocation".to_string(),
            |h| format!("pid {} (run {})", h.pid, h.run_id),
        );
        Error::new(
            ErrorKind::Policy,
            format!(
                "{} held by {who}; gave up after {}ms",
                self.path.display(),
                waited.as_millis()
            ),
        )
    }
}

struct HeldLock {
    file: File,
}

impl HeldLock {
    fn stamp(&mut self, holder: &LockHolder) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(holder)?;
        line.push(b'\n');
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&line)?;
        self.file.sync_data()
    }
}

impl Drop for HeldLock {
    fn drop(&mut self) {
        // Clear the holder line before anyone else can take the lock.
        let _ = self.file.set_len(0);
        let _ = self.file.unlock();
    }
}

impl LockGuard for HeldLock {}

impl LockManager for FileLockManager {
    fn acquire_process_lock(&self, timeout: Duration, holder: &LockHolder) -> Result<Box<dyn LockGuard>> {
        let file = self.open()?;
        let t0 = Instant::now();
        let contended = fs2::lock_contended_error().raw_os_error();
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(e) if e.raw_os_error() != contended => return Err(self.io_err(&e)),
                Err(_) => {
                    let waited = t0.elapsed();
                    if waited >= timeout {
                        return Err(self.contended(waited));
                    }
                    thread::sleep(Duration::from_millis(LOCK_POLL_MS).min(timeout - waited));
                }
            }
        }
        let mut held = HeldLock { file };
        held.stamp(holder).map_err(|e| self.io_err(&e))?;
        Ok(Box::new(held))
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
