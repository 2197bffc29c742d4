//! Persistence backends for the dictionary document.
//!
//! The dictionary only ever reads its whole document once (at load) and
//! replaces it wholesale on every mutation, so a backend is just a
//! read/write pair over a string.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tempfile::NamedTempFile;

/// A place the dictionary document is read from and written to.
pub trait Storage: Send {
    /// Read the full document. `NotFound` means nothing was saved yet.
    fn read(&self) -> io::Result<String>;

    /// Replace the full document.
    fn write(&self, contents: &str) -> io::Result<()>;

    /// Block until previously issued writes have landed.
    fn flush(&self) {}
}

impl<S: Storage + Sync> Storage for Arc<S> {
    fn read(&self) -> io::Result<String> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        (**self).write(contents)
    }

    fn flush(&self) {
        (**self).flush()
    }
}

/// A JSON file on disk, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Storage at the fixed dictionary location under a collection root.
    pub fn in_root<P: AsRef<Path>>(root: P) -> Self {
        Self::new(root.as_ref().join(crate::DICTIONARY_FILE))
    }

    /// The file this storage writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(contents.as_bytes())?;
        temp.flush()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// In-memory document, shared between clones. Used by tests and by hosts
/// that persist through their own channel.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents<S: Into<String>>(contents: S) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// Snapshot of the last written document.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> io::Result<String> {
        let guard = self
            .contents
            .lock()
            .map_err(|_| io::Error::other("memory storage lock poisoned"))?;
        guard
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no document saved"))
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| io::Error::other("memory storage lock poisoned"))?;
        *guard = Some(contents.to_string());
        Ok(())
    }
}

enum Job {
    Write(String),
    Flush(Sender<()>),
}

/// Wraps a backend so writes run on a worker thread.
///
/// `write` only queues the document and returns; the worker applies writes
/// in submission order and logs failures. `flush` waits for the queue to
/// drain. Dropping the wrapper drains the queue before returning.
pub struct BackgroundStorage<S: Storage + Sync + 'static> {
    inner: Arc<S>,
    jobs: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl<S: Storage + Sync + 'static> BackgroundStorage<S> {
    pub fn new(inner: S) -> Self {
        let inner = Arc::new(inner);
        let (tx, rx) = mpsc::channel::<Job>();
        let target = Arc::clone(&inner);
        let worker = std::thread::spawn(move || {
            for job in rx {
                match job {
                    Job::Write(contents) => {
                        if let Err(e) = target.write(&contents) {
                            tracing::warn!(error = %e, "background dictionary write failed");
                        }
                    }
                    Job::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });
        Self {
            inner,
            jobs: Some(tx),
            worker: Some(worker),
        }
    }
}

impl<S: Storage + Sync + 'static> Storage for BackgroundStorage<S> {
    fn read(&self) -> io::Result<String> {
        self.flush();
        self.inner.read()
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        match &self.jobs {
            Some(jobs) => jobs
                .send(Job::Write(contents.to_string()))
                .map_err(|_| io::Error::other("background writer stopped")),
            None => self.inner.write(contents),
        }
    }

    fn flush(&self) {
        if let Some(jobs) = &self.jobs {
            let (done_tx, done_rx) = mpsc::channel();
            if jobs.send(Job::Flush(done_tx)).is_ok() {
                let _ = done_rx.recv();
            }
        }
    }
}

impl<S: Storage + Sync + 'static> Drop for BackgroundStorage<S> {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
