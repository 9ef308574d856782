//! Directory watch source
//!
//! Wraps a recursive `notify` watcher. Raw create/rename events are
//! debounced per path: a file is only reported once its size has stayed
//! unchanged for the configured stability threshold. Dot-files (and anything
//! under a dot-directory) are ignored, as is anything already present when
//! the watch starts.

use cardvault_core::{Config, IngestError, IngestResult};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Ready events buffered before the debouncer waits on the consumer
const READY_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    /// Size must stay unchanged this long
    pub stability_threshold: Duration,
    /// Size sampling period
    pub poll_interval: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            stability_threshold: Duration::from_millis(2000),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl From<&Config> for WatchConfig {
    fn from(config: &Config) -> Self {
        Self {
            stability_threshold: config.stability_threshold(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// A file whose writes have settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyFile {
    pub path: PathBuf,
    /// Size at the moment it was judged stable
    pub size: u64,
}

/// Live watch over a directory tree. Dropping it stops the watcher and any
/// pending stability checks.
pub struct DirectoryWatch {
    root: PathBuf,
    ready_rx: mpsc::Receiver<ReadyFile>,
    debouncer: JoinHandle<()>,
    _watcher: RecommendedWatcher,
}

impl DirectoryWatch {
    /// Start watching `root` recursively.
    ///
    /// Must be called from within a Tokio runtime. A missing or unwatchable
    /// root is [`IngestError::FatalStartup`].
    pub fn start(root: impl Into<PathBuf>, config: WatchConfig) -> IngestResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(IngestError::FatalStartup(format!(
                "Watch directory {} does not exist or is not a directory",
                root.display()
            )));
        }
        let root = root.canonicalize().map_err(|e| {
            IngestError::FatalStartup(format!(
                "Failed to resolve watch directory {}: {}",
                root.display(),
                e
            ))
        })?;

        let (raw_tx, raw_rx) = mpsc::unbounded_channel::<PathBuf>();
        let filter_root = root.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if !is_arrival(&event.kind) {
                        return;
                    }
                    for path in event.paths {
                        if is_hidden(&filter_root, &path) {
                            tracing::trace!(path = %path.display(), "Ignoring hidden path");
                            continue;
                        }
                        if raw_tx.send(path).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            notify::Config::default(),
        )
        .map_err(|e| IngestError::FatalStartup(format!("Failed to create watcher: {}", e)))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| {
                IngestError::FatalStartup(format!(
                    "Failed to watch {}: {}",
                    root.display(),
                    e
                ))
            })?;

        let (ready_tx, ready_rx) = mpsc::channel(READY_CHANNEL_CAPACITY);
        let debouncer = tokio::spawn(debounce(root.clone(), raw_rx, ready_tx, config));

        tracing::info!(
            root = %root.display(),
            stability_threshold_ms = config.stability_threshold.as_millis() as u64,
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            "Watching directory"
        );

        Ok(Self {
            root,
            ready_rx,
            debouncer,
            _watcher: watcher,
        })
    }

    /// Next file whose writes have settled. `None` once the watch is closed.
    pub async fn next(&mut self) -> Option<ReadyFile> {
        self.ready_rx.recv().await
    }

    /// Canonical watch root
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for DirectoryWatch {
    fn drop(&mut self) {
        self.debouncer.abort();
    }
}

/// New files and files renamed into the tree. Plain content modifications
/// of files that were already present do not count as arrivals.
fn is_arrival(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(CreateKind::File | CreateKind::Folder | CreateKind::Any)
            | EventKind::Modify(ModifyKind::Name(
                RenameMode::To | RenameMode::Both | RenameMode::Any
            ))
    )
}

/// Any component below `root` starting with a dot.
fn is_hidden(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Stability check per path; a path already being checked is not checked
/// twice concurrently.
async fn debounce(
    root: PathBuf,
    mut raw_rx: mpsc::UnboundedReceiver<PathBuf>,
    ready_tx: mpsc::Sender<ReadyFile>,
    config: WatchConfig,
) {
    let mut in_flight: HashSet<PathBuf> = HashSet::new();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<PathBuf>();

    loop {
        tokio::select! {
            received = raw_rx.recv() => {
                let Some(path) = received else {
                    break;
                };
                for path in expand(&root, path).await {
                    if !in_flight.insert(path.clone()) {
                        continue;
                    }
                    let ready_tx = ready_tx.clone();
                    let done_tx = done_tx.clone();
                    tokio::spawn(async move {
                        if let Some(size) =
                            wait_until_stable(&path, config.stability_threshold, config.poll_interval).await
                        {
                            tracing::debug!(path = %path.display(), size, "File ready");
                            let _ = ready_tx.send(ReadyFile { path: path.clone(), size }).await;
                        }
                        let _ = done_tx.send(path);
                    });
                }
            }
            Some(path) = done_rx.recv() => {
                in_flight.remove(&path);
            }
        }

        if ready_tx.is_closed() {
            break;
        }
    }
}

/// A directory that arrives whole (moved in, or created with content) is
/// expanded to the visible files below it. Anything else passes through.
async fn expand(root: &Path, path: PathBuf) -> Vec<PathBuf> {
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return vec![path],
    }

    let mut files = Vec::new();
    let mut stack = vec![path];
    while let Some(dir) = stack.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Failed to list directory");
                continue;
            }
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let entry_path = entry.path();
            if is_hidden(root, &entry_path) {
                continue;
            }
            match entry.file_type().await {
                Ok(kind) if kind.is_dir() => stack.push(entry_path),
                Ok(kind) if kind.is_file() => files.push(entry_path),
                _ => {}
            }
        }
    }
    files
}

/// Sample the size of `path` every `poll` until it has not changed for
/// `threshold`, and return that size.
///
/// Returns `None` if the path disappears or turns out not to be a regular
/// file.
pub async fn wait_until_stable(path: &Path, threshold: Duration, poll: Duration) -> Option<u64> {
    let mut last_size: Option<u64> = None;
    let mut stable_since = Instant::now();

    loop {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {
                let size = meta.len();
                if last_size != Some(size) {
                    last_size = Some(size);
                    stable_since = Instant::now();
                } else if stable_since.elapsed() >= threshold {
                    return Some(size);
                }
            }
            Ok(_) => return None,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "File vanished before settling");
                return None;
            }
        }
        tokio::time::sleep(poll).await;
    }
}
