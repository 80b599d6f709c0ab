//! Single-file watcher driving the buffer from on-disk edits.

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use tokio::sync::mpsc;

type Error = Box<dyn std::error::Error + Send + Sync>;

/// Emits `()` whenever the watched file is modified or recreated (editors
/// that write-rename included, since the parent directory is watched).
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<()>,
}

impl FileWatcher {
    pub async fn changed(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

pub fn watch_file(path: &Path) -> Result<FileWatcher, Error> {
    let file_name = path
        .file_name()
        .ok_or("watch target must be a file")?
        .to_os_string();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                let ours = event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == Some(&file_name));
                if ours && (event.kind.is_modify() || event.kind.is_create()) {
                    let _ = tx.send(());
                }
            }
            Err(err) => tracing::error!(?err, "file watcher error"),
        },
        notify::Config::default(),
    )?;
    watcher.watch(&parent, RecursiveMode::NonRecursive)?;

    Ok(FileWatcher {
        _watcher: watcher,
        rx,
    })
}
