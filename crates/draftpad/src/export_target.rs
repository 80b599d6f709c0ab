//! Export target backed by temp files and the default browser.

use draftpad_core::error::ExportError;
use draftpad_core::export::{ExportHandle, ExportTarget};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct FileExportTarget {
    dir: PathBuf,
    counter: AtomicU64,
}

impl Default for FileExportTarget {
    fn default() -> Self {
        Self::in_dir(std::env::temp_dir())
    }
}

impl FileExportTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(dir: PathBuf) -> Self {
        Self {
            dir,
            counter: AtomicU64::new(0),
        }
    }
}

impl ExportTarget for FileExportTarget {
    fn materialize(&self, document: &str) -> Result<ExportHandle, ExportError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let path = self
            .dir
            .join(format!("draftpad-export-{}-{n}.html", std::process::id()));
        std::fs::write(&path, document).map_err(|err| {
            // To the user an unwritable temp dir reads the same as a
            // blocked window: the export never appeared.
            tracing::error!(error = %err, path = %path.display(), "failed to materialize export");
            ExportError::OpenBlocked
        })?;
        Ok(ExportHandle::new(path.to_string_lossy().into_owned()))
    }

    fn open(&self, handle: &ExportHandle) -> Result<(), ExportError> {
        webbrowser::open(handle.uri()).map_err(|err| {
            tracing::warn!(error = %err, "could not open a browser for the export");
            ExportError::OpenBlocked
        })
    }

    fn release(&self, handle: ExportHandle) {
        if let Err(err) = std::fs::remove_file(handle.uri()) {
            tracing::debug!(error = %err, uri = handle.uri(), "export file already gone");
        }
    }
}
