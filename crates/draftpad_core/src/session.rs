//! Editor session wiring: one buffer, one sandbox, one autosave loop.
//!
//! Control flow on every edit: buffer mutates, the line index recounts, the
//! autosave loop is poked, the preview is rebuilt in full. Zoom changes feed
//! only the render path. The view mode decides what the host mounts but
//! never touches buffer or sandbox state.

use crate::autosave::AutosavePersister;
use crate::buffer::TextBuffer;
use crate::error::{EditorError, Notification, Notifier};
use crate::export::{export_document, ExportTarget};
use crate::line_index::LineIndex;
use crate::persist::{self, Document, PersistencePort};
use crate::sandbox::{PreviewSandbox, RenderSurface};
use crate::stats::{calculate_document_stats, DocumentStats};
use crate::zoom::ZoomController;
use std::sync::Arc;

/// Which editor views are mounted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    Code,
    Preview,
    #[default]
    Split,
}

/// A key press as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Tab,
}

/// Commands the session understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    ManualSave,
    SetMode(ViewMode),
    InsertTab,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

/// Map a key press to an editor command while the editing surface is
/// focused. `None` falls through to the host's default handling; Tab never
/// does, it always becomes an insert.
pub fn intercept_key(modifier: bool, key: Key) -> Option<EditorCommand> {
    match (modifier, key) {
        (true, Key::Char('s') | Key::Char('S')) => Some(EditorCommand::ManualSave),
        (true, Key::Char('1')) => Some(EditorCommand::SetMode(ViewMode::Code)),
        (true, Key::Char('2')) => Some(EditorCommand::SetMode(ViewMode::Preview)),
        (true, Key::Char('3')) => Some(EditorCommand::SetMode(ViewMode::Split)),
        (_, Key::Tab) => Some(EditorCommand::InsertTab),
        _ => None,
    }
}

/// Host capability for the copy action.
pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), EditorError>;
}

/// One live editing session.
pub struct EditorSession<S> {
    buffer: TextBuffer,
    line_index: LineIndex,
    zoom: ZoomController,
    mode: ViewMode,
    sandbox: PreviewSandbox<S>,
    autosave: AutosavePersister,
    notifier: Arc<dyn Notifier>,
    document: Document,
}

impl<S: RenderSurface> EditorSession<S> {
    /// Load the document (port, then carry-over, then default), spawn the
    /// autosave loop and render the initial preview.
    pub async fn start(
        port: Arc<dyn PersistencePort>,
        surface: S,
        notifier: Arc<dyn Notifier>,
        carry_over: Option<String>,
    ) -> Self {
        let (document, warning) = persist::load_document(&*port, carry_over);
        if let Some(notification) = warning {
            notifier.notify(notification);
        }

        let buffer = TextBuffer::new(document.content.clone());
        let mut line_index = LineIndex::new();
        line_index.update(buffer.content());

        let autosave = AutosavePersister::spawn(port, document.title.clone());

        let mut session = Self {
            buffer,
            line_index,
            zoom: ZoomController::new(),
            mode: ViewMode::default(),
            sandbox: PreviewSandbox::new(surface),
            autosave,
            notifier,
            document,
        };
        session.refresh_preview().await;
        session
    }

    /// Replace the buffer content and republish to every dependent.
    pub async fn set_content(&mut self, new_text: impl Into<String>) {
        self.buffer.set_content(new_text);
        self.after_edit().await;
    }

    /// Replace the selection with `literal`, cursor landing right after it.
    pub async fn insert_at_cursor(&mut self, start: usize, end: usize, literal: &str) {
        self.buffer.insert_at_cursor(start, end, literal);
        self.after_edit().await;
    }

    pub async fn handle_command(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::ManualSave => self.save_now().await,
            EditorCommand::SetMode(mode) => self.mode = mode,
            EditorCommand::InsertTab => {
                let cursor = self.buffer.cursor();
                self.buffer.insert_tab(cursor, cursor);
                self.after_edit().await;
            }
            EditorCommand::ZoomIn => {
                self.zoom.zoom_in();
                self.refresh_preview().await;
            }
            EditorCommand::ZoomOut => {
                self.zoom.zoom_out();
                self.refresh_preview().await;
            }
            EditorCommand::ZoomReset => {
                self.zoom.reset();
                self.refresh_preview().await;
            }
        }
    }

    /// Manual save: immediate, and unlike automatic saves it notifies.
    pub async fn save_now(&mut self) {
        match self.autosave.save_now(self.buffer.content()).await {
            Some(saved) => {
                self.document = saved;
                self.notifier.notify(Notification::info("Document saved"));
            }
            None => {
                self.notifier
                    .notify(Notification::error("Save failed: autosave loop is gone"));
            }
        }
    }

    pub fn set_autosave_enabled(&self, enabled: bool) {
        self.autosave.set_enabled(enabled);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.document.title = title.into();
        self.autosave.set_title(self.document.title.clone());
    }

    /// Set the zoom directly (clamped) and re-render.
    pub async fn set_zoom(&mut self, zoom: u16) {
        self.zoom.set(zoom);
        self.refresh_preview().await;
    }

    /// Mirror the buffer viewport scroll into the gutter, same tick.
    pub fn sync_scroll(&mut self, offset: f64) {
        self.line_index.sync_scroll(offset);
    }

    /// Copy the raw source. Failure leaves the buffer untouched and is
    /// surfaced as a notification.
    pub fn copy_source(&self, clipboard: &dyn Clipboard) {
        if let Err(err) = clipboard.copy(self.buffer.content()) {
            tracing::warn!(error = %err, "copy failed");
            self.notifier
                .notify(Notification::warning("Could not copy to clipboard"));
        }
    }

    /// Export the current document through `target`, surfacing every
    /// refusal as a notification.
    pub async fn export(&self, target: Arc<dyn ExportTarget>) {
        if let Err(err) = export_document(&self.current_document(), target).await {
            self.notifier.notify(Notification::warning(err.to_string()));
        }
    }

    /// The document as the user sees it: live buffer content plus the most
    /// recent saved-at stamp, whether manual or automatic.
    pub fn current_document(&self) -> Document {
        let mut document = self.document.clone();
        document.content = self.buffer.content().to_string();
        if let Some(saved) = self.autosave.last_saved() {
            document.saved_at = saved.saved_at;
        }
        document
    }

    pub fn stats(&self) -> DocumentStats {
        calculate_document_stats(self.buffer.content())
    }

    async fn after_edit(&mut self) {
        self.line_index.update(self.buffer.content());
        self.document.content = self.buffer.content().to_string();
        self.autosave.content_changed(self.buffer.content());
        self.refresh_preview().await;
    }

    async fn refresh_preview(&mut self) {
        if let Err(err) = self
            .sandbox
            .refresh(self.buffer.content(), self.zoom.zoom())
            .await
        {
            tracing::error!(error = %err, "preview rebuild failed");
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn sandbox(&self) -> &PreviewSandbox<S> {
        &self.sandbox
    }

    /// Tear the session down. Dropping the autosave handle cancels any
    /// pending timer so nothing writes against a dead target.
    pub fn shutdown(self) {}
}
