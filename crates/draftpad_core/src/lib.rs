//! Core engine for the draftpad live markup editor.
//!
//! This crate keeps two representations of a markup document consistent on
//! every keystroke: the raw source held by [`buffer::TextBuffer`] and the
//! rendered document owned by [`sandbox::PreviewSandbox`]. Every change
//! rebuilds the preview document in full rather than patching it, so no stale
//! state survives an edit.
//!
//! # Modules
//!
//! - [`buffer`] - Raw source buffer and cursor-relative edit operations
//! - [`line_index`] - Line-number gutter derived from the buffer
//! - [`zoom`] - Clamped zoom factor for the preview
//! - [`assets`] - Embedded stylesheets and pinned script library versions
//! - [`render`] - Full preview document assembly (pure)
//! - [`sandbox`] - The isolated rendering surface and its rebuild cycle
//! - [`persist`] - Persistence port, persisted record layouts, load fallbacks
//! - [`autosave`] - Debounced document persistence
//! - [`export`] - Printable export document and transient resource handles
//! - [`stats`] - Document statistics for the status line
//! - [`session`] - Wiring of the above into one editor session
//! - [`error`] - Error taxonomy and user-facing notifications

pub mod assets;
pub mod autosave;
pub mod buffer;
pub mod error;
pub mod export;
pub mod line_index;
pub mod persist;
pub mod render;
pub mod sandbox;
pub mod session;
pub mod stats;
pub mod zoom;

// Re-export commonly used types at crate root
pub use autosave::AutosavePersister;
pub use buffer::TextBuffer;
pub use error::{EditorError, ExportError, Notification, Notifier, NotifyLevel};
pub use export::{build_print_document, export_document, ExportHandle, ExportTarget};
pub use line_index::LineIndex;
pub use persist::{load_document, Document, MemoryStore, PersistencePort};
pub use render::{build_preview_document, RenderRequest};
pub use sandbox::{PreviewSandbox, RenderSurface};
pub use session::{intercept_key, EditorCommand, EditorSession, Key, ViewMode};
pub use stats::{calculate_document_stats, DocumentStats};
pub use zoom::ZoomController;
