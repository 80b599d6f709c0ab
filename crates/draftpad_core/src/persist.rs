//! Persistence port and the persisted record layouts.
//!
//! The core never reaches into ambient storage. Everything goes through the
//! [`PersistencePort`] the host injects: a single global key/value space
//! holding two independent records under fixed keys. Only the autosave loop
//! and the initial load routine touch the document key, and both run on the
//! same event loop, so there are no concurrent writers.

use crate::error::Notification;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Key for the editor document record.
pub const DOCUMENT_KEY: &str = "draftpad.document";

/// Key for the workflow/report record.
pub const WORKFLOW_KEY: &str = "draftpad.workflow";

/// Title used until the user picks one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Content used when nothing has ever been persisted. A brand-new session
/// starts from this, never from an empty buffer.
pub const DEFAULT_CONTENT: &str = "# Welcome to draftpad\n\n\
Type markup on the left and watch the rendered preview on the right.\n\n\
- Two-space indentation on Tab\n\
- Your work is saved automatically after a short pause\n\
- Math like $e^{i\\pi} + 1 = 0$ is typeset in the preview\n";

/// String key/value store provided by the host.
pub trait PersistencePort: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// The editor document. `content` is always a string, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub content: String,
    /// Formatted timestamp of the last successful save.
    #[serde(rename = "date", default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

impl Document {
    pub fn untitled(content: impl Into<String>) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            content: content.into(),
            saved_at: None,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.saved_at.is_some()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::untitled(DEFAULT_CONTENT)
    }
}

/// Stage of the surrounding report workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStep {
    Content,
    Html,
    Preview,
    Complete,
}

/// Workflow/report record persisted next to the document record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    pub step: WorkflowStep,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    pub is_preview_open: bool,
}

/// Load the editor document.
///
/// Priority: persisted record, then the in-memory carry-over the host may
/// pass along, then the built-in default. A record that fails to parse is
/// discarded and reported as a non-fatal notification.
pub fn load_document(
    port: &dyn PersistencePort,
    carry_over: Option<String>,
) -> (Document, Option<Notification>) {
    if let Some(raw) = port.get(DOCUMENT_KEY) {
        match serde_json::from_str::<Document>(&raw) {
            Ok(document) => return (document, None),
            Err(err) => {
                tracing::warn!(error = %err, key = DOCUMENT_KEY, "discarding malformed document record");
                port.remove(DOCUMENT_KEY);
                return (
                    Document::default(),
                    Some(Notification::warning(
                        "Stored document could not be read; starting from the default template",
                    )),
                );
            }
        }
    }

    if let Some(content) = carry_over {
        return (Document::untitled(content), None);
    }

    (Document::default(), None)
}

/// Load the workflow record, discarding it if malformed.
pub fn load_workflow(port: &dyn PersistencePort) -> Option<WorkflowRecord> {
    let raw = port.get(WORKFLOW_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::warn!(error = %err, key = WORKFLOW_KEY, "discarding malformed workflow record");
            port.remove(WORKFLOW_KEY);
            None
        }
    }
}

/// Store the workflow record.
pub fn store_workflow(port: &dyn PersistencePort, record: &WorkflowRecord) {
    match serde_json::to_string(record) {
        Ok(raw) => port.set(WORKFLOW_KEY, &raw),
        Err(err) => tracing::error!(error = %err, "failed to serialize workflow record"),
    }
}

/// In-memory store; the standard test double for [`PersistencePort`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistencePort for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}
