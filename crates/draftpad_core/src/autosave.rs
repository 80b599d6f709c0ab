//! Debounced document persistence.
//!
//! The persister is a two-state machine, Idle and PendingSave, driven by a
//! single event loop. A content change while autosave is enabled enters
//! PendingSave and arms a timer for the quiet period; another change before
//! it fires restarts the timer. Debounce, not throttle: a continuously
//! typing user never triggers a save until they pause. When the timer fires
//! the latest content wins, the record is written under the document key and
//! the machine returns to Idle.

use crate::persist::{Document, PersistencePort, DOCUMENT_KEY};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};

/// Quiet period with no edits before an automatic save fires.
pub const QUIET_PERIOD: Duration = Duration::from_millis(2000);

// While Idle the timer is parked "never", which is just a year out.
const NEVER: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug)]
enum AutosaveEvent {
    ContentChanged(String),
    ManualSave {
        content: String,
        done: oneshot::Sender<Document>,
    },
    SetEnabled(bool),
    SetTitle(String),
    Shutdown,
}

/// Handle to the autosave event loop.
///
/// Dropping the handle shuts the loop down, cancelling any pending timer
/// without saving, so nothing writes against a torn-down target.
#[derive(Debug)]
pub struct AutosavePersister {
    event_tx: mpsc::UnboundedSender<AutosaveEvent>,
    saved_rx: watch::Receiver<Option<Document>>,
}

impl AutosavePersister {
    /// Spawn the event loop against `port`.
    pub fn spawn(port: Arc<dyn PersistencePort>, title: String) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (saved_tx, saved_rx) = watch::channel(None);
        tokio::spawn(run_event_loop(event_rx, saved_tx, port, title));
        Self { event_tx, saved_rx }
    }

    /// Report an edit. Enters PendingSave (or restarts its timer) when
    /// autosave is enabled; ignored while disabled.
    pub fn content_changed(&self, content: impl Into<String>) {
        let _ = self
            .event_tx
            .send(AutosaveEvent::ContentChanged(content.into()));
    }

    /// Save immediately, bypassing the timer. Returns the saved document,
    /// or `None` if the loop is already gone, so the caller can raise the
    /// success/failure notification. Automatic saves never notify.
    pub async fn save_now(&self, content: impl Into<String>) -> Option<Document> {
        let (done, ack) = oneshot::channel();
        self.event_tx
            .send(AutosaveEvent::ManualSave {
                content: content.into(),
                done,
            })
            .ok()?;
        ack.await.ok()
    }

    /// Toggle autosave. Disabling cancels a pending timer without saving.
    pub fn set_enabled(&self, enabled: bool) {
        let _ = self.event_tx.send(AutosaveEvent::SetEnabled(enabled));
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let _ = self.event_tx.send(AutosaveEvent::SetTitle(title.into()));
    }

    /// The most recently saved document, manual or automatic.
    pub fn last_saved(&self) -> Option<Document> {
        self.saved_rx.borrow().clone()
    }
}

impl Drop for AutosavePersister {
    fn drop(&mut self) {
        let _ = self.event_tx.send(AutosaveEvent::Shutdown);
    }
}

async fn run_event_loop(
    mut event_rx: mpsc::UnboundedReceiver<AutosaveEvent>,
    saved_tx: watch::Sender<Option<Document>>,
    port: Arc<dyn PersistencePort>,
    mut title: String,
) {
    let mut enabled = true;
    let mut pending: Option<String> = None;

    let timer = tokio::time::sleep(NEVER);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(AutosaveEvent::ContentChanged(content)) => {
                        if enabled {
                            pending = Some(content);
                            timer.as_mut().reset(tokio::time::Instant::now() + QUIET_PERIOD);
                        }
                    }
                    Some(AutosaveEvent::ManualSave { content, done }) => {
                        // A manual save supersedes whatever was pending.
                        pending = None;
                        timer.as_mut().reset(tokio::time::Instant::now() + NEVER);
                        let document = persist(&*port, &title, &content);
                        saved_tx.send_replace(Some(document.clone()));
                        let _ = done.send(document);
                    }
                    Some(AutosaveEvent::SetEnabled(value)) => {
                        enabled = value;
                        if !enabled {
                            pending = None;
                            timer.as_mut().reset(tokio::time::Instant::now() + NEVER);
                        }
                    }
                    Some(AutosaveEvent::SetTitle(new_title)) => {
                        title = new_title;
                    }
                    Some(AutosaveEvent::Shutdown) | None => break,
                }
            }
            () = &mut timer, if pending.is_some() => {
                if let Some(content) = pending.take() {
                    let document = persist(&*port, &title, &content);
                    tracing::debug!(bytes = document.content.len(), "autosaved document");
                    saved_tx.send_replace(Some(document));
                }
                timer.as_mut().reset(tokio::time::Instant::now() + NEVER);
            }
        }
    }
}

/// Serialize `{title, trimmed content, formatted now}` under the document key.
fn persist(port: &dyn PersistencePort, title: &str, content: &str) -> Document {
    let document = Document {
        title: title.to_string(),
        content: content.trim().to_string(),
        saved_at: Some(format_timestamp(chrono::Local::now())),
    };
    match serde_json::to_string(&document) {
        Ok(raw) => port.set(DOCUMENT_KEY, &raw),
        Err(err) => tracing::error!(error = %err, "failed to serialize document record"),
    }
    document
}

fn format_timestamp(now: chrono::DateTime<chrono::Local>) -> String {
    now.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that counts writes, to assert exactly one save fires.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        sets: AtomicUsize,
    }

    impl PersistencePort for CountingStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) {
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value);
        }
        fn remove(&self, key: &str) {
            self.inner.remove(key)
        }
    }

    fn stored_document(store: &dyn PersistencePort) -> Option<Document> {
        store
            .get(DOCUMENT_KEY)
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_latest_content_wins_exactly_once() {
        let store = Arc::new(CountingStore::default());
        let autosave = AutosavePersister::spawn(store.clone(), "T".into());

        // Edits at t=0, t=500, t=1000; quiet period 2000.
        autosave.content_changed("one");
        sleep_ms(500).await;
        autosave.content_changed("two");
        sleep_ms(500).await;
        autosave.content_changed("three");

        // Nothing may fire before t=3000.
        sleep_ms(1999).await;
        assert!(stored_document(&*store).is_none());

        sleep_ms(2).await;
        let saved = stored_document(&*store).expect("save fired at t=3001");
        assert_eq!(saved.content, "three");
        assert_eq!(store.sets.load(Ordering::SeqCst), 1);

        // Nothing else fires afterwards.
        sleep_ms(10_000).await;
        assert_eq!(store.sets.load(Ordering::SeqCst), 1);
        assert_eq!(autosave.last_saved().unwrap().content, "three");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_cancels_pending_save() {
        let store = Arc::new(MemoryStore::new());
        let autosave = AutosavePersister::spawn(store.clone(), "T".into());

        autosave.content_changed("draft");
        sleep_ms(100).await;
        autosave.set_enabled(false);

        sleep_ms(10_000).await;
        assert!(store.get(DOCUMENT_KEY).is_none());

        // Edits while disabled are ignored entirely.
        autosave.content_changed("more");
        sleep_ms(10_000).await;
        assert!(store.get(DOCUMENT_KEY).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_save_is_immediate_and_trims() {
        let store = Arc::new(MemoryStore::new());
        let autosave = AutosavePersister::spawn(store.clone(), "Report".into());

        let saved = autosave.save_now("  X  \n").await.unwrap();
        assert_eq!(saved.title, "Report");
        assert_eq!(saved.content, "X");
        assert!(saved.saved_at.is_some());
        assert_eq!(stored_document(&*store).unwrap(), saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_save_supersedes_pending_timer() {
        let store = Arc::new(CountingStore::default());
        let autosave = AutosavePersister::spawn(store.clone(), "T".into());

        autosave.content_changed("typed");
        sleep_ms(100).await;
        autosave.save_now("typed").await.unwrap();

        sleep_ms(10_000).await;
        assert_eq!(store.sets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_save() {
        let store = Arc::new(MemoryStore::new());
        let autosave = AutosavePersister::spawn(store.clone(), "T".into());

        autosave.content_changed("doomed");
        sleep_ms(100).await;
        drop(autosave);

        sleep_ms(10_000).await;
        assert!(store.get(DOCUMENT_KEY).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_trip_through_port() {
        let store = Arc::new(MemoryStore::new());
        let autosave = AutosavePersister::spawn(store.clone(), "T".into());
        autosave.save_now("X").await.unwrap();

        let (loaded, warning) = crate::persist::load_document(&*store, None);
        assert!(warning.is_none());
        assert_eq!(loaded.title, "T");
        assert_eq!(loaded.content, "X");
        assert!(loaded.is_saved());
    }

    #[test]
    fn test_timestamp_format() {
        use chrono::TimeZone;
        let dt = chrono::Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap();
        assert_eq!(format_timestamp(dt), "2024-03-05 09:07");
    }
}
