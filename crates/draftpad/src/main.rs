//! draftpad CLI: edit a markup file with a live browser preview, or export
//! the last saved snapshot as a printable document.

mod export_target;
mod store;
mod watch;

use clap::Parser;
use draftpad_core::error::{ExportError, LogNotifier};
use draftpad_core::export::RELEASE_DELAY;
use draftpad_core::persist::load_document;
use draftpad_core::session::EditorSession;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
enum Cmd {
    /// Edit a markup file; on-disk changes re-render the browser preview.
    Edit {
        file: PathBuf,

        /// Title recorded in saved snapshots.
        #[clap(long)]
        title: Option<String>,

        /// Disable the debounced autosave.
        #[clap(long)]
        no_autosave: bool,

        /// Preview zoom percentage, clamped to 50..=200.
        #[clap(long, default_value_t = 100)]
        zoom: u16,
    },

    /// Build the printable document from the last saved snapshot and open
    /// it in the browser.
    Export,
}

#[derive(Parser, Debug)]
#[clap(name = "draftpad")]
struct Draftpad {
    #[clap(subcommand)]
    cmd: Cmd,
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("draftpad")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Draftpad::parse().cmd {
        Cmd::Edit {
            file,
            title,
            no_autosave,
            zoom,
        } => edit(file, title, no_autosave, zoom).await,
        Cmd::Export => export().await,
    }
}

async fn edit(
    file: PathBuf,
    title: Option<String>,
    no_autosave: bool,
    zoom: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(store::JsonFileStore::open(config_dir()));
    let (surface, doc_rx) = draftpad_server::browser_surface();

    let mut session =
        EditorSession::start(store, surface, Arc::new(LogNotifier), None).await;
    if let Some(title) = title {
        session.set_title(title);
    }
    if no_autosave {
        session.set_autosave_enabled(false);
    }
    session.set_zoom(zoom).await;

    let content = tokio::fs::read_to_string(&file).await?;
    session.set_content(content).await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let server = tokio::spawn(draftpad_server::open_preview_in_browser(listener, doc_rx));

    let mut watcher =
        watch::watch_file(&file).map_err(|e| e as Box<dyn std::error::Error>)?;
    loop {
        tokio::select! {
            changed = watcher.changed() => {
                match changed {
                    Some(()) => match tokio::fs::read_to_string(&file).await {
                        Ok(content) => session.set_content(content).await,
                        Err(err) => tracing::warn!(error = %err, "failed to re-read file"),
                    },
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    // Unmount: pending autosave timers are cancelled, nothing writes
    // against the torn-down session.
    session.shutdown();
    server.abort();
    Ok(())
}

async fn export() -> Result<(), Box<dyn std::error::Error>> {
    let store = store::JsonFileStore::open(config_dir());
    let (document, warning) = load_document(&store, None);
    if let Some(warning) = warning {
        tracing::warn!("{}", warning.message);
    }

    let target = Arc::new(export_target::FileExportTarget::new());
    let result = draftpad_core::export_document(&document, target).await;

    // Keep the process alive until the delayed release has run. Exiting
    // early would cancel the release task with the runtime; even a
    // blocked open leaves a materialized temp file behind otherwise.
    if awaits_release(&result) {
        tokio::time::sleep(RELEASE_DELAY + std::time::Duration::from_millis(200)).await;
    }

    result.map_err(Into::into)
}

/// Whether an export outcome left a materialized resource whose delayed
/// release we must outlive. Precondition refusals open nothing.
fn awaits_release(result: &Result<(), ExportError>) -> bool {
    !matches!(
        result,
        Err(ExportError::EmptyContent | ExportError::NeverSaved)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_export_still_waits_for_release() {
        assert!(awaits_release(&Ok(())));
        assert!(awaits_release(&Err(ExportError::OpenBlocked)));
        // Nothing was materialized, nothing to outlive.
        assert!(!awaits_release(&Err(ExportError::EmptyContent)));
        assert!(!awaits_release(&Err(ExportError::NeverSaved)));
    }
}
