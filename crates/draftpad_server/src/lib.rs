//! Browser-backed preview surface.
//!
//! The sandboxed rendering context is a browser tab: the server pushes every
//! fully rebuilt preview document over a WebSocket and the bootstrap page
//! swaps it wholesale into a sandboxed iframe (`allow-scripts` without host
//! storage, cookies or navigation). A plain GET serves the bootstrap page.

use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use draftpad_core::sandbox::{RenderSurface, SurfaceError, TypesetError};
use std::net::SocketAddr;
use tokio::sync::watch;

type Error = Box<dyn std::error::Error + Send + Sync>;

/// Page that hosts the sandboxed iframe and the WebSocket client.
pub const BOOTSTRAP_HTML: &str = include_str!("../assets/bootstrap.html");

/// [`RenderSurface`] whose document lives in a connected browser page.
///
/// `open`/`write`/`close` stage the new document locally; closing publishes
/// it on the watch channel, from which every connected page replaces its
/// iframe document in full.
#[derive(Debug)]
pub struct BrowserSurface {
    staging: String,
    open: bool,
    doc_tx: watch::Sender<String>,
}

/// Create a browser surface plus the receiver the server fans out from.
pub fn browser_surface() -> (BrowserSurface, watch::Receiver<String>) {
    let (doc_tx, doc_rx) = watch::channel(String::new());
    (
        BrowserSurface {
            staging: String::new(),
            open: false,
            doc_tx,
        },
        doc_rx,
    )
}

#[async_trait]
impl RenderSurface for BrowserSurface {
    fn open_document(&mut self) -> Result<(), SurfaceError> {
        self.staging.clear();
        self.open = true;
        Ok(())
    }

    fn write(&mut self, chunk: &str) -> Result<(), SurfaceError> {
        if !self.open {
            return Err(SurfaceError("write before open".into()));
        }
        self.staging.push_str(chunk);
        Ok(())
    }

    fn close_document(&mut self) -> Result<(), SurfaceError> {
        if !self.open {
            return Err(SurfaceError("close before open".into()));
        }
        self.open = false;
        self.doc_tx.send_replace(std::mem::take(&mut self.staging));
        Ok(())
    }

    async fn typeset(&mut self) -> Result<(), TypesetError> {
        // The trigger script embedded in the document runs inside the page;
        // nothing happens server-side.
        Ok(())
    }
}

async fn ws_handler(
    ws: Option<WebSocketUpgrade>,
    Extension(doc_rx): Extension<watch::Receiver<String>>,
) -> impl IntoResponse {
    if let Some(ws) = ws {
        ws.on_upgrade(|socket| async move { handle_websocket(socket, doc_rx).await })
    } else {
        (StatusCode::OK, Html(BOOTSTRAP_HTML)).into_response()
    }
}

async fn handle_websocket(mut socket: WebSocket, mut doc_rx: watch::Receiver<String>) {
    // Late joiners get the current document right away.
    loop {
        let document = doc_rx.borrow_and_update().clone();
        if !document.is_empty() {
            let payload = serde_json::json!({
                "type": "replace_document",
                "data": document,
            });
            if socket
                .send(WsMessage::Text(payload.to_string()))
                .await
                .is_err()
            {
                break;
            }
        }
        if doc_rx.changed().await.is_err() {
            break;
        }
    }

    let _ = socket.send(WsMessage::Close(None)).await;
}

/// Serve the preview on `listener` and open it in the default browser.
pub async fn open_preview_in_browser(
    listener: tokio::net::TcpListener,
    doc_rx: watch::Receiver<String>,
) -> Result<(), Error> {
    let app = Router::new()
        .route("/", get(ws_handler))
        .layer(Extension(doc_rx));

    let port = listener.local_addr()?.port();

    webbrowser::open(&format!("http://127.0.0.1:{port}"))?;

    tracing::debug!("preview listening on {listener:?}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
