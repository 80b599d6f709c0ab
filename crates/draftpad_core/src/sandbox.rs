//! The isolated rendering surface and its rebuild cycle.
//!
//! [`PreviewSandbox`] owns exactly one [`RenderSurface`]. Every refresh is a
//! full teardown-and-rebuild: the complete document is rewritten, never
//! patched, trading incremental-update performance for the guarantee that no
//! stale event handlers or partial state survive a content edit. Stale
//! renders are harmless for the same reason; the next refresh simply
//! overwrites them.

use crate::render;
use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

/// The surface failed to accept a document write.
#[derive(Debug, Error)]
#[error("render surface failure: {0}")]
pub struct SurfaceError(pub String);

/// The math typesetting pass failed. Contained by the sandbox, never
/// propagated; a single malformed expression must not blank the preview.
#[derive(Debug, Error)]
#[error("typesetting failed: {0}")]
pub struct TypesetError(pub String);

/// An isolated rendering context.
///
/// Isolation contract: the document executes injected script content but the
/// surface must not grant it access to host storage, cookies or navigation.
/// It may use its own transient execution environment only; same-origin
/// loading is allowed solely for the injected style/script dependencies.
#[async_trait]
pub trait RenderSurface: Send {
    /// Discard the current document and open a fresh one for writing.
    fn open_document(&mut self) -> Result<(), SurfaceError>;

    /// Append part of the new document.
    fn write(&mut self, chunk: &str) -> Result<(), SurfaceError>;

    /// Finish the document; the surface may start executing it.
    fn close_document(&mut self) -> Result<(), SurfaceError>;

    /// Run the math typesetting pass over the finished document.
    async fn typeset(&mut self) -> Result<(), TypesetError>;
}

/// Exclusive owner of one [`RenderSurface`].
///
/// Nothing outside the sandbox may mutate the surface's document directly;
/// all interaction goes through [`PreviewSandbox::refresh`].
#[derive(Debug)]
pub struct PreviewSandbox<S> {
    surface: S,
    renders: u64,
}

impl<S: RenderSurface> PreviewSandbox<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            renders: 0,
        }
    }

    /// Rebuild the sandboxed document for `(source, zoom)` and run one
    /// typesetting pass over it.
    ///
    /// Typesetting failures are logged and swallowed here; the rendered
    /// content stays up regardless.
    pub async fn refresh(&mut self, source: &str, zoom: u16) -> Result<(), SurfaceError> {
        let document = render::build_preview_document(source, zoom);

        self.surface.open_document()?;
        self.surface.write(&document)?;
        self.surface.close_document()?;
        self.renders += 1;

        if let Err(err) = self.surface.typeset().await {
            tracing::warn!(error = %err, "typesetting failed; keeping rendered content");
        }

        Ok(())
    }

    /// How many full rebuilds this sandbox has performed.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

/// Headless surface holding the latest document in memory.
///
/// The standard test double, also useful for dry-run hosts that only want
/// the built document string.
#[derive(Debug, Default)]
pub struct InMemorySurface {
    open: bool,
    pending: String,
    document: Mutex<String>,
    typeset_passes: u64,
    fail_typeset: bool,
}

impl InMemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent typeset pass fail, for error-path tests.
    pub fn fail_typeset(&mut self, fail: bool) {
        self.fail_typeset = fail;
    }

    /// The last fully written document.
    pub fn document(&self) -> String {
        self.document.lock().unwrap().clone()
    }

    pub fn typeset_passes(&self) -> u64 {
        self.typeset_passes
    }
}

#[async_trait]
impl RenderSurface for InMemorySurface {
    fn open_document(&mut self) -> Result<(), SurfaceError> {
        self.open = true;
        self.pending.clear();
        Ok(())
    }

    fn write(&mut self, chunk: &str) -> Result<(), SurfaceError> {
        if !self.open {
            return Err(SurfaceError("write before open".into()));
        }
        self.pending.push_str(chunk);
        Ok(())
    }

    fn close_document(&mut self) -> Result<(), SurfaceError> {
        if !self.open {
            return Err(SurfaceError("close before open".into()));
        }
        self.open = false;
        *self.document.lock().unwrap() = std::mem::take(&mut self.pending);
        Ok(())
    }

    async fn typeset(&mut self) -> Result<(), TypesetError> {
        if self.fail_typeset {
            return Err(TypesetError("malformed expression".into()));
        }
        self.typeset_passes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_rebuilds_whole_document() {
        let mut sandbox = PreviewSandbox::new(InMemorySurface::new());

        sandbox.refresh("first", 100).await.unwrap();
        assert!(sandbox.surface().document().contains("first"));

        sandbox.refresh("second", 100).await.unwrap();
        let document = sandbox.surface().document();
        assert!(document.contains("second"));
        // Full teardown: nothing of the previous render survives.
        assert!(!document.contains("first"));
        assert_eq!(sandbox.renders(), 2);
    }

    #[tokio::test]
    async fn test_one_typeset_pass_per_render() {
        let mut sandbox = PreviewSandbox::new(InMemorySurface::new());
        sandbox.refresh("a", 100).await.unwrap();
        sandbox.refresh("b", 100).await.unwrap();
        sandbox.refresh("c", 100).await.unwrap();
        assert_eq!(sandbox.surface().typeset_passes(), 3);
    }

    #[tokio::test]
    async fn test_typeset_failure_keeps_rendered_content() {
        let mut surface = InMemorySurface::new();
        surface.fail_typeset(true);
        let mut sandbox = PreviewSandbox::new(surface);

        // Refresh still succeeds; the failure stays inside the sandbox.
        sandbox.refresh("$\\bad{", 100).await.unwrap();
        assert!(sandbox.surface().document().contains("$\\bad{"));
    }

    #[tokio::test]
    async fn test_zoom_change_reaches_surface() {
        let mut sandbox = PreviewSandbox::new(InMemorySurface::new());
        sandbox.refresh("x", 150).await.unwrap();
        assert!(sandbox.surface().document().contains("scale(1.5)"));
    }
}
