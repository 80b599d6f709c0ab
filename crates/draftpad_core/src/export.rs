//! Printable export document and transient resource handles.
//!
//! Building the document is pure. Executing an export is not: the document
//! is materialized as a transient resource, opened in a new rendering
//! context, and the resource is released on a fixed delay. The delay is the
//! minimum-lifetime contract: the consuming context must have started
//! loading the resource before it disappears.

use crate::assets;
use crate::error::ExportError;
use crate::persist::Document;
use std::sync::Arc;
use std::time::Duration;

/// How long a materialized export resource stays alive after opening.
pub const RELEASE_DELAY: Duration = Duration::from_millis(1000);

/// Handle to a materialized export resource.
///
/// Released exactly once; [`ExportTarget::release`] consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportHandle {
    uri: String,
}

impl ExportHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    /// Target-defined locator of the resource.
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Host capability for materializing and opening export documents.
pub trait ExportTarget: Send + Sync {
    /// Materialize the document as a transient resource.
    fn materialize(&self, document: &str) -> Result<ExportHandle, ExportError>;

    /// Open the resource in a new rendering context. `OpenBlocked` means the
    /// host refused (popup blocker or similar); the caller surfaces that.
    fn open(&self, handle: &ExportHandle) -> Result<(), ExportError>;

    /// Release the resource. Never called before [`RELEASE_DELAY`] has
    /// elapsed since opening.
    fn release(&self, handle: ExportHandle);
}

/// Assemble the standalone printable document for `(title, source)`.
///
/// Distinct from the live preview document: page-size and margin directives
/// for physical paper, print color fidelity, a floating print control hidden
/// during actual printing, and a startup hook that typesets the math first
/// and only then invokes the print action, so no unrendered formula
/// placeholders end up on paper.
pub fn build_print_document(title: &str, source: &str) -> String {
    let mut document =
        String::with_capacity(source.len() + assets::PREVIEW_CSS.len() + assets::PRINT_CSS.len() + 1024);
    document.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>");
    document.push_str(title);
    document.push_str("</title>\n");
    document.push_str(&assets::dependency_tags());
    document.push_str("\n<style>\n");
    document.push_str(assets::PREVIEW_CSS);
    document.push_str("</style>\n<style>\n");
    document.push_str(assets::PRINT_CSS);
    document.push_str("</style>\n</head>\n<body>\n");
    document.push_str(r#"<button class="print-trigger" onclick="window.print()">Print</button>"#);
    document.push('\n');
    document.push_str(source);
    document.push_str(
        r#"
<script>
(function () {
  var print = function () { window.print(); };
  if (window.MathJax && window.MathJax.typesetPromise) {
    window.MathJax.typesetPromise().then(print, function (err) {
      console.warn("typesetting failed", err);
      print();
    });
  } else {
    window.addEventListener("load", print);
  }
})();
</script>
</body>
</html>
"#,
    );
    document
}

/// Export `document` through `target`.
///
/// Preconditions: the content must not be blank and the document must have
/// been saved at least once; on failure nothing is materialized or opened.
/// The materialized resource is released after [`RELEASE_DELAY`] even when
/// opening was blocked, so a blocked popup cannot leak it.
pub async fn export_document(
    document: &Document,
    target: Arc<dyn ExportTarget>,
) -> Result<(), ExportError> {
    if document.content.trim().is_empty() {
        return Err(ExportError::EmptyContent);
    }
    if !document.is_saved() {
        return Err(ExportError::NeverSaved);
    }

    let printable = build_print_document(&document.title, &document.content);
    let handle = target.materialize(&printable)?;
    let opened = target.open(&handle);
    if let Err(ref err) = opened {
        tracing::warn!(error = %err, uri = handle.uri(), "export context could not be opened");
    }

    tokio::spawn(async move {
        tokio::time::sleep(RELEASE_DELAY).await;
        target.release(handle);
    });

    opened
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTarget {
        block_open: bool,
        materialized: Mutex<Vec<String>>,
        opened: Mutex<Vec<String>>,
        released: Mutex<Vec<String>>,
    }

    impl RecordingTarget {
        fn blocked() -> Self {
            Self {
                block_open: true,
                ..Default::default()
            }
        }
    }

    impl ExportTarget for RecordingTarget {
        fn materialize(&self, document: &str) -> Result<ExportHandle, ExportError> {
            let uri = format!("mem:{}", self.materialized.lock().unwrap().len());
            self.materialized.lock().unwrap().push(document.to_string());
            Ok(ExportHandle::new(uri))
        }

        fn open(&self, handle: &ExportHandle) -> Result<(), ExportError> {
            if self.block_open {
                return Err(ExportError::OpenBlocked);
            }
            self.opened.lock().unwrap().push(handle.uri().to_string());
            Ok(())
        }

        fn release(&self, handle: ExportHandle) {
            self.released.lock().unwrap().push(handle.uri().to_string());
        }
    }

    fn saved_document(content: &str) -> Document {
        Document {
            title: "Report".into(),
            content: content.into(),
            saved_at: Some("2024-01-01 10:00".into()),
        }
    }

    #[test]
    fn test_print_document_contents() {
        let printable = build_print_document("Q3 Report", "## Findings\n$x^2$");
        assert!(printable.contains("<title>Q3 Report</title>"));
        assert!(printable.contains("## Findings\n$x^2$"));
        assert!(printable.contains("@page"));
        assert!(printable.contains("print-trigger"));
        // Print only fires after typesetting finished.
        assert!(printable.contains("typesetPromise().then(print"));
    }

    #[test]
    fn test_print_document_is_pure() {
        assert_eq!(
            build_print_document("T", "body"),
            build_print_document("T", "body")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_content_refused_before_any_resource() {
        let target = Arc::new(RecordingTarget::default());
        let document = saved_document("   \n\t ");

        let result = export_document(&document, target.clone()).await;
        assert_eq!(result, Err(ExportError::EmptyContent));
        assert!(target.materialized.lock().unwrap().is_empty());
        assert!(target.opened.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsaved_document_refused() {
        let target = Arc::new(RecordingTarget::default());
        let document = Document::untitled("content");

        let result = export_document(&document, target.clone()).await;
        assert_eq!(result, Err(ExportError::NeverSaved));
        assert!(target.materialized.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_export_releases_after_delay() {
        let target = Arc::new(RecordingTarget::default());
        let document = saved_document("## Findings");

        export_document(&document, target.clone()).await.unwrap();
        assert_eq!(target.materialized.lock().unwrap().len(), 1);
        assert_eq!(target.opened.lock().unwrap().len(), 1);
        // Not yet released; the new context is still loading it.
        assert!(target.released.lock().unwrap().is_empty());

        tokio::time::sleep(RELEASE_DELAY + Duration::from_millis(1)).await;
        assert_eq!(target.released.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_open_still_releases_resource() {
        let target = Arc::new(RecordingTarget::blocked());
        let document = saved_document("content");

        let result = export_document(&document, target.clone()).await;
        assert_eq!(result, Err(ExportError::OpenBlocked));

        tokio::time::sleep(RELEASE_DELAY + Duration::from_millis(1)).await;
        assert_eq!(target.released.lock().unwrap().len(), 1);
    }
}
