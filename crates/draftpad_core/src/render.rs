//! Full preview document assembly.
//!
//! Rendering is a pure function of `(source, zoom)`; nothing else feeds it.
//! The sandbox rebuilds its document from this output on every change, so the
//! output must be complete and self-contained: dependency set, stylesheet,
//! zoom transform, the source injected verbatim, and the typeset trigger.

use crate::assets;

/// Message shown when there is nothing to render yet.
pub const EMPTY_PLACEHOLDER: &str =
    r#"<p class="placeholder">Nothing to preview yet. Start typing in the editor.</p>"#;

/// Everything that determines a render. Same request, same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub source: String,
    pub zoom: u16,
}

impl RenderRequest {
    pub fn build(&self) -> String {
        build_preview_document(&self.source, self.zoom)
    }
}

/// Assemble the complete preview document for `source` at `zoom` percent.
///
/// The body is scaled by `zoom / 100` with a compensating width and height,
/// so a zoom of 150 makes content 1.5x larger without clipping. The source
/// goes into the body verbatim; it is never escaped, truncated or reordered.
pub fn build_preview_document(source: &str, zoom: u16) -> String {
    let scale = f64::from(zoom) / 100.0;
    // Shrink the layout box by the inverse factor before scaling it back up.
    let inverse_percent = 10_000.0 / f64::from(zoom);
    let body = if source.is_empty() {
        EMPTY_PLACEHOLDER
    } else {
        source
    };

    let mut document = String::with_capacity(body.len() + assets::PREVIEW_CSS.len() + 1024);
    document.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    document.push_str(&assets::dependency_tags());
    document.push_str("\n<style>\n");
    document.push_str(assets::PREVIEW_CSS);
    document.push_str("</style>\n<style>\n");
    document.push_str(&format!(
        "body {{ transform: scale({scale}); transform-origin: 0 0; \
         width: {inverse_percent:.4}%; min-height: {inverse_percent:.4}%; }}\n"
    ));
    document.push_str("</style>\n</head>\n<body>\n");
    document.push_str(body);
    document.push_str("\n<script>\n");
    document.push_str(assets::TYPESET_TRIGGER_JS);
    document.push_str("\n</script>\n</body>\n</html>\n");
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_appears_verbatim() {
        let source = "# Title\n\n<table><tr><td>1 < 2 & 3</td></tr></table>";
        let document = build_preview_document(source, 100);
        assert!(document.contains(source));
    }

    #[test]
    fn test_zoom_affects_output() {
        let a = build_preview_document("hello", 100);
        let b = build_preview_document("hello", 150);
        assert_ne!(a, b);
        assert!(b.contains("scale(1.5)"));
        assert!(b.contains("66.6667%"));
    }

    #[test]
    fn test_idempotent() {
        let a = build_preview_document("hello $x^2$", 120);
        let b = build_preview_document("hello $x^2$", 120);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_source_gets_placeholder() {
        let document = build_preview_document("", 100);
        assert!(document.contains(EMPTY_PLACEHOLDER));
    }

    #[test]
    fn test_document_is_self_contained() {
        let document = build_preview_document("x", 100);
        assert!(document.starts_with("<!DOCTYPE html>"));
        assert!(document.contains("chart.js"));
        assert!(document.contains("mermaid"));
        assert!(document.contains("lodash"));
        assert!(document.contains("mathjax"));
        assert!(document.contains(assets::PREVIEW_CSS));
        assert!(document.contains("typesetPromise"));
        assert!(document.ends_with("</html>\n"));
    }

    #[test]
    fn test_dependency_set_declared_once() {
        let document = build_preview_document("x", 100);
        assert_eq!(document.matches("tex-mml-chtml.js").count(), 1);
    }

    #[test]
    fn test_render_request_matches_free_function() {
        let request = RenderRequest {
            source: "abc".into(),
            zoom: 90,
        };
        assert_eq!(request.build(), build_preview_document("abc", 90));
    }
}
