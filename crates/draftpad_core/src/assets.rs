//! Embedded stylesheets and pinned script library versions.
//!
//! Everything injected into a built document lives here as a constant, so a
//! render is a pure function of its inputs: identical `(source, zoom)` pairs
//! produce byte-identical documents.

/// CSS reset and baseline stylesheet for the live preview. Independent of
/// the document content.
pub const PREVIEW_CSS: &str = include_str!("../assets/preview.css");

/// Page-size, margin and color-fidelity directives for the printable export.
pub const PRINT_CSS: &str = include_str!("../assets/print.css");

/// Pinned version of the chart rendering library.
pub const CHART_JS_VERSION: &str = "4.4.1";

/// Pinned version of the diagram/graph rendering library.
pub const MERMAID_VERSION: &str = "10.9.1";

/// Pinned version of the general-purpose utility library.
pub const LODASH_VERSION: &str = "4.17.21";

/// Pinned version of the math typesetting engine.
pub const MATHJAX_VERSION: &str = "3.2.2";

/// The script/style dependency set declared once per built document.
pub fn dependency_tags() -> String {
    format!(
        r#"<script src="https://cdn.jsdelivr.net/npm/chart.js@{CHART_JS_VERSION}/dist/chart.umd.min.js"></script>
<script src="https://cdn.jsdelivr.net/npm/mermaid@{MERMAID_VERSION}/dist/mermaid.min.js"></script>
<script src="https://cdn.jsdelivr.net/npm/lodash@{LODASH_VERSION}/lodash.min.js"></script>
<script src="https://cdn.jsdelivr.net/npm/mathjax@{MATHJAX_VERSION}/es5/tex-mml-chtml.js"></script>"#
    )
}

/// Trailing typesetting trigger. A guarded no-op when the math engine never
/// loaded; it must not throw either way.
pub const TYPESET_TRIGGER_JS: &str = r#"if (window.MathJax && window.MathJax.typesetPromise) {
  window.MathJax.typesetPromise().catch(function (err) {
    console.warn("typesetting failed", err);
  });
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheets_exist() {
        assert!(PREVIEW_CSS.contains("blockquote"));
        assert!(PREVIEW_CSS.contains("max-width: 100%"));
        assert!(PRINT_CSS.contains("@page"));
        assert!(PRINT_CSS.contains("print-color-adjust"));
    }

    #[test]
    fn test_dependency_tags_are_pinned() {
        let tags = dependency_tags();
        assert!(tags.contains(CHART_JS_VERSION));
        assert!(tags.contains(MERMAID_VERSION));
        assert!(tags.contains(LODASH_VERSION));
        assert!(tags.contains(MATHJAX_VERSION));
        // Deterministic output
        assert_eq!(tags, dependency_tags());
    }

    #[test]
    fn test_typeset_trigger_is_guarded() {
        assert!(TYPESET_TRIGGER_JS.contains("window.MathJax &&"));
        assert!(TYPESET_TRIGGER_JS.contains("catch"));
    }
}
