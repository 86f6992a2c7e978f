//! Document formatting. The formatting logic itself is external; this
//! module defines the seam and turns a formatter's output into LSP edits.

use tower_lsp_server::ls_types::TextEdit;

use crate::document::Document;

/// The external-formatter seam. `format` returns the fully formatted text,
/// or `None` when it has no changes to offer.
pub trait Formatter: Send + Sync {
    fn format(&self, text: &str) -> Option<String>;
}

/// The bundled formatter: never proposes edits.
#[derive(Debug, Default)]
pub struct PassthroughFormatter;

impl Formatter for PassthroughFormatter {
    fn format(&self, _text: &str) -> Option<String> {
        None
    }
}

/// Run a formatter over a document and express the result as a single
/// whole-document edit, or no edits when nothing changed.
pub fn format_edits(document: &Document, formatter: &dyn Formatter) -> Vec<TextEdit> {
    match formatter.format(document.borrow_text()) {
        Some(formatted) if formatted != document.borrow_text() => vec![TextEdit {
            range: document.full_range(),
            new_text: formatted,
        }],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TrailingNewlineFormatter;
    impl Formatter for TrailingNewlineFormatter {
        fn format(&self, text: &str) -> Option<String> {
            if text.ends_with('\n') {
                None
            } else {
                Some(format!("{text}\n"))
            }
        }
    }

    #[test]
    fn passthrough_offers_no_edits() {
        let document = Document::new("structure Foo {}");
        assert!(format_edits(&document, &PassthroughFormatter).is_empty());
    }

    #[test]
    fn changed_output_becomes_full_document_edit() {
        let document = Document::new("structure Foo {}");
        let edits = format_edits(&document, &TrailingNewlineFormatter);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, "structure Foo {}\n");
        assert_eq!(edits[0].range, document.full_range());
    }

    #[test]
    fn unchanged_output_is_no_edits() {
        let document = Document::new("structure Foo {}\n");
        assert!(format_edits(&document, &TrailingNewlineFormatter).is_empty());
    }
}
