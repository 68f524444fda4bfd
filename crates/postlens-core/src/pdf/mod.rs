//! PDF text-layer extraction.

mod extractor;

pub use extractor::{LopdfBackend, LopdfDocument};

use crate::error::PdfError;
use crate::models::ExtractionProgress;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// One string fragment of a page's text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextItem {
    pub text: String,
}

impl TextItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A PDF reader that opens documents from memory.
pub trait PdfBackend {
    /// Open document handle. Dropped when extraction of the file ends.
    type Document: PdfDocument;

    /// Parse a document from its bytes.
    fn open(&self, data: &[u8]) -> Result<Self::Document>;
}

/// An opened PDF document.
pub trait PdfDocument {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Text items of a page, in content order. Pages are 1-indexed.
    fn text_content(&self, page: u32) -> Result<Vec<TextItem>>;
}

/// Read every page of `document` and build the combined text.
///
/// Each page contributes a newline followed by its items joined with a
/// single space, so the result for pages `[A B]`, `[C]` is `"\nA B\nC"`.
/// When `on_page` is given it receives the progress after each page; 100%
/// is only reported once the last page has been read.
pub fn read_all_pages<D: PdfDocument>(
    document: &D,
    mut on_page: Option<&mut dyn FnMut(ExtractionProgress)>,
) -> Result<String> {
    let page_count = document.page_count();
    let mut text = String::new();

    for page in 1..=page_count {
        let items = document.text_content(page)?;
        let joined = items
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        text.push('\n');
        text.push_str(&joined);

        if let Some(report) = on_page.as_deref_mut() {
            report(ExtractionProgress::from_steps(page, page_count));
        }
    }

    Ok(text)
}


#[cfg(test)]
mod tests {
    use super::fake::FakeDocument;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pages_joined_in_order() {
        let doc = FakeDocument {
            pages: vec![vec!["A", "B"], vec!["C"], vec!["D", "E"]],
        };
        let text = read_all_pages(&doc, None).unwrap();
        assert_eq!(text, "\nA B\nC\nD E");
    }

    #[test]
    fn test_empty_page_still_separated() {
        let doc = FakeDocument {
            pages: vec![vec!["A"], vec![], vec!["B"]],
        };
        assert_eq!(read_all_pages(&doc, None).unwrap(), "\nA\n\nB");
    }

    #[test]
    fn test_no_pages() {
        let doc = FakeDocument { pages: vec![] };
        assert_eq!(read_all_pages(&doc, None).unwrap(), "");
    }

    #[test]
    fn test_page_progress_is_monotonic_and_ends_at_100() {
        let doc = FakeDocument {
            pages: vec![vec!["A"], vec!["B"], vec!["C"]],
        };
        let mut seen = Vec::new();
        let mut record = |p: ExtractionProgress| seen.push(p.percent());
        read_all_pages(&doc, Some(&mut record)).unwrap();

        assert_eq!(seen, vec![33, 67, 100]);
    }
}
