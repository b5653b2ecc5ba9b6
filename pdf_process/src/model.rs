/// Text recovered from one PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page position in document order.
    pub index: usize,
    /// Extracted text with blank lines removed and each line trimmed.
    pub text: String,
    /// Set when the page's content stream could not be decoded and `text` is empty
    /// for that reason rather than because the page has no text.
    pub degraded: bool,
}

/// All pages of a PDF in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Pages sorted by page number.
    pub pages: Vec<Page>,
}

impl ExtractedDocument {
    /// Number of pages in the document.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of pages that degraded to empty text.
    #[must_use]
    pub fn degraded_pages(&self) -> usize {
        self.pages.iter().filter(|page| page.degraded).count()
    }

    /// Concatenates every page's text, joined by a newline.
    ///
    /// Pages without text contribute an empty string, so the number of separators
    /// always equals `page_count() - 1`.
    #[must_use]
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
