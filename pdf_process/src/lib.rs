//! Page-ordered PDF text extraction.
//!
//! This crate turns a PDF into plain text for retrieval ingestion. Each page is decoded
//! independently; a page whose content stream cannot be decoded contributes empty text
//! instead of failing the whole document. Only a file that is not a readable PDF
//! container at all is an error.

mod error;
mod model;
mod parser;

pub use error::{PdfProcessError, Result};
pub use model::{ExtractedDocument, Page};

use std::path::{Path, PathBuf};

/// PDF processor entrypoint.
#[derive(Debug, Clone)]
pub struct PdfProcessor {
    source: PdfSource,
}

#[derive(Debug, Clone)]
enum PdfSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl PdfProcessor {
    /// Build a processor from a PDF file path.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: PdfSource::Path(path.into()),
        }
    }

    /// Build a processor from PDF bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: PdfSource::Bytes(bytes.into()),
        }
    }

    /// Extracts every page in document order.
    pub fn extract(&self) -> Result<ExtractedDocument> {
        match &self.source {
            PdfSource::Path(path) => parser::parse_from_path(path),
            PdfSource::Bytes(bytes) => parser::parse_from_bytes(bytes),
        }
    }

    /// Extracts the whole document as one newline-joined string.
    pub fn text(&self) -> Result<String> {
        self.extract().map(|doc| doc.text())
    }

    /// Returns source path if available.
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        match &self.source {
            PdfSource::Path(path) => Some(path.as_path()),
            PdfSource::Bytes(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    fn text_content(text: &str) -> Vec<u8> {
        Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        }
        .encode()
        .unwrap()
    }

    fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
        build_pdf_from_contents(page_texts.iter().copied().map(text_content).collect())
    }

    fn build_pdf_from_contents(contents: Vec<Vec<u8>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for content in contents {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = i64::try_from(kids.len()).unwrap();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn invalid_pdf_errors() {
        let processor = PdfProcessor::from_bytes(b"not-a-pdf".to_vec());
        assert!(matches!(
            processor.extract(),
            Err(PdfProcessError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let processor = PdfProcessor::from_path("/definitely/not/here.pdf");
        assert!(matches!(processor.extract(), Err(PdfProcessError::Io(_))));
        assert!(processor.source_path().is_some());
    }

    #[test]
    fn pages_come_back_in_document_order() {
        let bytes = build_pdf(&["First", "Second"]);
        let doc = PdfProcessor::from_bytes(bytes).extract().unwrap();

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.degraded_pages(), 0);
        assert_eq!(doc.pages[0].index, 1);
        assert!(doc.pages[0].text.contains("First"));
        assert!(doc.pages[1].text.contains("Second"));

        let text = doc.text();
        let first = text.find("First").unwrap();
        let second = text.find("Second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn unreadable_page_is_degraded_and_keeps_its_place() {
        // `Tf` without operands makes text extraction fail for that page only.
        let bytes = build_pdf_from_contents(vec![
            text_content("First"),
            b"BT Tf ET".to_vec(),
            text_content("Third"),
        ]);
        let doc = PdfProcessor::from_bytes(bytes).extract().unwrap();

        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.degraded_pages(), 1);
        assert!(!doc.pages[0].degraded);
        assert!(doc.pages[1].degraded);
        assert_eq!(doc.pages[1].index, 2);
        assert!(doc.pages[1].text.is_empty());
        assert!(doc.pages[2].text.contains("Third"));

        let text = doc.text();
        let first = text.find("First").unwrap();
        let third = text.find("Third").unwrap();
        assert!(text[first..third].contains("\n\n"));
    }

    #[test]
    fn empty_pages_still_join_with_newlines() {
        let doc = ExtractedDocument {
            pages: vec![
                Page {
                    index: 1,
                    text: "a".into(),
                    degraded: false,
                },
                Page {
                    index: 2,
                    text: String::new(),
                    degraded: true,
                },
                Page {
                    index: 3,
                    text: "c".into(),
                    degraded: false,
                },
            ],
        };
        assert_eq!(doc.text(), "a\n\nc");
        assert_eq!(doc.degraded_pages(), 1);
    }
}
