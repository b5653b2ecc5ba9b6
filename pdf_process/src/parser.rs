use std::path::Path;

use lopdf::Document;

use crate::error::{PdfProcessError, Result};
use crate::model::{ExtractedDocument, Page};

pub(crate) fn parse_from_path(path: &Path) -> Result<ExtractedDocument> {
    let bytes = std::fs::read(path)?;
    parse_from_bytes(&bytes)
}

pub(crate) fn parse_from_bytes(bytes: &[u8]) -> Result<ExtractedDocument> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfProcessError::Parse(e.to_string()))?;
    Ok(parse_document(&doc))
}

fn parse_document(doc: &Document) -> ExtractedDocument {
    let page_map = doc.get_pages();
    let mut page_numbers: Vec<u32> = page_map.keys().copied().collect();
    page_numbers.sort_unstable();

    let pages = page_numbers
        .iter()
        .enumerate()
        .map(|(idx, page_number)| match doc.extract_text(&[*page_number]) {
            Ok(raw) => Page {
                index: idx + 1,
                text: normalize_text(&raw),
                degraded: false,
            },
            Err(err) => {
                tracing::warn!(page = *page_number, error = %err, "page text unreadable, using empty text");
                Page {
                    index: idx + 1,
                    text: String::new(),
                    degraded: true,
                }
            }
        })
        .collect();

    ExtractedDocument { pages }
}

pub(crate) fn normalize_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
