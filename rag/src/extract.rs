//! Raw upload bytes to plain text.

use std::path::Path;

use quarry_pdf_process::PdfProcessor;
use tracing::{debug, warn};

use crate::error::Result;

/// Returns `true` if `filename` has a `.pdf` extension, ignoring case.
#[must_use]
pub fn is_pdf(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Extracts the text of an uploaded file.
///
/// PDFs are decoded page by page and joined with newlines; a page that fails to decode
/// contributes empty text. Every other file is read as UTF-8, falling back to Latin-1.
///
/// # Errors
/// Returns [`RagError::Extraction`](crate::RagError::Extraction) if a `.pdf` upload is
/// not a readable PDF container.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String> {
    if is_pdf(filename) {
        let document = PdfProcessor::from_bytes(bytes).extract()?;
        debug!(
            filename,
            pages = document.page_count(),
            degraded = document.degraded_pages(),
            "extracted pdf"
        );
        return Ok(document.text());
    }
    Ok(decode_text(bytes, filename))
}

/// Decodes bytes as UTF-8, or as Latin-1 when they are not valid UTF-8.
///
/// Latin-1 maps every byte to the code point of the same value, so this never fails.
#[must_use]
pub fn decode_text(bytes: &[u8], filename: &str) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(err) => {
            warn!(filename, error = %err, "upload is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RagError;

    #[test]
    fn detects_pdf_extension_case_insensitively() {
        assert!(is_pdf("report.pdf"));
        assert!(is_pdf("REPORT.PDF"));
        assert!(is_pdf("archive.tar.Pdf"));
        assert!(!is_pdf("notes.txt"));
        assert!(!is_pdf("pdf"));
        assert!(!is_pdf(""));
    }

    #[test]
    fn utf8_text_passes_through() {
        let text = extract_text("naïve café".as_bytes(), "notes.txt").unwrap();
        assert_eq!(text, "naïve café");
    }

    #[test]
    fn invalid_utf8_falls_back_to_latin1() {
        let bytes = [b'c', b'a', b'f', 0xE9, b' ', 0xFF];
        let text = extract_text(&bytes, "legacy.txt").unwrap();
        assert_eq!(text, "caf\u{e9} \u{ff}");
    }

    #[test]
    fn unreadable_pdf_is_an_extraction_error() {
        let result = extract_text(b"definitely not a pdf", "broken.PDF");
        assert!(matches!(result, Err(RagError::Extraction(_))));
    }

    #[test]
    fn pdf_bytes_with_text_name_are_decoded_as_text() {
        let text = extract_text(b"%PDF-1.5 but named as text", "file.md").unwrap();
        assert!(text.starts_with("%PDF"));
    }
}
