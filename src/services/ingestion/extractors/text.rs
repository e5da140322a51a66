//! Text fallback extraction.
//!
//! Used when no table survives the pipeline: per-page PDF text via
//! `pdf-extract`, or a best-effort UTF-8 decode for non-PDF bodies.
//! Both paths guarantee non-empty output so clients always receive at
//! least one document.

#![allow(dead_code)]

use tracing::warn;

/// Page separator in the concatenated fallback text.
const PAGE_SEP: &str = "\n\n---\n\n";

/// Extracts per-page PDF text, capped at `max_pages` pages.
///
/// Pages with no extractable text are skipped. Returns an empty string
/// when nothing is extractable (scanned or image-only documents); the
/// caller substitutes an explanatory message.
pub fn extract_pdf_text(data: &[u8], max_pages: usize) -> String {
    let pages = match pdf_extract::extract_text_from_mem_by_pages(data) {
        Ok(pages) => pages,
        Err(err) => {
            warn!("text fallback extraction failed: {}", err);
            return String::new();
        }
    };

    let parts: Vec<String> = pages
        .iter()
        .take(max_pages)
        .enumerate()
        .filter_map(|(i, text)| {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(format!("## page {}\n\n{}\n", i + 1, text))
            }
        })
        .collect();

    parts.join(PAGE_SEP).trim().to_string()
}

/// Message emitted for PDFs with no extractable text at all.
pub fn ocr_needed_message(filename: &str) -> String {
    format!(
        "{}\n\n(No tables detected and text extraction is empty. \
         This PDF may be scanned; OCR may be required.)",
        filename
    )
}

/// Best-effort text for a non-PDF body: lossy UTF-8 decode, trimmed.
pub fn decode_basic_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).trim().to_string()
}

/// Message emitted for non-PDF bodies that decode to nothing.
pub fn unhandled_format_message(filename: &str) -> String {
    format!("{}\n\n(Non-PDF format not handled; empty text.)", filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tolerates_garbage() {
        assert_eq!(extract_pdf_text(b"not a pdf", 10), "");
    }

    #[test]
    fn test_decode_basic_text() {
        assert_eq!(decode_basic_text(b"  hello world \n"), "hello world");
        assert_eq!(decode_basic_text(b""), "");
        // Invalid UTF-8 degrades to replacement chars instead of failing.
        let decoded = decode_basic_text(&[0x68, 0x69, 0xFF, 0xFE]);
        assert!(decoded.starts_with("hi"));
    }

    #[test]
    fn test_messages_name_the_file() {
        assert!(ocr_needed_message("scan.pdf").starts_with("scan.pdf"));
        assert!(ocr_needed_message("scan.pdf").contains("OCR"));
        assert!(unhandled_format_message("blob.bin").starts_with("blob.bin"));
    }
}
