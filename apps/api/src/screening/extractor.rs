//! Document Text Extractor — turns an uploaded resume or job description into plain text.
//!
//! Extraction never fails the caller: faults are logged and yield an empty string,
//! which callers treat as "no text available".

use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use tracing::{error, warn};

/// An uploaded file, fully read into memory.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub bytes: Bytes,
}

impl Document {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lower-cased extension after the last dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// Dispatches on the declared extension: `txt` is decoded as UTF-8, `pdf` is
/// extracted page by page. Anything else yields an empty string.
pub fn extract_text(document: &Document) -> String {
    match document.extension().as_deref() {
        Some("txt") => extract_plain_text(document),
        Some("pdf") => extract_pdf_text(document),
        Some(other) => {
            warn!("Unsupported file type: {other} ({})", document.file_name);
            String::new()
        }
        None => {
            warn!("Unsupported file type: no extension ({})", document.file_name);
            String::new()
        }
    }
}

fn extract_plain_text(document: &Document) -> String {
    match std::str::from_utf8(&document.bytes) {
        Ok(text) => text.trim_start_matches('\u{feff}').to_string(),
        Err(e) => {
            error!("Error extracting text from TXT '{}': {e}", document.file_name);
            String::new()
        }
    }
}

/// Concatenates page text in page order. Pages with no extractable text
/// (scans, images) are skipped. The PDF parser can panic on malformed input,
/// so the call is isolated with `catch_unwind`.
fn extract_pdf_text(document: &Document) -> String {
    let bytes = document.bytes.as_ref();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match outcome {
        Ok(Ok(pages)) => pages
            .iter()
            .filter(|page| !page.trim().is_empty())
            .map(String::as_str)
            .collect::<String>()
            .trim()
            .to_string(),
        Ok(Err(e)) => {
            error!("Error extracting text from PDF '{}': {e}", document.file_name);
            String::new()
        }
        Err(_) => {
            error!(
                "Error extracting text from PDF '{}': parser panicked",
                document.file_name
            );
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_is_decoded() {
        let doc = Document::new("resume.txt", "5 years Python, 2 years Go");
        assert_eq!(extract_text(&doc), "5 years Python, 2 years Go");
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let doc = Document::new("RESUME.TXT", "Rust");
        assert_eq!(doc.extension().as_deref(), Some("txt"));
        assert_eq!(extract_text(&doc), "Rust");
    }

    #[test]
    fn test_utf8_bom_is_dropped() {
        let doc = Document::new("resume.txt", "\u{feff}Kafka".as_bytes().to_vec());
        assert_eq!(extract_text(&doc), "Kafka");
    }

    #[test]
    fn test_invalid_utf8_yields_empty_text() {
        let doc = Document::new("resume.txt", vec![0xff, 0xfe, 0xfd]);
        assert_eq!(extract_text(&doc), "");
    }

    #[test]
    fn test_unsupported_extension_yields_empty_text() {
        let doc = Document::new("resume.docx", "PK\x03\x04");
        assert_eq!(extract_text(&doc), "");
    }

    #[test]
    fn test_missing_extension_yields_empty_text() {
        let doc = Document::new("resume", "plain words");
        assert!(doc.extension().is_none());
        assert_eq!(extract_text(&doc), "");
    }

    #[test]
    fn test_corrupt_pdf_yields_empty_text() {
        let doc = Document::new("resume.pdf", "this is not a pdf at all");
        assert_eq!(extract_text(&doc), "");
    }
}
