// PDF text extraction backed by `lopdf`.
//
// Extraction never fails the batch: a corrupt file, an encrypted file that
// won't open with the empty password, or a parser panic all produce an empty
// string and a warning. Pages that yield no text contribute nothing.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;
use tracing::{debug, warn};

/// Pulls raw text out of a single PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    /// Read and extract a PDF from disk.
    pub fn extract_file(&self, path: &Path) -> String {
        match std::fs::read(path) {
            Ok(bytes) => self.extract_bytes(&bytes, &path.display().to_string()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read PDF, skipping");
                String::new()
            }
        }
    }

    /// Extract text from in-memory PDF bytes. `label` only appears in logs.
    pub fn extract_bytes(&self, bytes: &[u8], label: &str) -> String {
        match panic::catch_unwind(AssertUnwindSafe(|| extract_pages(bytes, label))) {
            Ok(text) => text,
            Err(_) => {
                warn!(file = label, "PDF parser panicked, skipping");
                String::new()
            }
        }
    }
}

fn extract_pages(bytes: &[u8], label: &str) -> String {
    let mut document = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(file = label, error = %e, "Error processing PDF");
            return String::new();
        }
    };

    if document.is_encrypted() {
        if let Err(e) = document.decrypt("") {
            warn!(file = label, error = %e, "Skipping encrypted PDF");
            return String::new();
        }
    }

    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    let mut page_texts = Vec::with_capacity(page_numbers.len());

    for page_number in page_numbers {
        match document.extract_text(&[page_number]) {
            Ok(text) => page_texts.push(text),
            Err(e) => {
                debug!(file = label, page = page_number, error = %e, "Page yielded no text");
            }
        }
    }

    page_texts.join(" ")
}
