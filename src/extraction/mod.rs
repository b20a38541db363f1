//! PDF text extraction.
//!
//! Produces page-tagged plain text: every page with extractable text becomes a
//! `[Page N]` marker line followed by the page text, and pages are joined by a
//! newline. Pages without text (for example scans with no OCR layer) are left out.


use itertools::Itertools;
use lopdf::Document;
use tracing::{debug, warn};

use crate::{RagError, Result};

/// Text of a single page, numbered from 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

/// Page-tagged text extracted from one PDF
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedText {
    pages: Vec<PageText>,
    page_count: usize,
}

impl ExtractedText {
    /// Pages that produced text, in document order
    #[inline]
    pub fn pages(&self) -> &[PageText] {
        &self.pages
    }

    /// Number of pages in the PDF, including those without text
    #[inline]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// The combined, page-tagged text
    #[inline]
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|page| format!("[Page {}]\n{}", page.number, page.text))
            .join("\n")
    }
}

/// Extract page-tagged text from an in-memory PDF.
///
/// Fails with [`RagError::Extraction`] only when the bytes are not a readable
/// PDF. A page whose text cannot be decoded (for example a font without a
/// usable encoding) is treated like a page without text.
#[inline]
pub fn extract_pdf_text(bytes: &[u8]) -> Result<ExtractedText> {
    let document = Document::load_mem(bytes)
        .map_err(|e| RagError::Extraction(format!("Failed to read PDF: {}", e)))?;

    let page_numbers: Vec<u32> = document.get_pages().into_keys().collect();
    let page_count = page_numbers.len();

    let mut pages = Vec::with_capacity(page_count);
    for number in page_numbers {
        let text = match document.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping page {}: failed to decode text: {}", number, e);
                continue;
            }
        };

        if text.trim().is_empty() {
            debug!("Page {} has no extractable text", number);
            continue;
        }

        pages.push(PageText { number, text });
    }

    if pages.is_empty() && page_count > 0 {
        warn!(
            "No extractable text in {} page(s); the PDF may be a scan without OCR",
            page_count
        );
    }

    debug!(
        "Extracted text from {}/{} pages ({} chars)",
        pages.len(),
        page_count,
        pages.iter().map(|p| p.text.chars().count()).sum::<usize>()
    );

    Ok(ExtractedText { pages, page_count })
}
