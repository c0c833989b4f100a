//! Text source adapter: turns an uploaded PDF or pasted text into [`DocumentText`].
//!
//! PDF payloads are parsed page by page with lopdf; page texts are joined with
//! a single newline and the result is trimmed. Pasted text is kept verbatim.
//! The binary payload is dropped once the text has been produced.

use lopdf::Document;
use tracing::{debug, error, info, warn};

use crate::error::ExtractionError;

/// Full text of the act, as extracted or pasted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText(String);

impl DocumentText {
    pub fn new(text: impl Into<String>) -> Self {
        DocumentText(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The first `max_chars` characters. Never splits a character.
    pub fn truncated(&self, max_chars: usize) -> &str {
        match self.0.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// The first `max_chars` characters, with a marker when text was cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let head = self.truncated(max_chars);
        if head.len() < self.0.len() {
            format!("{head}…")
        } else {
            head.to_string()
        }
    }
}

/// Where the document text comes from.
#[derive(Debug, Clone)]
pub enum TextSource {
    /// Raw bytes of an uploaded PDF.
    Pdf(Vec<u8>),
    /// Text pasted by the user.
    Pasted(String),
}

/// Produce document text from a source.
pub fn extract(source: TextSource) -> Result<DocumentText, ExtractionError> {
    match source {
        TextSource::Pdf(bytes) => extract_pdf_text(&bytes),
        TextSource::Pasted(text) => {
            if text.trim().is_empty() {
                warn!("[EXTRACT] Pasted text is empty");
                return Err(ExtractionError::NoInput);
            }
            info!(chars = text.chars().count(), "[EXTRACT] Loaded pasted text");
            Ok(DocumentText(text))
        }
    }
}

/// Parse a PDF payload page by page and join the page texts.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<DocumentText, ExtractionError> {
    if bytes.is_empty() {
        warn!("[EXTRACT] Empty PDF payload");
        return Err(ExtractionError::NoInput);
    }
    if !bytes.starts_with(b"%PDF") {
        error!(size = bytes.len(), "[EXTRACT] Payload has no %PDF header");
        return Err(ExtractionError::Malformed("missing %PDF header".to_string()));
    }

    let doc = Document::load_mem(bytes).map_err(|e| {
        error!(error = %e, "[EXTRACT] Failed to load PDF");
        ExtractionError::Malformed(e.to_string())
    })?;

    let pages = doc.get_pages();
    info!(page_count = pages.len(), "[EXTRACT] Loaded PDF");

    let mut page_texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        let text = doc.extract_text(&[*page_number]).map_err(|e| {
            error!(page = page_number, error = %e, "[EXTRACT] Failed to extract page text");
            ExtractionError::Malformed(format!("page {page_number}: {e}"))
        })?;
        debug!(page = page_number, chars = text.len(), "[EXTRACT] Extracted page");
        page_texts.push(text.trim_end().to_string());
    }

    let joined = page_texts.join("\n");
    let text = joined.trim();
    if text.is_empty() {
        warn!(page_count = pages.len(), "[EXTRACT] PDF has no extractable text");
        return Err(ExtractionError::NoText);
    }

    info!(chars = text.chars().count(), "[EXTRACT] Extracted text from PDF");
    Ok(DocumentText(text.to_string()))
}
