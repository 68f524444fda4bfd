//! PDF text extraction using lopdf.

use std::collections::BTreeMap;

use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{PdfBackend, PdfDocument, Result, TextItem};
use crate::error::PdfError;

/// PDF backend built on lopdf.
#[derive(Debug, Clone)]
pub struct LopdfBackend {
    decrypt_empty_password: bool,
}

impl LopdfBackend {
    /// Create a new backend.
    pub fn new() -> Self {
        Self {
            decrypt_empty_password: true,
        }
    }

    /// Set whether encrypted documents are retried with an empty password.
    pub fn with_empty_password_decryption(mut self, enabled: bool) -> Self {
        self.decrypt_empty_password = enabled;
        self
    }
}

impl Default for LopdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// A document opened by [`LopdfBackend`].
pub struct LopdfDocument {
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfBackend for LopdfBackend {
    type Document = LopdfDocument;

    fn open(&self, data: &[u8]) -> Result<LopdfDocument> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if document.is_encrypted() {
            if !self.decrypt_empty_password || document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        let pages = document.get_pages();
        debug!("Opened PDF with {} pages", pages.len());

        Ok(LopdfDocument { document, pages })
    }
}

impl PdfDocument for LopdfDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// One item per string shown on the page: each `Tj`, `'` and `"` operand
    /// and each `TJ` array, decoded with the font selected by `Tf`.
    fn text_content(&self, page: u32) -> Result<Vec<TextItem>> {
        let page_id = *self.pages.get(&page).ok_or(PdfError::InvalidPage(page))?;
        let extraction_error = |e: lopdf::Error| PdfError::TextExtraction {
            page,
            reason: e.to_string(),
        };

        let fonts = self
            .document
            .get_page_fonts(page_id)
            .map_err(extraction_error)?;
        let encodings: BTreeMap<Vec<u8>, Encoding> = fonts
            .into_iter()
            .filter_map(|(name, font)| match font.get_font_encoding(&self.document) {
                Ok(encoding) => Some((name, encoding)),
                Err(e) => {
                    warn!(
                        "Page {}: no encoding for font {}: {}",
                        page,
                        String::from_utf8_lossy(&name),
                        e
                    );
                    None
                }
            })
            .collect();

        let content = self
            .document
            .get_and_decode_page_content(page_id)
            .map_err(extraction_error)?;

        let mut encoding: Option<&Encoding> = None;
        let mut items = Vec::new();
        for operation in &content.operations {
            let shown = match operation.operator.as_str() {
                "Tf" => {
                    encoding = operation
                        .operands
                        .first()
                        .and_then(|font| font.as_name().ok())
                        .and_then(|name| encodings.get(name));
                    continue;
                }
                "Tj" | "TJ" | "'" => operation.operands.first(),
                "\"" => operation.operands.get(2),
                _ => continue,
            };
            let Some(shown) = shown else {
                continue;
            };

            let text = decode_shown(shown, encoding).map_err(extraction_error)?;
            if !text.is_empty() {
                items.push(TextItem::new(text));
            }
        }

        trace!("Page {}: {} text items", page, items.len());
        Ok(items)
    }
}

/// Decode a string operand or a `TJ` array into one fragment.
///
/// Kerning adjustments wider than 100 thousandths of an em become a space.
fn decode_shown(operand: &Object, encoding: Option<&Encoding>) -> lopdf::Result<String> {
    match operand {
        Object::String(bytes, _) => match encoding {
            Some(encoding) => Document::decode_text(encoding, bytes),
            None => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
        Object::Array(parts) => {
            let mut text = String::new();
            for part in parts {
                match part {
                    Object::Integer(i) if *i < -100 => text.push(' '),
                    Object::Real(r) if *r < -100.0 => text.push(' '),
                    Object::String(..) => text.push_str(&decode_shown(part, encoding)?),
                    _ => {}
                }
            }
            Ok(text)
        }
        _ => Ok(String::new()),
    }
}
