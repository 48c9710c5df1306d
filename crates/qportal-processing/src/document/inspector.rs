//! Document inspector - format detection and PDF metadata

use anyhow::{anyhow, Context, Result};
use lopdf::{Document, Object};

/// Container format detected from the leading bytes of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    /// ZIP-based Office formats (DOCX, XLSX, PPTX)
    Office,
    /// Compound File Binary (DOC, XLS, PPT)
    OfficeLegacy,
    Unknown,
}

impl DocumentFormat {
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(b"%PDF") {
            DocumentFormat::Pdf
        } else if data.len() >= 30 && data.starts_with(b"PK\x03\x04") {
            DocumentFormat::Office
        } else if data.starts_with(&[0xD0, 0xCF]) {
            DocumentFormat::OfficeLegacy
        } else {
            DocumentFormat::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Office => "office",
            DocumentFormat::OfficeLegacy => "office_legacy",
            DocumentFormat::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfMetadata {
    pub page_count: u32,
    pub title: Option<String>,
    pub author: Option<String>,
}

pub struct DocumentInspector;

impl DocumentInspector {
    pub fn validate(&self, data: &[u8]) -> Result<DocumentFormat> {
        if data.is_empty() {
            return Err(anyhow!("Document data is empty"));
        }

        let format = DocumentFormat::detect(data);
        if format == DocumentFormat::Unknown {
            // Unknown formats are accepted; the extension allowlist is the gate.
            tracing::warn!("Unknown document format detected");
        }
        Ok(format)
    }

    pub fn pdf_metadata(&self, data: &[u8]) -> Result<PdfMetadata> {
        let document = Document::load_mem(data).context("Failed to parse PDF")?;

        let info = document
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|info| match info {
                Object::Reference(id) => document.get_dictionary(*id).ok(),
                Object::Dictionary(dict) => Some(dict),
                _ => None,
            });

        let text_field = |key: &[u8]| {
            info.and_then(|dict| dict.get(key).ok())
                .and_then(|value| match value {
                    Object::Reference(id) => document.get_object(*id).ok(),
                    other => Some(other),
                })
                .and_then(decode_text)
                .filter(|s| !s.is_empty())
        };

        Ok(PdfMetadata {
            page_count: document.get_pages().len() as u32,
            title: text_field(b"Title"),
            author: text_field(b"Author"),
        })
    }
}

/// Decode a PDF text string: UTF-16BE with a byte order mark, otherwise
/// treated as single-byte text.
fn decode_text(object: &Object) -> Option<String> {
    let Object::String(bytes, _) = object else {
        return None;
    };

    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&units));
    }

    Some(bytes.iter().map(|&b| char::from(b)).collect())
}
