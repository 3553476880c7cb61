//! Document text extraction for uploaded files.
//!
//! Two formats are understood: PDF (text of every page in sequence) and
//! DOCX (body paragraphs joined by newlines). The extracted text is used
//! verbatim as prompt context.

pub mod docx;
pub mod pdf;

pub use docx::extract_docx_text;
pub use pdf::extract_pdf_text;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::types::AppResult;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    fn from_mime(essence: &str) -> Option<Self> {
        match essence {
            PDF_MIME => Some(DocumentKind::Pdf),
            DOCX_MIME => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    /// Resolve the kind from the declared content type, falling back to the
    /// file name when the browser sends something generic like
    /// `application/octet-stream`.
    pub fn detect(content_type: Option<&str>, filename: Option<&str>) -> Option<Self> {
        let declared = content_type
            .and_then(|ct| ct.parse::<mime::Mime>().ok())
            .and_then(|m| Self::from_mime(m.essence_str()));

        declared.or_else(|| {
            let guessed = mime_guess::from_path(filename?).first()?;
            Self::from_mime(guessed.essence_str())
        })
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => PDF_MIME,
            DocumentKind::Docx => DOCX_MIME,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "pdf"),
            DocumentKind::Docx => write!(f, "docx"),
        }
    }
}

pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> AppResult<String> {
    match kind {
        DocumentKind::Pdf => extract_pdf_text(bytes),
        DocumentKind::Docx => extract_docx_text(bytes),
    }
}

/// An uploaded document and its extracted text. Immutable once created;
/// a new upload produces a new value.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub id: Uuid,
    pub filename: String,
    pub kind: DocumentKind,
    pub text: String,
    pub size: usize,
    pub uploaded_at: DateTime<Utc>,
}

impl LoadedDocument {
    pub fn load(filename: impl Into<String>, kind: DocumentKind, bytes: &[u8]) -> AppResult<Self> {
        let text = extract_text(kind, bytes)?;
        Ok(Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            kind,
            text,
            size: bytes.len(),
            uploaded_at: Utc::now(),
        })
    }

    /// True when extraction produced something worth asking about.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
