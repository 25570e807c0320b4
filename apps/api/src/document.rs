//! Text Extractor — converts a PDF or DOCX byte stream into plain text lines.
//!
//! Synchronous parser calls (pdf-extract, docx-rs) run under `spawn_blocking`
//! so they never stall the async runtime. A document with no extractable text
//! layer (e.g. a scanned-image PDF) yields zero lines, not an error.

use bytes::Bytes;
use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableChild, TableRowChild};

use crate::errors::AppError;

/// Declared format of an uploaded document, derived from its filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Maps a filename extension to a format. Anything other than
    /// `.pdf`/`.docx` is rejected up front.
    pub fn from_filename(filename: &str) -> Result<Self, AppError> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Ok(DocumentFormat::Pdf)
        } else if lower.ends_with(".docx") {
            Ok(DocumentFormat::Docx)
        } else {
            Err(AppError::UnsupportedFormat(format!(
                "only .pdf and .docx are accepted, got '{filename}'"
            )))
        }
    }
}

/// An uploaded document: raw bytes plus declared format. Discarded after text
/// extraction; the bytes are retained only for the optional storage upload.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Bytes,
    pub format: DocumentFormat,
    pub filename: String,
}

/// Ordered sequence of text lines extracted from a document.
/// Immutable once produced; both the tagger and the classifier read it.
#[derive(Debug, Clone, Default)]
pub struct PlainText {
    lines: Vec<String>,
}

impl PlainText {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Full text joined with newlines, as fed to the NER backend.
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

/// Extracts plain text from the document, dispatching on declared format.
pub async fn extract_text(doc: &RawDocument) -> Result<PlainText, AppError> {
    let bytes = doc.bytes.clone();
    let format = doc.format;

    let text = tokio::task::spawn_blocking(move || match format {
        DocumentFormat::Pdf => extract_pdf(&bytes),
        DocumentFormat::Docx => extract_docx(&bytes),
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

    Ok(PlainText::from_text(&text))
}

fn extract_pdf(bytes: &[u8]) -> Result<String, AppError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::CorruptDocument(format!("failed to parse PDF: {e}")))
}

fn extract_docx(bytes: &[u8]) -> Result<String, AppError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| AppError::CorruptDocument(format!("failed to parse DOCX: {e}")))?;

    let mut parts: Vec<String> = Vec::new();
    for child in docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                let text = paragraph_text(&p);
                if !text.trim().is_empty() {
                    parts.push(text);
                }
            }
            DocumentChild::Table(t) => {
                for row in &t.rows {
                    let TableChild::TableRow(r) = row;
                    for cell in &r.cells {
                        let TableRowChild::TableCell(c) = cell;
                        for content in &c.children {
                            if let docx_rs::TableCellContent::Paragraph(p) = content {
                                let text = paragraph_text(p);
                                if !text.trim().is_empty() {
                                    parts.push(text);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(parts.join("\n"))
}

fn paragraph_text(p: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &p.children {
        match child {
            ParagraphChild::Run(r) => {
                for run_child in &r.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(h) => {
                for inner in &h.children {
                    if let ParagraphChild::Run(r) = inner {
                        for run_child in &r.children {
                            if let RunChild::Text(t) = run_child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_filename_pdf() {
        assert_eq!(
            DocumentFormat::from_filename("resume.pdf").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_filename("RESUME.PDF").unwrap(),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn test_format_from_filename_docx() {
        assert_eq!(
            DocumentFormat::from_filename("cv.docx").unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn test_format_rejects_other_extensions() {
        assert!(matches!(
            DocumentFormat::from_filename("resume.txt"),
            Err(AppError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            DocumentFormat::from_filename("resume.doc"),
            Err(AppError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            DocumentFormat::from_filename("resume"),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_plaintext_preserves_line_order() {
        let text = PlainText::from_text("first\nsecond\nthird");
        assert_eq!(text.lines(), ["first", "second", "third"]);
    }

    #[test]
    fn test_plaintext_empty_document() {
        let text = PlainText::from_text("");
        assert!(text.is_empty());
        assert_eq!(text.lines().len(), 0);
    }

    #[test]
    fn test_plaintext_whitespace_only_is_empty() {
        let text = PlainText::from_text("   \n\t\n  ");
        assert!(text.is_empty());
    }

    /// A plain text file renamed .pdf must fail as corrupt, not crash.
    #[tokio::test]
    async fn test_text_file_renamed_pdf_is_corrupt() {
        let doc = RawDocument {
            bytes: Bytes::from_static(b"this is not a pdf at all"),
            format: DocumentFormat::Pdf,
            filename: "fake.pdf".to_string(),
        };
        let result = extract_text(&doc).await;
        assert!(matches!(result, Err(AppError::CorruptDocument(_))));
    }

    #[tokio::test]
    async fn test_garbage_docx_is_corrupt() {
        let doc = RawDocument {
            bytes: Bytes::from_static(b"\x00\x01\x02 not a zip archive"),
            format: DocumentFormat::Docx,
            filename: "fake.docx".to_string(),
        };
        let result = extract_text(&doc).await;
        assert!(matches!(result, Err(AppError::CorruptDocument(_))));
    }
}
