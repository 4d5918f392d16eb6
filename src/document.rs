// src/document.rs
//! Resume file loading: PDF/DOCX bytes to plain text.

use crate::error::CollectError;
use quick_xml::events::Event;
use std::io::{Cursor, Read};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Determine the document kind from the declared filename.
    pub fn from_filename(filename: &str) -> Result<Self, CollectError> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Ok(Self::Pdf)
        } else if lower.ends_with(".docx") {
            Ok(Self::Docx)
        } else {
            let ext = lower.rsplit('.').next().unwrap_or("").to_string();
            Err(CollectError::UnsupportedFormat(if ext.is_empty() {
                filename.to_string()
            } else {
                ext
            }))
        }
    }
}

/// Extract plain text from an uploaded resume.
///
/// Corrupt or unreadable files are a hard error: no candidate data can be
/// derived from them, so the caller must surface the failure.
pub fn load_document(content: &[u8], filename: &str) -> Result<String, CollectError> {
    let kind = DocumentKind::from_filename(filename)?;
    let text = match kind {
        DocumentKind::Pdf => extract_text_from_pdf(content)?,
        DocumentKind::Docx => extract_text_from_docx(content)?,
    };
    info!(
        "Extracted {} chars of text from {} ({:?})",
        text.len(),
        filename,
        kind
    );
    Ok(text)
}

fn extract_text_from_pdf(content: &[u8]) -> Result<String, CollectError> {
    pdf_extract::extract_text_from_mem(content)
        .map_err(|e| CollectError::DocumentParse(format!("PDF extraction failed: {}", e)))
}

/// DOCX is a zip container; the document body lives in `word/document.xml`.
/// Paragraph ends become newlines, matching how the text reads.
fn extract_text_from_docx(content: &[u8]) -> Result<String, CollectError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(content))
        .map_err(|e| CollectError::DocumentParse(format!("Not a valid DOCX archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| CollectError::DocumentParse(format!("DOCX missing document body: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| CollectError::DocumentParse(format!("Failed to read DOCX body: {}", e)))?;

    let mut reader = quick_xml::Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut text = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let chunk = e
                    .unescape()
                    .map_err(|e| CollectError::DocumentParse(format!("Bad DOCX text: {}", e)))?;
                text.push_str(&chunk);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => text.push('\n'),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(CollectError::DocumentParse(format!(
                    "Malformed DOCX XML: {}",
                    e
                )))
            }
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut body = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
        );
        for p in paragraphs {
            body.push_str(&format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p));
        }
        body.push_str("</w:body></w:document>");

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(
            DocumentKind::from_filename("resume.PDF").unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::from_filename("cv.docx").unwrap(),
            DocumentKind::Docx
        );
        assert!(matches!(
            DocumentKind::from_filename("resume.txt"),
            Err(CollectError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_wellformed_docx_yields_text() {
        let bytes = build_docx(&["Jane Roe", "Software Engineer at Initech"]);
        let text = load_document(&bytes, "resume.docx").unwrap();
        assert!(text.contains("Jane Roe"));
        assert!(text.contains("Software Engineer at Initech"));
        // paragraph boundaries preserved as newlines
        assert!(text.contains("Jane Roe\n"));
    }

    #[test]
    fn test_corrupt_docx_is_parse_error() {
        let mut bytes = build_docx(&["Jane Roe"]);
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(
            load_document(&bytes, "resume.docx"),
            Err(CollectError::DocumentParse(_))
        ));
    }

    #[test]
    fn test_corrupt_pdf_is_parse_error() {
        assert!(matches!(
            load_document(b"definitely not a pdf", "resume.pdf"),
            Err(CollectError::DocumentParse(_))
        ));
    }
}
