//! Text extraction for uploaded resumes.
//!
//! PDF text comes out of `pdf-extract`. DOCX is an OOXML zip container; we
//! open it and walk `word/document.xml` (plus the footnote and endnote parts
//! when present) with a streaming XML reader, emitting `\n` per paragraph.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::errors::AppError;

/// The two media types the intake endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Docx,
    Pdf,
}

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PDF_MIME: &str = "application/pdf";

impl MediaType {
    /// Maps a declared MIME type to a supported media type, if any.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            DOCX_MIME => Some(MediaType::Docx),
            PDF_MIME => Some(MediaType::Pdf),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The extractor itself failed. Carries the underlying message.
    #[error("{0}")]
    Parse(String),

    /// Extraction ran but the document held no usable text.
    #[error("document contains no extractable text")]
    Empty,
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Parse(msg) => AppError::Extraction(msg),
            ExtractError::Empty => AppError::EmptyDocument,
        }
    }
}

/// Extracts raw text from an uploaded document.
/// Returns `ExtractError::Empty` when the result is whitespace-only, so the
/// caller can report that distinctly from an extractor failure.
pub fn extract_text(media_type: MediaType, data: &[u8]) -> Result<String, ExtractError> {
    let text = match media_type {
        MediaType::Pdf => {
            pdf_extract::extract_text_from_mem(data).map_err(|e| ExtractError::Parse(e.to_string()))?
        }
        MediaType::Docx => extract_docx_text(data)?,
    };

    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

/// The OOXML parts that carry body text. The document part is mandatory;
/// footnotes and endnotes are included when the archive has them.
const DOCX_TEXT_PARTS: [&str; 3] = [
    "word/document.xml",
    "word/footnotes.xml",
    "word/endnotes.xml",
];

fn extract_docx_text(data: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| ExtractError::Parse(format!("invalid DOCX container: {e}")))?;

    let mut out = String::new();
    for part in DOCX_TEXT_PARTS {
        let mut xml = String::new();
        match archive.by_name(part) {
            Ok(mut file) => {
                file.read_to_string(&mut xml)
                    .map_err(|e| ExtractError::Parse(format!("unreadable DOCX part {part}: {e}")))?;
            }
            Err(_) if part != "word/document.xml" => continue,
            Err(e) => {
                return Err(ExtractError::Parse(format!(
                    "DOCX is missing its document part: {e}"
                )))
            }
        }
        out.push_str(&text_from_ooxml(&xml)?);
    }
    Ok(out)
}

/// Walks one OOXML part and collects the text of every `w:t` run.
/// Paragraph ends and explicit breaks become `\n`. Entity and character
/// references arrive as their own events and are resolved inline.
fn text_from_ooxml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractError::Parse(format!("malformed DOCX XML: {e}")))?;
        match event {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"w:br" => out.push('\n'),
            Event::Text(e) if in_text_run => {
                let text = e
                    .decode()
                    .map_err(|err| ExtractError::Parse(format!("malformed DOCX XML: {err}")))?;
                out.push_str(&text);
            }
            Event::GeneralRef(e) if in_text_run => {
                let char_ref = e
                    .resolve_char_ref()
                    .map_err(|err| ExtractError::Parse(format!("malformed DOCX XML: {err}")))?;
                if let Some(ch) = char_ref {
                    out.push(ch);
                    continue;
                }
                let name = e
                    .decode()
                    .map_err(|err| ExtractError::Parse(format!("malformed DOCX XML: {err}")))?;
                if let Some(ch) = resolve_predefined_entity(&name) {
                    out.push(ch);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

/// The five entities XML predefines. Anything else is dropped; OOXML text
/// runs carry no custom entities.
fn resolve_predefined_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Builds a minimal DOCX (zip with a `word/document.xml`) around the
    /// given paragraphs.
    fn fake_docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn media_type_accepts_docx_and_pdf() {
        assert_eq!(MediaType::from_mime(DOCX_MIME), Some(MediaType::Docx));
        assert_eq!(MediaType::from_mime(PDF_MIME), Some(MediaType::Pdf));
    }

    #[test]
    fn media_type_rejects_everything_else() {
        assert_eq!(MediaType::from_mime("image/png"), None);
        assert_eq!(MediaType::from_mime("text/plain"), None);
        assert_eq!(MediaType::from_mime(""), None);
    }

    #[test]
    fn docx_paragraphs_become_newline_separated_text() {
        let bytes = fake_docx(&["Ada Lovelace", "Analyst Engine Programmer"]);
        let text = extract_text(MediaType::Docx, &bytes).unwrap();
        assert_eq!(text, "Ada Lovelace\nAnalyst Engine Programmer\n");
    }

    #[test]
    fn docx_entities_are_unescaped() {
        let bytes = fake_docx(&["R&amp;D Lead"]);
        let text = extract_text(MediaType::Docx, &bytes).unwrap();
        assert_eq!(text.trim(), "R&D Lead");
    }

    #[test]
    fn docx_predefined_entities_resolve() {
        let bytes = fake_docx(&["&lt;html&gt; &amp; CSS, &quot;senior&quot; level, O&apos;Brien"]);
        let text = extract_text(MediaType::Docx, &bytes).unwrap();
        assert_eq!(text.trim(), "<html> & CSS, \"senior\" level, O'Brien");
    }

    #[test]
    fn docx_character_references_resolve() {
        // En dash as decimal and euro sign as hex character references.
        let bytes = fake_docx(&["2019&#8211;2023", "Salary in &#x20AC;"]);
        let text = extract_text(MediaType::Docx, &bytes).unwrap();
        assert_eq!(text, "2019\u{2013}2023\nSalary in \u{20AC}\n");
    }

    #[test]
    fn whitespace_only_docx_reports_empty() {
        let bytes = fake_docx(&["   ", ""]);
        let err = extract_text(MediaType::Docx, &bytes).unwrap_err();
        assert!(matches!(err, ExtractError::Empty));
    }

    #[test]
    fn garbage_bytes_report_parse_failure_not_empty() {
        let err = extract_text(MediaType::Docx, b"this is not a zip").unwrap_err();
        match err {
            ExtractError::Parse(msg) => assert!(msg.contains("invalid DOCX container")),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn docx_without_document_part_reports_parse_failure() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = extract_text(MediaType::Docx, &bytes).unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }

    #[test]
    fn garbage_pdf_reports_parse_failure() {
        let err = extract_text(MediaType::Pdf, b"%PDF-nope").unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }

    #[test]
    fn empty_error_converts_to_empty_document_app_error() {
        let app_err: AppError = ExtractError::Empty.into();
        assert!(matches!(app_err, AppError::EmptyDocument));
    }
}
