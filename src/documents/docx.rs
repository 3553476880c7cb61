//! DOCX text extraction.
//!
//! A `.docx` file is a zip package; the body lives in `word/document.xml`.
//! Only paragraphs that sit directly in the body are collected. Paragraphs
//! inside tables, content controls or text boxes are skipped.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::types::{AppError, AppResult};

const DOCUMENT_PART: &str = "word/document.xml";

/// Transitional and strict WordprocessingML namespaces.
const WORDML_NAMESPACES: [&[u8]; 2] = [
    b"http://schemas.openxmlformats.org/wordprocessingml/2006/main",
    b"http://purl.oclc.org/ooxml/wordprocessingml/main",
];

/// Paragraph text of the document body, joined with newlines.
pub fn extract_docx_text(bytes: &[u8]) -> AppResult<String> {
    let xml = read_document_part(bytes)?;
    let paragraphs = body_paragraphs(&xml)?;
    debug!(paragraph_count = paragraphs.len(), "Extracted DOCX paragraphs");
    Ok(paragraphs.join("\n"))
}

fn read_document_part(bytes: &[u8]) -> AppResult<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::Extraction(format!("invalid DOCX package: {}", e)))?;

    let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| match e {
        ZipError::FileNotFound => {
            AppError::Extraction(format!("{} is missing, not a Word document", DOCUMENT_PART))
        }
        other => AppError::Extraction(format!("cannot open {}: {}", DOCUMENT_PART, other)),
    })?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| AppError::Extraction(format!("cannot read {}: {}", DOCUMENT_PART, e)))?;
    Ok(xml)
}

#[derive(Default)]
struct BodyWalker {
    paragraphs: Vec<String>,
    current: String,
    depth: usize,
    body_depth: Option<usize>,
    /// Depth of the body paragraph being collected.
    paragraph_depth: Option<usize>,
    /// Paragraphs open inside the collected one (text boxes).
    nested_paragraphs: usize,
    run_depth: usize,
    in_text: bool,
}

impl BodyWalker {
    /// True while inside a run of a collected body paragraph.
    fn collecting(&self) -> bool {
        self.paragraph_depth.is_some() && self.nested_paragraphs == 0 && self.run_depth > 0
    }

    /// A paragraph opening at `depth` sits directly in `w:body`.
    fn is_body_child(&self, depth: usize) -> bool {
        self.body_depth.map(|body| body + 1) == Some(depth)
    }

    /// `name` is the local name of a WordprocessingML element, `None` for
    /// elements of any other namespace.
    fn start(&mut self, name: Option<&[u8]>) {
        self.depth += 1;
        match name {
            Some(b"body") => self.body_depth = Some(self.depth),
            Some(b"p") => {
                if self.paragraph_depth.is_some() {
                    self.nested_paragraphs += 1;
                } else if self.is_body_child(self.depth) {
                    self.paragraph_depth = Some(self.depth);
                    self.current.clear();
                }
            }
            Some(b"r") => self.run_depth += 1,
            Some(b"t") => self.in_text = true,
            _ => {}
        }
    }

    fn end(&mut self, name: Option<&[u8]>) {
        match name {
            Some(b"body") => self.body_depth = None,
            Some(b"p") => {
                if self.paragraph_depth == Some(self.depth) {
                    self.paragraphs.push(std::mem::take(&mut self.current));
                    self.paragraph_depth = None;
                } else if self.paragraph_depth.is_some() {
                    self.nested_paragraphs = self.nested_paragraphs.saturating_sub(1);
                }
            }
            Some(b"r") => self.run_depth = self.run_depth.saturating_sub(1),
            Some(b"t") => self.in_text = false,
            _ => {}
        }
        self.depth = self.depth.saturating_sub(1);
    }

    fn empty(&mut self, name: Option<&[u8]>) {
        match name {
            Some(b"p") if self.paragraph_depth.is_none() && self.is_body_child(self.depth + 1) => {
                self.paragraphs.push(String::new());
            }
            Some(b"tab") if self.collecting() => self.current.push('\t'),
            Some(b"br") | Some(b"cr") if self.collecting() => self.current.push('\n'),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_text && self.collecting() {
            self.current.push_str(text);
        }
    }
}

fn body_paragraphs(xml: &str) -> AppResult<Vec<String>> {
    let mut reader = NsReader::from_str(xml);
    let mut walker = BodyWalker::default();

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| AppError::Extraction(format!("malformed {}: {}", DOCUMENT_PART, e)))?;
        let wordml = is_wordml(&ns);
        match event {
            Event::Start(e) => walker.start(wordml.then_some(e.local_name().as_ref())),
            Event::End(e) => walker.end(wordml.then_some(e.local_name().as_ref())),
            Event::Empty(e) => walker.empty(wordml.then_some(e.local_name().as_ref())),
            Event::Text(e) => walker.text(&String::from_utf8_lossy(&e)),
            Event::CData(e) => walker.text(&String::from_utf8_lossy(&e)),
            Event::GeneralRef(e) => {
                if let Some(resolved) = resolve_reference(&String::from_utf8_lossy(&e)) {
                    walker.text(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(walker.paragraphs)
}

/// Elements are matched by namespace URI, whatever prefix the producer chose.
fn is_wordml(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if WORDML_NAMESPACES.iter().any(|known| *known == *uri))
}

/// Resolve `&name;` / `&#NN;` / `&#xHH;` bodies.
fn resolve_reference(name: &str) -> Option<String> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix('x').or_else(|| numeric.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    quick_xml::escape::resolve_xml_entity(name).map(str::to_string)
}


#[cfg(test)]
mod tests {
    use super::fixtures::{docx_with_body, docx_with_document_xml, docx_with_paragraphs};
    use super::*;

    #[test]
    fn test_paragraphs_joined_in_order() {
        let bytes = docx_with_paragraphs(&["Introduction", "Methods", "Results"]);
        let text = extract_docx_text(&bytes).unwrap();
        assert_eq!(text, "Introduction\nMethods\nResults");
    }

    #[test]
    fn test_runs_concatenate_within_paragraph() {
        let bytes = docx_with_body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t xml:space="preserve">Total </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>revenue</w:t></w:r><w:r><w:tab/><w:t>42</w:t></w:r></w:p>"#,
        );
        let text = extract_docx_text(&bytes).unwrap();
        assert_eq!(text, "Total revenue\t42");
    }

    #[test]
    fn test_empty_paragraphs_are_kept() {
        let bytes = docx_with_body("<w:p><w:r><w:t>a</w:t></w:r></w:p><w:p/><w:p></w:p><w:p><w:r><w:t>b</w:t></w:r></w:p>");
        let text = extract_docx_text(&bytes).unwrap();
        assert_eq!(text, "a\n\n\nb");
    }

    #[test]
    fn test_table_paragraphs_are_skipped() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>before</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>after</w:t></w:r></w:p>",
        );
        let text = extract_docx_text(&bytes).unwrap();
        assert_eq!(text, "before\nafter");
    }

    #[test]
    fn test_content_control_and_text_box_paragraphs_are_skipped() {
        let bytes = docx_with_body(
            "<w:sdt><w:sdtContent><w:p><w:r><w:t>control</w:t></w:r></w:p></w:sdtContent></w:sdt>\
             <w:p><w:r><w:t>main</w:t></w:r><w:r><w:pict><w:txbxContent><w:p><w:r><w:t>boxed</w:t></w:r></w:p></w:txbxContent></w:pict></w:r><w:r><w:t> text</w:t></w:r></w:p>",
        );
        let text = extract_docx_text(&bytes).unwrap();
        assert_eq!(text, "main text");
    }

    #[test]
    fn test_other_namespace_prefix() {
        let bytes = docx_with_document_xml(
            r#"<ns0:document xmlns:ns0="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><ns0:body><ns0:p><ns0:r><ns0:t>Hello</ns0:t></ns0:r></ns0:p><ns0:p/></ns0:body></ns0:document>"#,
        );
        assert_eq!(extract_docx_text(&bytes).unwrap(), "Hello\n");
    }

    #[test]
    fn test_default_namespace() {
        let bytes = docx_with_document_xml(
            r#"<document xmlns="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><body><p><r><t>First</t></r></p><p><r><t>Second</t></r></p></body></document>"#,
        );
        assert_eq!(extract_docx_text(&bytes).unwrap(), "First\nSecond");
    }

    #[test]
    fn test_foreign_namespace_is_ignored() {
        let bytes = docx_with_document_xml(
            r#"<w:document xmlns:w="urn:not-wordml"><w:body><w:p><w:r><w:t>Hidden</w:t></w:r></w:p></w:body></w:document>"#,
        );
        assert_eq!(extract_docx_text(&bytes).unwrap(), "");
    }

    #[test]
    fn test_entities_and_breaks() {
        let bytes = docx_with_body("<w:p><w:r><w:t>R&amp;D &#8212; Q&#x31;</w:t><w:br/><w:t>next</w:t></w:r></w:p>");
        let text = extract_docx_text(&bytes).unwrap();
        assert_eq!(text, "R&D \u{2014} Q1\nnext");
    }

    #[test]
    fn test_missing_document_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("hello.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = extract_docx_text(&bytes).unwrap_err();
        assert!(err.to_string().contains("not a Word document"));
    }

    #[test]
    fn test_not_a_zip() {
        let err = extract_docx_text(b"plain text").unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[test]
    fn test_resolve_reference() {
        assert_eq!(resolve_reference("lt").as_deref(), Some("<"));
        assert_eq!(resolve_reference("#65").as_deref(), Some("A"));
        assert_eq!(resolve_reference("#x41").as_deref(), Some("A"));
        assert_eq!(resolve_reference("bogus"), None);
    }
}
