use lopdf::Document;
use tracing::debug;

use crate::types::{AppError, AppResult};

/// Concatenate the text of every page in page order, one newline after each page.
///
/// A page that cannot be decoded fails the whole document.
pub fn extract_pdf_text(bytes: &[u8]) -> AppResult<String> {
    let document = Document::load_mem(bytes)
        .map_err(|e| AppError::Extraction(format!("invalid PDF: {}", e)))?;

    let pages = document.get_pages();
    debug!(page_count = pages.len(), "Extracting PDF text");

    let mut text = String::new();
    for page_number in pages.keys() {
        let page_text = document
            .extract_text(&[*page_number])
            .map_err(|e| AppError::Extraction(format!("page {}: {}", page_number, e)))?;
        text.push_str(page_text.trim_end_matches(['\r', '\n']));
        text.push('\n');
    }

    Ok(text)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a minimal PDF with one Courier text line per page.
    pub fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}
