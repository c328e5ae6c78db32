//! A synthetic single-page PDF used when a slide produced no capture at all.

use crate::error::ComposerError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

const HEADLINE_SIZE: f32 = 48.0;
const DETAIL_SIZE: f32 = 18.0;

/// Builds a one-page PDF of `width` x `height` points with a light background,
/// a headline and an optional detail line (typically the slide id).
///
/// Text is restricted to printable ASCII since the page uses the standard
/// Helvetica font without an embedded encoding.
pub fn placeholder_page(
    width: f32,
    height: f32,
    headline: &str,
    detail: Option<&str>,
) -> Result<Vec<u8>, ComposerError> {
    if !(width > 0.0 && height > 0.0) {
        return Err(ComposerError::Other(format!(
            "Invalid placeholder page size {}x{}",
            width, height
        )));
    }

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let left = width * 0.1;
    let baseline = height * 0.5;
    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new("rg", vec![0.95.into(), 0.95.into(), 0.95.into()]),
        Operation::new("re", vec![0.into(), 0.into(), width.into(), height.into()]),
        Operation::new("f", vec![]),
        Operation::new("Q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("rg", vec![0.2.into(), 0.2.into(), 0.2.into()]),
        Operation::new("Tf", vec!["F1".into(), HEADLINE_SIZE.into()]),
        Operation::new("Td", vec![left.into(), baseline.into()]),
        Operation::new("Tj", vec![pdf_text(headline)]),
    ];
    if let Some(detail) = detail {
        operations.extend([
            Operation::new("Tf", vec!["F1".into(), DETAIL_SIZE.into()]),
            Operation::new("Td", vec![0.into(), (-(HEADLINE_SIZE)).into()]),
            Operation::new("Tj", vec![pdf_text(detail)]),
        ]);
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1_i64,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

fn pdf_text(text: &str) -> Object {
    let ascii: String = text
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect();
    Object::String(ascii.into_bytes(), StringFormat::Literal)
}
