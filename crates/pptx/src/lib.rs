//! A small PresentationML (`.pptx`) writer.
//!
//! Only what an exported deck needs: one blank master/layout, slides that are
//! either a single full-bleed picture or centred fallback text, and the
//! package plumbing (content types, relationships, document properties).
//!
//! ```ignore
//! let mut deck = DeckBuilder::new(SlideSize::for_canvas(1920, 1080));
//! deck.add_image_slide(png_bytes)?;
//! deck.add_text_slide("Slide 2", Some("could not be rendered"));
//! let bytes = deck.build()?;
//! ```

mod error;
mod parts;
pub mod units;

pub use error::PptxError;
pub use units::SlideSize;

use parts::Relationship;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Relationship ids 1..=5 of `presentation.xml` are the fixed parts;
/// slides follow.
const FIRST_SLIDE_REL: usize = 6;

/// Image encodings accepted for picture slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Detects the format from the file signature.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }
}

#[derive(Debug, Clone)]
enum DeckSlide {
    Image { data: Vec<u8>, format: ImageFormat },
    Text { title: String, subtitle: Option<String> },
}

/// Collects slides in order and writes the package.
#[derive(Debug, Clone, Default)]
pub struct DeckBuilder {
    size: SlideSize,
    title: Option<String>,
    slides: Vec<DeckSlide>,
}

impl DeckBuilder {
    pub fn new(size: SlideSize) -> Self {
        Self { size, title: None, slides: Vec::new() }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn size(&self) -> SlideSize {
        self.size
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Appends a slide covered edge to edge by the given PNG or JPEG.
    pub fn add_image_slide(&mut self, data: Vec<u8>) -> Result<&mut Self, PptxError> {
        let format = ImageFormat::sniff(&data)
            .ok_or(PptxError::UnsupportedImage { slide: self.slides.len() + 1 })?;
        self.slides.push(DeckSlide::Image { data, format });
        Ok(self)
    }

    /// Appends a text-only slide.
    pub fn add_text_slide(&mut self, title: impl Into<String>, subtitle: Option<&str>) -> &mut Self {
        self.slides.push(DeckSlide::Text {
            title: title.into(),
            subtitle: subtitle.map(str::to_string),
        });
        self
    }

    /// Writes the complete `.pptx` archive into memory.
    pub fn build(&self) -> Result<Vec<u8>, PptxError> {
        if self.slides.is_empty() {
            return Err(PptxError::Empty);
        }
        if !self.size.is_valid() {
            return Err(PptxError::InvalidSize { cx: self.size.cx, cy: self.size.cy });
        }

        let mut package = PackageWriter::new();
        let count = self.slides.len();

        package.add("[Content_Types].xml", parts::content_types(count).as_bytes())?;
        package.add(
            "_rels/.rels",
            parts::relationships(&[
                rel(1, parts::REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
                rel(2, parts::REL_CORE_PROPERTIES, "docProps/core.xml"),
                rel(3, parts::REL_EXTENDED_PROPERTIES, "docProps/app.xml"),
            ])
            .as_bytes(),
        )?;
        let title = self.title.as_deref().unwrap_or("Presentation");
        package.add("docProps/core.xml", parts::core_properties(title).as_bytes())?;
        package.add("docProps/app.xml", parts::app_properties(count).as_bytes())?;

        package.add(
            "ppt/presentation.xml",
            parts::presentation(self.size, count, FIRST_SLIDE_REL).as_bytes(),
        )?;
        let mut presentation_rels = vec![
            rel(1, parts::REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
            rel(2, parts::REL_THEME, "theme/theme1.xml"),
            rel(3, parts::REL_PRES_PROPS, "presProps.xml"),
            rel(4, parts::REL_VIEW_PROPS, "viewProps.xml"),
            rel(5, parts::REL_TABLE_STYLES, "tableStyles.xml"),
        ];
        for n in 1..=count {
            presentation_rels.push(rel(
                FIRST_SLIDE_REL + n - 1,
                parts::REL_SLIDE,
                &format!("slides/slide{}.xml", n),
            ));
        }
        package.add(
            "ppt/_rels/presentation.xml.rels",
            parts::relationships(&presentation_rels).as_bytes(),
        )?;
        package.add("ppt/presProps.xml", parts::pres_props().as_bytes())?;
        package.add("ppt/viewProps.xml", parts::view_props().as_bytes())?;
        package.add("ppt/tableStyles.xml", parts::table_styles().as_bytes())?;
        package.add("ppt/theme/theme1.xml", parts::theme().as_bytes())?;

        package.add("ppt/slideMasters/slideMaster1.xml", parts::slide_master().as_bytes())?;
        package.add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            parts::relationships(&[
                rel(1, parts::REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
                rel(2, parts::REL_THEME, "../theme/theme1.xml"),
            ])
            .as_bytes(),
        )?;
        package.add("ppt/slideLayouts/slideLayout1.xml", parts::slide_layout().as_bytes())?;
        package.add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            parts::relationships(&[rel(
                1,
                parts::REL_SLIDE_MASTER,
                "../slideMasters/slideMaster1.xml",
            )])
            .as_bytes(),
        )?;

        let mut image_count = 0;
        for (index, slide) in self.slides.iter().enumerate() {
            let number = index + 1;
            let mut slide_rels =
                vec![rel(1, parts::REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml")];

            let xml = match slide {
                DeckSlide::Image { data, format } => {
                    image_count += 1;
                    let media = format!("image{}.{}", image_count, format.extension());
                    package.add_stored(&format!("ppt/media/{}", media), data)?;
                    slide_rels.push(rel(2, parts::REL_IMAGE, &format!("../media/{}", media)));
                    parts::image_slide(self.size, number, "rId2")
                }
                DeckSlide::Text { title, subtitle } => {
                    parts::text_slide(self.size, title, subtitle.as_deref())
                }
            };

            package.add(&format!("ppt/slides/slide{}.xml", number), xml.as_bytes())?;
            package.add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                parts::relationships(&slide_rels).as_bytes(),
            )?;
        }

        let bytes = package.finish()?;
        log::debug!(
            "Wrote pptx package: {} slides ({} pictures), {} bytes",
            count,
            image_count,
            bytes.len()
        );
        Ok(bytes)
    }
}

fn rel<'a>(id: usize, kind: &'a str, target: &str) -> Relationship<'a> {
    Relationship { id: format!("rId{}", id), kind, target: target.to_string() }
}

/// Thin wrapper over the zip writer. XML parts are deflated; media is
/// stored as-is since PNG/JPEG data is already compressed.
struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl PackageWriter {
    fn new() -> Self {
        Self { zip: ZipWriter::new(Cursor::new(Vec::new())) }
    }

    fn add(&mut self, name: &str, data: &[u8]) -> Result<(), PptxError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip.write_all(data)?;
        Ok(())
    }

    fn add_stored(&mut self, name: &str, data: &[u8]) -> Result<(), PptxError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.zip.start_file(name, options)?;
        self.zip.write_all(data)?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, PptxError> {
        Ok(self.zip.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_sniff_image_formats() {
        assert_eq!(ImageFormat::sniff(&PNG_SIGNATURE), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a"), None);
    }

    #[test]
    fn test_rejects_non_image_payload() {
        let mut deck = DeckBuilder::default();
        let err = deck.add_image_slide(b"%PDF-1.7".to_vec()).unwrap_err();
        assert!(matches!(err, PptxError::UnsupportedImage { slide: 1 }));
    }

    #[test]
    fn test_empty_deck_is_error() {
        assert!(matches!(DeckBuilder::default().build(), Err(PptxError::Empty)));
    }
}
