use slidepress_pptx::{DeckBuilder, PptxError, SlideSize};
use std::io::{Cursor, Read};
use zip::ZipArchive;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Smallest payload that passes the PNG signature check.
fn fake_png(tag: u8) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[tag; 16]);
    bytes
}

fn read_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut text = String::new();
    archive.by_name(name)?.read_to_string(&mut text)?;
    Ok(text)
}

fn open(bytes: Vec<u8>) -> Result<ZipArchive<Cursor<Vec<u8>>>, Box<dyn std::error::Error>> {
    Ok(ZipArchive::new(Cursor::new(bytes))?)
}

#[test]
fn test_deck_has_one_slide_per_entry_in_order() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut deck = DeckBuilder::new(SlideSize::for_canvas(1920, 1080)).with_title("Quarterly review");
    deck.add_image_slide(fake_png(1))?;
    deck.add_text_slide("Slide 2", Some("Rendering timed out"));
    deck.add_image_slide(fake_png(3))?;
    assert_eq!(deck.slide_count(), 3);

    let mut archive = open(deck.build()?)?;

    let presentation = read_part(&mut archive, "ppt/presentation.xml")?;
    assert_eq!(presentation.matches("<p:sldId ").count(), 3);

    let rels = read_part(&mut archive, "ppt/_rels/presentation.xml.rels")?;
    let first = rels.find("slides/slide1.xml").ok_or("slide1 missing")?;
    let second = rels.find("slides/slide2.xml").ok_or("slide2 missing")?;
    let third = rels.find("slides/slide3.xml").ok_or("slide3 missing")?;
    assert!(first < second && second < third);

    // Picture slides keep their own media; the text slide references none.
    let mut media = Vec::new();
    archive.by_name("ppt/media/image2.png")?.read_to_end(&mut media)?;
    assert_eq!(media, fake_png(3));
    let slide2_rels = read_part(&mut archive, "ppt/slides/_rels/slide2.xml.rels")?;
    assert!(!slide2_rels.contains("../media/"));
    let slide3_rels = read_part(&mut archive, "ppt/slides/_rels/slide3.xml.rels")?;
    assert!(slide3_rels.contains("../media/image2.png"));

    let text_slide = read_part(&mut archive, "ppt/slides/slide2.xml")?;
    assert!(text_slide.contains("Slide 2"));
    assert!(text_slide.contains("Rendering timed out"));

    let core = read_part(&mut archive, "docProps/core.xml")?;
    assert!(core.contains("Quarterly review"));
    Ok(())
}

#[test]
fn test_picture_covers_whole_slide() -> TestResult {
    let size = SlideSize::for_canvas(1024, 768);
    let mut deck = DeckBuilder::new(size);
    deck.add_image_slide(fake_png(7))?;

    let mut archive = open(deck.build()?)?;
    let presentation = read_part(&mut archive, "ppt/presentation.xml")?;
    assert!(presentation.contains(&format!(r#"<p:sldSz cx="{}" cy="{}""#, size.cx, size.cy)));

    let slide = read_part(&mut archive, "ppt/slides/slide1.xml")?;
    assert!(slide.contains(r#"<a:off x="0" y="0"/>"#));
    assert!(slide.contains(&format!(r#"<a:ext cx="{}" cy="{}"/>"#, size.cx, size.cy)));
    Ok(())
}

#[test]
fn test_content_types_cover_every_slide() -> TestResult {
    let mut deck = DeckBuilder::default();
    for i in 0..4 {
        deck.add_image_slide(fake_png(i))?;
    }
    let mut archive = open(deck.build()?)?;
    let types = read_part(&mut archive, "[Content_Types].xml")?;
    for n in 1..=4 {
        assert!(types.contains(&format!("/ppt/slides/slide{}.xml", n)));
    }
    assert!(types.contains(r#"Extension="png""#));
    Ok(())
}

#[test]
fn test_invalid_size_is_rejected() {
    let mut deck = DeckBuilder::new(SlideSize::new(0, 100));
    deck.add_text_slide("only", None);
    assert!(matches!(deck.build(), Err(PptxError::InvalidSize { cx: 0, cy: 100 })));
}

#[test]
fn test_control_characters_never_reach_any_part() -> TestResult {
    let mut deck = DeckBuilder::default().with_title("Revenue\u{1}");
    deck.add_text_slide("Revenue\u{1}", Some("Q3\u{8} figures"));
    deck.add_image_slide(fake_png(2))?;

    let mut archive = open(deck.build()?)?;
    let names: Vec<String> = archive.file_names().map(str::to_owned).collect();
    for name in names.iter().filter(|n| n.ends_with(".xml") || n.ends_with(".rels")) {
        let xml = read_part(&mut archive, name)?;
        assert!(
            !xml.chars().any(|c| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')),
            "{} carries a control character",
            name
        );

        let mut reader = quick_xml::Reader::from_str(&xml);
        while !matches!(reader.read_event()?, quick_xml::events::Event::Eof) {}
    }

    let slide = read_part(&mut archive, "ppt/slides/slide1.xml")?;
    assert!(slide.contains(">Revenue<"));
    assert!(slide.contains("Q3 figures"));
    let core = read_part(&mut archive, "docProps/core.xml")?;
    assert!(core.contains("Revenue"));
    Ok(())
}
