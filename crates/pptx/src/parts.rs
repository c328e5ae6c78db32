//! XML bodies of the package parts.
//!
//! Fixed parts (master, layout, theme, properties) are constants; per-slide
//! parts are generated with all user text escaped.

use crate::units::SlideSize;
use quick_xml::escape::escape;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS_PML: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub const REL_PRES_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
pub const REL_VIEW_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
pub const REL_TABLE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";

/// First id PowerPoint accepts in `p:sldIdLst`.
const FIRST_SLIDE_ID: usize = 256;

/// A single relationship entry.
pub struct Relationship<'a> {
    pub id: String,
    pub kind: &'a str,
    pub target: String,
}

pub fn relationships(rels: &[Relationship<'_>]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for rel in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            rel.id,
            rel.kind,
            escape(rel.target.as_str())
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

pub fn content_types(slide_count: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Default Extension="png" ContentType="image/png"/>"#);
    xml.push_str(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/presProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presProps+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/viewProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/tableStyles.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#);
    for n in 1..=slide_count {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            n
        ));
    }
    xml.push_str("</Types>");
    xml
}

/// `ppt/presentation.xml`. Slide relationships start at `first_slide_rel`.
pub fn presentation(size: SlideSize, slide_count: usize, first_slide_rel: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(r#"<p:presentation {} saveSubsetFonts="1">"#, NS_PML));
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    xml.push_str("<p:sldIdLst>");
    for i in 0..slide_count {
        xml.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            FIRST_SLIDE_ID + i,
            first_slide_rel + i
        ));
    }
    xml.push_str("</p:sldIdLst>");
    xml.push_str(&format!(r#"<p:sldSz cx="{}" cy="{}"/>"#, size.cx, size.cy));
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    xml
}

fn group_shape_header() -> &'static str {
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
}

/// A slide holding one picture stretched over the whole slide.
pub fn image_slide(size: SlideSize, number: usize, image_rel: &str) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!("<p:sld {}><p:cSld><p:spTree>", NS_PML));
    xml.push_str(group_shape_header());
    xml.push_str(&format!(
        concat!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="2" name="Slide {n}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
            r#"<p:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
            r#"<p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        ),
        n = number,
        rel = image_rel,
        cx = size.cx,
        cy = size.cy,
    ));
    xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    xml
}

/// A slide with a centred headline and an optional smaller second line.
pub fn text_slide(size: SlideSize, title: &str, subtitle: Option<&str>) -> String {
    let margin_x = size.cx / 10;
    let box_width = size.cx - 2 * margin_x;
    let title_height = size.cy / 5;
    let title_y = size.cy / 2 - title_height;

    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!("<p:sld {}><p:cSld><p:spTree>", NS_PML));
    xml.push_str(group_shape_header());
    xml.push_str(&text_box(2, "Title", margin_x, title_y, box_width, title_height, 4000, title));
    if let Some(subtitle) = subtitle {
        xml.push_str(&text_box(
            3,
            "Subtitle",
            margin_x,
            size.cy / 2,
            box_width,
            size.cy / 8,
            1800,
            subtitle,
        ));
    }
    xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    xml
}

#[allow(clippy::too_many_arguments)]
fn text_box(
    id: u32,
    name: &str,
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
    font_size: u32,
    text: &str,
) -> String {
    format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
            r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
            r#"<p:txBody><a:bodyPr anchor="ctr"/><a:lstStyle/><a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" sz="{sz}" dirty="0"/><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        ),
        id = id,
        name = name,
        x = x,
        y = y,
        cx = cx,
        cy = cy,
        sz = font_size,
        text = xml_text(text),
    )
}

/// Escapes `text` for element content, dropping characters XML 1.0 cannot carry.
fn xml_text(text: &str) -> String {
    let clean: String = text.chars().filter(|&c| is_xml_char(c)).collect();
    escape(clean.as_str()).into_owned()
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}

pub fn slide_master() -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!("<p:sldMaster {}><p:cSld>", NS_PML));
    xml.push_str(r#"<p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>"#);
    xml.push_str(group_shape_header());
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#);
    xml.push_str(r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#);
    xml.push_str("<p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles>");
    xml.push_str("</p:sldMaster>");
    xml
}

pub fn slide_layout() -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(
        r#"<p:sldLayout {} type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>"#,
        NS_PML
    ));
    xml.push_str(group_shape_header());
    xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>");
    xml
}

pub fn theme() -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Export">"#);
    xml.push_str("<a:themeElements>");
    xml.push_str(r#"<a:clrScheme name="Export">"#);
    xml.push_str(r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#);
    xml.push_str(r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#);
    for (name, rgb) in [
        ("accent1", "4472C4"),
        ("accent2", "ED7D31"),
        ("accent3", "A5A5A5"),
        ("accent4", "FFC000"),
        ("accent5", "5B9BD5"),
        ("accent6", "70AD47"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ] {
        xml.push_str(&format!(r#"<a:{name}><a:srgbClr val="{rgb}"/></a:{name}>"#));
    }
    xml.push_str("</a:clrScheme>");
    xml.push_str(r#"<a:fontScheme name="Export"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>"#);
    xml.push_str(r#"<a:fmtScheme name="Export"><a:fillStyleLst>"#);
    for _ in 0..3 {
        xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#);
    }
    xml.push_str("</a:fillStyleLst><a:lnStyleLst>");
    for width in [6350, 12700, 19050] {
        xml.push_str(&format!(
            r#"<a:ln w="{width}"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#
        ));
    }
    xml.push_str("</a:lnStyleLst><a:effectStyleLst>");
    for _ in 0..3 {
        xml.push_str("<a:effectStyle><a:effectLst/></a:effectStyle>");
    }
    xml.push_str("</a:effectStyleLst><a:bgFillStyleLst>");
    for _ in 0..3 {
        xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#);
    }
    xml.push_str("</a:bgFillStyleLst></a:fmtScheme>");
    xml.push_str("</a:themeElements></a:theme>");
    xml
}

pub fn pres_props() -> String {
    format!("{}<p:presentationPr {}/>", XML_DECL, NS_PML)
}

pub fn view_props() -> String {
    format!(
        r#"{}<p:viewPr {}><p:normalViewPr><p:restoredLeft sz="15620"/><p:restoredTop sz="94660"/></p:normalViewPr><p:gridSpacing cx="76200" cy="76200"/></p:viewPr>"#,
        XML_DECL, NS_PML
    )
}

pub fn table_styles() -> String {
    format!(
        r#"{}<a:tblStyleLst xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
        XML_DECL
    )
}

pub fn core_properties(title: &str) -> String {
    format!(
        concat!(
            "{decl}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{title}</dc:title><dc:creator>slidepress</dc:creator></cp:coreProperties>",
        ),
        decl = XML_DECL,
        title = xml_text(title),
    )
}

pub fn app_properties(slide_count: usize) -> String {
    format!(
        concat!(
            "{decl}",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>slidepress</Application><Slides>{count}</Slides></Properties>",
        ),
        decl = XML_DECL,
        count = slide_count,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_slide_escapes_user_text() {
        let xml = text_slide(SlideSize::widescreen(), "Q&A <draft>", None);
        assert!(xml.contains("Q&amp;A &lt;draft&gt;"));
        assert!(!xml.contains("<draft>"));
    }

    #[test]
    fn test_control_characters_are_dropped_from_text() {
        let xml = text_slide(SlideSize::widescreen(), "Revenue\u{1}\u{8}", Some("Q3\tnotes\u{1F}"));
        assert!(xml.contains(">Revenue<"));
        assert!(xml.contains("Q3\tnotes"));
        assert!(!xml.chars().any(|c| c != '\t' && c != '\n' && c != '\r' && c < '\u{20}'));

        let core = core_properties("Board\u{0}update");
        assert!(core.contains("Boardupdate"));
    }

    #[test]
    fn test_image_slide_is_full_bleed() {
        let xml = image_slide(SlideSize::widescreen(), 1, "rId2");
        assert!(xml.contains(r#"<a:off x="0" y="0"/><a:ext cx="12192000" cy="6858000"/>"#));
        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
    }

    #[test]
    fn test_presentation_lists_slides_in_order() {
        let xml = presentation(SlideSize::widescreen(), 3, 6);
        let first = xml.find(r#"id="256" r:id="rId6""#).unwrap();
        let last = xml.find(r#"id="258" r:id="rId8""#).unwrap();
        assert!(first < last);
    }
}
