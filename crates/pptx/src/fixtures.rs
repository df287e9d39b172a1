//! In-memory container builders for tests.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Builds a ZIP archive entry by entry.
#[derive(Default)]
pub struct ZipBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(self, path: &str, content: &str) -> Self {
        self.bytes(path, content.as_bytes())
    }

    pub fn bytes(mut self, path: &str, content: &[u8]) -> Self {
        self.entries.push((path.to_string(), content.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, content) in self.entries {
            writer.start_file(path, FileOptions::default()).unwrap();
            writer.write_all(&content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

/// A clipboard drawing part with `shapes` inside the locked canvas.
pub fn clipboard_drawing(shapes: &str) -> String {
    format!(
        r#"<a:graphic {NS}><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/lockedCanvas"><lc:lockedCanvas xmlns:lc="http://schemas.openxmlformats.org/drawingml/2006/lockedCanvas"><a:nvGrpSpPr><a:cNvPr id="0" name=""/><a:cNvGrpSpPr/></a:nvGrpSpPr><a:grpSpPr/>{shapes}</lc:lockedCanvas></a:graphicData></a:graphic>"#
    )
}

/// A single-drawing clipboard container.
pub fn clipboard_package(shapes: &str) -> Vec<u8> {
    ZipBuilder::new()
        .file("[Content_Types].xml", CONTENT_TYPES)
        .file("clipboard/drawings/drawing1.xml", &clipboard_drawing(shapes))
        .build()
}

/// Wrap shape-tree content in a full slide part.
pub fn slide_xml(shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld></p:sld>"#
    )
}

struct SlideFixture {
    xml: String,
    rels: Vec<(String, String, String, bool)>,
    /// 1 or 2: which layout/master/theme chain the slide sits on.
    chain: usize,
}

/// `accent1` of the second master's theme.
pub const ALTERNATE_ACCENT1: &str = "7030A0";

/// Builds a minimal but complete presentation: presentation part, one
/// layout, one master with text styles, one theme. Slides added with
/// [`PptxBuilder::alternate_master_slide`] sit on a second chain whose theme
/// differs only in `accent1`.
pub struct PptxBuilder {
    slides: Vec<SlideFixture>,
    layout_shapes: String,
    master_shapes: String,
    master_background: String,
    extra: Vec<(String, Vec<u8>)>,
}

impl PptxBuilder {
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            layout_shapes: String::new(),
            master_shapes: String::new(),
            master_background: String::new(),
            extra: Vec::new(),
        }
    }

    pub fn slide(self, shapes: &str) -> Self {
        self.raw_slide(&slide_xml(shapes))
    }

    pub fn raw_slide(mut self, xml: &str) -> Self {
        self.slides.push(SlideFixture {
            xml: xml.to_string(),
            rels: Vec::new(),
            chain: 1,
        });
        self
    }

    pub fn alternate_master_slide(mut self, shapes: &str) -> Self {
        self.slides.push(SlideFixture {
            xml: slide_xml(shapes),
            rels: Vec::new(),
            chain: 2,
        });
        self
    }

    /// Add a relationship to the most recent slide. `rel_type` is the last
    /// segment of the type URI (`image`, `video`, `media`, ...).
    pub fn slide_rel(mut self, id: &str, rel_type: &str, target: &str, external: bool) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide
                .rels
                .push((id.to_string(), rel_type.to_string(), target.to_string(), external));
        }
        self
    }

    pub fn layout_shapes(mut self, shapes: &str) -> Self {
        self.layout_shapes = shapes.to_string();
        self
    }

    pub fn master_shapes(mut self, shapes: &str) -> Self {
        self.master_shapes = shapes.to_string();
        self
    }

    pub fn master_background(mut self, bg: &str) -> Self {
        self.master_background = bg.to_string();
        self
    }

    pub fn media(mut self, path: &str, bytes: &[u8]) -> Self {
        self.extra.push((path.to_string(), bytes.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let master_xml = format!(
            r#"<p:sldMaster {NS}><p:cSld>{}<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>{}</p:sldMaster>"#,
            self.master_background, self.master_shapes, MASTER_TEXT_STYLES
        );
        let mut zip = ZipBuilder::new()
            .file("[Content_Types].xml", CONTENT_TYPES)
            .file("ppt/presentation.xml", &self.presentation_xml())
            .file("ppt/_rels/presentation.xml.rels", &self.presentation_rels())
            .file(
                "ppt/slideLayouts/slideLayout1.xml",
                &format!(
                    r#"<p:sldLayout {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sldLayout>"#,
                    self.layout_shapes
                ),
            )
            .file(
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
                &rels_xml(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml", false)]),
            )
            .file("ppt/slideMasters/slideMaster1.xml", &master_xml)
            .file(
                "ppt/slideMasters/_rels/slideMaster1.xml.rels",
                &rels_xml(&[
                    ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml", false),
                    ("rId2", "theme", "../theme/theme1.xml", false),
                ]),
            )
            .file("ppt/theme/theme1.xml", THEME);

        if self.slides.iter().any(|s| s.chain == 2) {
            zip = zip
                .file(
                    "ppt/slideLayouts/slideLayout2.xml",
                    &format!(r#"<p:sldLayout {NS}><p:cSld><p:spTree/></p:cSld></p:sldLayout>"#),
                )
                .file(
                    "ppt/slideLayouts/_rels/slideLayout2.xml.rels",
                    &rels_xml(&[("rId1", "slideMaster", "../slideMasters/slideMaster2.xml", false)]),
                )
                .file("ppt/slideMasters/slideMaster2.xml", &master_xml)
                .file(
                    "ppt/slideMasters/_rels/slideMaster2.xml.rels",
                    &rels_xml(&[
                        ("rId1", "slideLayout", "../slideLayouts/slideLayout2.xml", false),
                        ("rId2", "theme", "../theme/theme2.xml", false),
                    ]),
                )
                .file("ppt/theme/theme2.xml", &THEME.replace("1F4E79", ALTERNATE_ACCENT1));
        }

        for (index, slide) in self.slides.iter().enumerate() {
            let number = index + 1;
            let layout = format!("../slideLayouts/slideLayout{}.xml", slide.chain);
            let mut rels: Vec<(&str, &str, &str, bool)> = vec![("rId1", "slideLayout", layout.as_str(), false)];
            rels.extend(slide.rels.iter().map(|(id, t, target, ext)| (id.as_str(), t.as_str(), target.as_str(), *ext)));
            zip = zip
                .file(&format!("ppt/slides/slide{}.xml", number), &slide.xml)
                .file(&format!("ppt/slides/_rels/slide{}.xml.rels", number), &rels_xml(&rels));
        }
        for (path, bytes) in &self.extra {
            zip = zip.bytes(path, bytes);
        }
        zip.build()
    }

    fn presentation_xml(&self) -> String {
        let ids: String = (0..self.slides.len())
            .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2))
            .collect();
        format!(
            r#"<p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="9144000" cy="5143500"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
        )
    }

    fn presentation_rels(&self) -> String {
        let mut rels = vec![(
            "rId1".to_string(),
            "slideMaster".to_string(),
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        for i in 0..self.slides.len() {
            rels.push((format!("rId{}", i + 2), "slide".to_string(), format!("slides/slide{}.xml", i + 1)));
        }
        let borrowed: Vec<(&str, &str, &str, bool)> =
            rels.iter().map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str(), false)).collect();
        rels_xml(&borrowed)
    }
}

pub fn rels_xml(rels: &[(&str, &str, &str, bool)]) -> String {
    let body: String = rels
        .iter()
        .map(|(id, rel_type, target, external)| {
            let mode = if *external { r#" TargetMode="External""# } else { "" };
            format!(r#"<Relationship Id="{id}" Type="{REL_NS}/{rel_type}" Target="{target}"{mode}/>"#)
        })
        .collect();
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{PKG_REL_NS}">{body}</Relationships>"#)
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

const MASTER_TEXT_STYLES: &str = r#"<p:txStyles><p:titleStyle><a:lvl1pPr algn="ctr"><a:defRPr sz="4400"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle><p:bodyStyle><a:lvl1pPr><a:buChar char="&#8226;"/><a:defRPr sz="2800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr><a:lvl2pPr><a:defRPr sz="2400"/></a:lvl2pPr></p:bodyStyle><p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:otherStyle></p:txStyles>"#;

const THEME: &str = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Fixture"><a:themeElements><a:clrScheme name="Fixture"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="1F4E79"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Fixture"><a:majorFont><a:latin typeface="Georgia"/></a:majorFont><a:minorFont><a:latin typeface="Verdana"/></a:minorFont></a:fontScheme></a:themeElements></a:theme>"#;
