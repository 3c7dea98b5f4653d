//! Shared helpers: minimal OOXML templates and a tiny document.xml reader

#![allow(dead_code)]

use regex::Regex;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

pub const TEMPLATE_MAIN_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
pub const MACRO_TEMPLATE_MAIN_TYPE: &str =
    "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";
pub const DOCUMENT_MAIN_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

pub const SECTION_PROPERTIES: &str =
    r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:bottom="1440"/></w:sectPr>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:customStyle="1" w:styleId="Body0"><w:name w:val="Body 0"/></w:style>
<w:style w:type="paragraph" w:customStyle="1" w:styleId="Body1"><w:name w:val="Body 1"/></w:style>
<w:style w:type="paragraph" w:customStyle="1" w:styleId="Bullet0"><w:name w:val="Bullet 0"/></w:style>
<w:style w:type="paragraph" w:customStyle="1" w:styleId="Code0"><w:name w:val="Code 0"/></w:style>
<w:style w:type="character" w:styleId="Strong"><w:name w:val="Strong"/></w:style>
</w:styles>"#;

/// Template flavour to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Dotx,
    Dotm,
}

/// Write a minimal but complete Word template
pub fn write_template(path: &Path, kind: TemplateKind) {
    let main_type = match kind {
        TemplateKind::Dotx => TEMPLATE_MAIN_TYPE,
        TemplateKind::Dotm => MACRO_TEMPLATE_MAIN_TYPE,
    };

    let vba_default = if kind == TemplateKind::Dotm {
        r#"<Default Extension="bin" ContentType="application/vnd.ms-office.vbaProject"/>"#
    } else {
        ""
    };
    let content_types = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">{}<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="{}"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#,
        vba_default, main_type
    );

    let package_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

    let vba_rel = if kind == TemplateKind::Dotm {
        r#"<Relationship Id="rId9" Type="http://schemas.microsoft.com/office/2006/relationships/vbaProject" Target="vbaProject.bin"/>"#
    } else {
        ""
    };
    let document_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>{}</Relationships>"#,
        vba_rel
    );

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Template placeholder</w:t></w:r></w:p>{}</w:body></w:document>"#,
        SECTION_PROPERTIES
    );

    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut parts: Vec<(&str, Vec<u8>)> = vec![
        ("[Content_Types].xml", content_types.into_bytes()),
        ("_rels/.rels", package_rels.as_bytes().to_vec()),
        ("word/document.xml", document.into_bytes()),
        ("word/styles.xml", STYLES_XML.as_bytes().to_vec()),
        ("word/_rels/document.xml.rels", document_rels.into_bytes()),
    ];
    if kind == TemplateKind::Dotm {
        parts.push(("word/vbaProject.bin", vec![0xD0, 0xCF, 0x11, 0xE0]));
    }

    for (name, contents) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(&contents).unwrap();
    }
    zip.finish().unwrap();
}

/// Names of all parts in a package
pub fn part_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    archive.file_names().map(str::to_string).collect()
}

/// Read one part of a package as text
pub fn read_part(path: &Path, name: &str) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut contents = String::new();
    part.read_to_string(&mut contents).unwrap();
    contents
}

/// Paragraph style id and visible text, in document order
pub fn paragraphs(document_xml: &str) -> Vec<(Option<String>, String)> {
    let paragraph_re = Regex::new(r"(?s)<w:p>(.*?)</w:p>").unwrap();
    let style_re = Regex::new(r#"<w:pStyle w:val="([^"]*)"/>"#).unwrap();
    let content_re = Regex::new(r"<w:t[^>]*>([^<]*)</w:t>|<w:br/>|<w:tab/>").unwrap();

    paragraph_re
        .captures_iter(document_xml)
        .map(|caps| {
            let body = &caps[1];
            let style = style_re.captures(body).map(|c| c[1].to_string());
            let text = content_re
                .captures_iter(body)
                .map(|c| match c.get(1) {
                    Some(t) => unescape(t.as_str()),
                    None if &c[0] == "<w:br/>" => "\n".to_string(),
                    None => "\t".to_string(),
                })
                .collect();
            (style, text)
        })
        .collect()
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Shorthand for an expected paragraph
pub fn para(style: &str, text: &str) -> (Option<String>, String) {
    (Some(style.to_string()), text.to_string())
}
