//! Template-backed DOCX document host
//!
//! A Word template (.dotx, .dotm) or document (.docx) is a ZIP archive of XML
//! parts. This host:
//! 1. Reads every part of the template into memory
//! 2. Splits `word/document.xml` around its body content, keeping the
//!    body-level `<w:sectPr>` (page setup, header/footer references)
//! 3. Indexes the paragraph styles defined in `word/styles.xml`
//! 4. Buffers appended paragraphs and renders them as raw WordprocessingML
//! 5. On save, writes all parts back, converting a template package into a
//!    document package (main content type, VBA parts dropped)
//!
//! Everything else in the template (theme, numbering, headers, footers,
//! document properties) is copied unchanged.

use crate::config::CodeSpanFormat;
use crate::host::{check_range, DocumentHost, HostError, ParagraphHandle};
use crate::markdown::FormatKind;
use crate::styles::FALLBACK_STYLE;
use itertools::Itertools;
use regex::Regex;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::LazyLock;
use zip::read::ZipArchive;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// Content type of the main part of a plain .docx
const DOCUMENT_MAIN_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Main part content types that must become [`DOCUMENT_MAIN_TYPE`] on save
const CONVERTIBLE_MAIN_TYPES: [&str; 3] = [
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml",
    "application/vnd.ms-word.template.macroEnabledTemplate.main+xml",
    "application/vnd.ms-word.document.macroEnabled.main+xml",
];

static STYLE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<w:style\b([^>]*)>").unwrap());
static STYLE_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"w:styleId="([^"]*)""#).unwrap());
static STYLE_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"w:type="([^"]*)""#).unwrap());
static STYLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<w:name\s+w:val="([^"]*)""#).unwrap());
static SECT_PR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<w:sectPr[\s/>]").unwrap());

static VBA_RELATIONSHIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<Relationship\s[^>]*Target="[^"]*vba(?:Project\.bin|Data\.xml)"[^>]*/>"#).unwrap()
});
static VBA_CONTENT_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<Override\s[^>]*PartName="/word/vba[^"]*"[^>]*/>|<Default\s[^>]*ContentType="application/vnd\.ms-office\.vbaProject"[^>]*/>"#,
    )
    .unwrap()
});

/// A style declared in `word/styles.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEntry {
    pub id: String,
    pub name: String,
    pub paragraph: bool,
}

/// Index of the styles a template defines
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    entries: Vec<StyleEntry>,
}

impl StyleCatalog {
    /// Parse the `<w:style>` declarations of a styles part
    pub fn parse(styles_xml: &str) -> Self {
        let mut entries = Vec::new();

        for caps in STYLE_OPEN_RE.captures_iter(styles_xml) {
            let (Some(tag), Some(attrs)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let attrs = attrs.as_str();
            let Some(id) = STYLE_ID_RE.captures(attrs).map(|c| c[1].to_string()) else {
                continue;
            };

            // Type defaults to paragraph when absent
            let paragraph = STYLE_TYPE_RE
                .captures(attrs)
                .is_none_or(|c| &c[1] == "paragraph");

            let name = if attrs.trim_end().ends_with('/') {
                None
            } else {
                let rest = &styles_xml[tag.end()..];
                let body = rest.find("</w:style>").map_or(rest, |end| &rest[..end]);
                STYLE_NAME_RE
                    .captures(body)
                    .map(|c| unescape_xml(&c[1]))
            };

            entries.push(StyleEntry {
                name: name.unwrap_or_else(|| id.clone()),
                id,
                paragraph,
            });
        }

        Self { entries }
    }

    /// Find a paragraph style by name or style id (case-insensitive)
    pub fn find_paragraph_style(&self, name: &str) -> Option<&StyleEntry> {
        let by_name = self
            .entries
            .iter()
            .filter(|e| e.paragraph)
            .find(|e| e.name.eq_ignore_ascii_case(name));
        by_name.or_else(|| {
            self.entries
                .iter()
                .filter(|e| e.paragraph)
                .find(|e| e.id.eq_ignore_ascii_case(name))
        })
    }

    /// Names of all paragraph styles, in declaration order
    pub fn paragraph_style_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.paragraph)
            .map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `word/document.xml` split around its body content
#[derive(Debug, Clone, PartialEq, Eq)]
struct DocumentXml {
    /// Everything up to and including the `<w:body>` start tag
    head: String,
    /// Existing body content before the section properties
    content: String,
    /// Body-level `<w:sectPr>`, empty if the body has none
    section: String,
    /// `</w:body>` and everything after it
    tail: String,
}

impl DocumentXml {
    fn parse(xml: &str) -> Result<Self, HostError> {
        let body_open = xml
            .find("<w:body")
            .ok_or_else(|| HostError::Format("Could not find <w:body> in document.xml".to_string()))?;
        let body_start = xml[body_open..]
            .find('>')
            .map(|i| body_open + i + 1)
            .ok_or_else(|| HostError::Format("Unterminated <w:body> tag".to_string()))?;

        // <w:body/> has no content to split
        if xml[..body_start].ends_with("/>") {
            return Ok(Self {
                head: format!("{}<w:body>", &xml[..body_open]),
                content: String::new(),
                section: String::new(),
                tail: format!("</w:body>{}", &xml[body_start..]),
            });
        }

        let body_end = xml
            .rfind("</w:body>")
            .filter(|&end| end >= body_start)
            .ok_or_else(|| HostError::Format("Could not find </w:body> in document.xml".to_string()))?;

        let inner = &xml[body_start..body_end];
        let (content, section) = split_section_properties(inner);

        Ok(Self {
            head: xml[..body_start].to_string(),
            content: content.to_string(),
            section: section.to_string(),
            tail: xml[body_end..].to_string(),
        })
    }
}

/// Separate the trailing body-level `<w:sectPr>` from body content
///
/// Paragraph-level section breaks live inside `<w:pPr>` and are always
/// followed by more body content, so the first candidate with no closing
/// paragraph, table or content control after it is the body-level one.
fn split_section_properties(inner: &str) -> (&str, &str) {
    for candidate in SECT_PR_RE.find_iter(inner) {
        let rest = &inner[candidate.start()..];
        if rest.contains("</w:p>") || rest.contains("</w:tbl>") || rest.contains("</w:sdt>") {
            continue;
        }
        let trimmed_len = inner.trim_end().len();
        return (
            &inner[..candidate.start()],
            &inner[candidate.start()..trimmed_len],
        );
    }
    (inner, "")
}

/// A buffered paragraph
#[derive(Debug, Clone, Default)]
struct DocxParagraph {
    text: String,
    style_id: Option<String>,
    formats: Vec<(usize, usize, FormatKind)>,
}

/// Template-backed DOCX host
#[derive(Debug)]
pub struct DocxHost {
    parts: Vec<(String, Vec<u8>)>,
    document: DocumentXml,
    styles: StyleCatalog,
    paragraphs: Vec<DocxParagraph>,
    code_format: CodeSpanFormat,
    released: bool,
}

impl DocxHost {
    /// Open a template package
    ///
    /// # Parameters
    /// * `template_path` - Path to a .dotx, .dotm or .docx file
    /// * `code_format` - Presentation used for inline code spans
    ///
    /// # Returns
    /// * `Ok(DocxHost)` - Host holding every part of the template
    /// * `Err(HostError)` - The file is unreadable or not a WordprocessingML package
    pub fn open(template_path: &Path, code_format: CodeSpanFormat) -> Result<Self, HostError> {
        log::info!("Opening template {}", template_path.display());

        let template_file = std::fs::File::open(template_path)?;
        let mut template_zip = ZipArchive::new(template_file)?;

        let mut parts = Vec::with_capacity(template_zip.len());
        for i in 0..template_zip.len() {
            let mut file = template_zip.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            parts.push((name, contents));
        }

        if !parts.iter().any(|(name, _)| name == CONTENT_TYPES_PART) {
            return Err(HostError::Format(format!(
                "Template has no {}",
                CONTENT_TYPES_PART
            )));
        }

        let document_xml = part(&parts, DOCUMENT_PART)
            .ok_or_else(|| HostError::Format(format!("Template has no {}", DOCUMENT_PART)))?;
        let document = DocumentXml::parse(&String::from_utf8_lossy(document_xml))?;

        let styles = part(&parts, STYLES_PART)
            .map(|xml| StyleCatalog::parse(&String::from_utf8_lossy(xml)))
            .unwrap_or_default();

        log::info!(
            "Template loaded: {} parts, {} styles",
            parts.len(),
            styles.len()
        );

        Ok(Self {
            parts,
            document,
            styles,
            paragraphs: Vec::new(),
            code_format,
            released: false,
        })
    }

    pub fn styles(&self) -> &StyleCatalog {
        &self.styles
    }

    fn ensure_live(&self) -> Result<(), HostError> {
        if self.released {
            Err(HostError::Released)
        } else {
            Ok(())
        }
    }

    fn paragraph_mut(&mut self, paragraph: ParagraphHandle) -> Result<&mut DocxParagraph, HostError> {
        self.ensure_live()?;
        self.paragraphs
            .get_mut(paragraph.index())
            .ok_or(HostError::UnknownParagraph(paragraph))
    }

    /// Render `word/document.xml` with the buffered paragraphs appended
    fn render_document_xml(&self) -> String {
        let mut xml = String::with_capacity(
            self.document.head.len() + self.document.content.len() + self.paragraphs.len() * 128,
        );
        xml.push_str(&self.document.head);
        xml.push_str(&self.document.content);
        for paragraph in &self.paragraphs {
            xml.push_str(&generate_paragraph_xml(paragraph, &self.code_format));
        }
        xml.push_str(&self.document.section);
        xml.push_str(&self.document.tail);
        xml
    }
}

impl DocumentHost for DocxHost {
    fn clear_content(&mut self) -> Result<(), HostError> {
        self.ensure_live()?;
        self.document.content.clear();
        self.paragraphs.clear();
        Ok(())
    }

    fn append_paragraph(&mut self) -> Result<ParagraphHandle, HostError> {
        self.ensure_live()?;
        self.paragraphs.push(DocxParagraph::default());
        Ok(ParagraphHandle(self.paragraphs.len() - 1))
    }

    fn set_paragraph_text(&mut self, paragraph: ParagraphHandle, text: &str) -> Result<(), HostError> {
        let target = self.paragraph_mut(paragraph)?;
        target.text = text.to_string();
        target.formats.clear();
        Ok(())
    }

    fn apply_character_format(
        &mut self,
        paragraph: ParagraphHandle,
        start: usize,
        end: usize,
        kind: FormatKind,
    ) -> Result<(), HostError> {
        let target = self.paragraph_mut(paragraph)?;
        check_range(&target.text, start, end)?;
        target.formats.push((start, end, kind));
        Ok(())
    }

    fn style_exists(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(FALLBACK_STYLE) || self.styles.find_paragraph_style(name).is_some()
    }

    fn apply_style(&mut self, paragraph: ParagraphHandle, name: &str) -> Result<(), HostError> {
        let style_id = match self.styles.find_paragraph_style(name) {
            Some(entry) => Some(entry.id.clone()),
            // Word's default paragraph style needs no explicit reference
            None if name.eq_ignore_ascii_case(FALLBACK_STYLE) => None,
            None => return Err(HostError::UnknownStyle(name.to_string())),
        };
        self.paragraph_mut(paragraph)?.style_id = style_id;
        Ok(())
    }

    fn save_as(&mut self, path: &Path) -> Result<(), HostError> {
        self.ensure_live()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let document_xml = self.render_document_xml();
        let output_file = std::fs::File::create(path)?;
        let mut output_zip = ZipWriter::new(output_file);
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for (name, contents) in &self.parts {
            if is_vba_part(name) {
                log::debug!("Dropping macro part {}", name);
                continue;
            }

            let modified_contents = match name.as_str() {
                DOCUMENT_PART => document_xml.as_bytes().to_vec(),
                CONTENT_TYPES_PART => convert_content_types(contents),
                DOCUMENT_RELS_PART => strip_vba_relationships(contents),
                _ => contents.clone(),
            };

            output_zip.start_file(name.as_str(), options)?;
            output_zip.write_all(&modified_contents)?;
        }

        output_zip.finish()?;

        log::info!(
            "Wrote {} paragraphs to {}",
            self.paragraphs.len(),
            path.display()
        );
        Ok(())
    }

    fn release(&mut self) {
        if !self.released {
            self.parts.clear();
            self.paragraphs.clear();
            self.released = true;
        }
    }
}

fn part<'a>(parts: &'a [(String, Vec<u8>)], name: &str) -> Option<&'a [u8]> {
    parts
        .iter()
        .find(|(part_name, _)| part_name == name)
        .map(|(_, contents)| contents.as_slice())
}

/// Macro parts a .dotm carries that a .docx must not
fn is_vba_part(name: &str) -> bool {
    name.starts_with("word/vbaProject")
        || name.starts_with("word/vbaData")
        || name.starts_with("word/_rels/vbaProject")
}

/// Rewrite \[Content_Types\].xml for a macro-free document package
fn convert_content_types(content_types_xml: &[u8]) -> Vec<u8> {
    let mut xml = String::from_utf8_lossy(content_types_xml).into_owned();
    for main_type in CONVERTIBLE_MAIN_TYPES {
        xml = xml.replace(main_type, DOCUMENT_MAIN_TYPE);
    }
    VBA_CONTENT_TYPE_RE.replace_all(&xml, "").into_owned().into_bytes()
}

/// Remove relationships pointing at macro parts
fn strip_vba_relationships(rels_xml: &[u8]) -> Vec<u8> {
    let xml = String::from_utf8_lossy(rels_xml);
    VBA_RELATIONSHIP_RE.replace_all(&xml, "").into_owned().into_bytes()
}

/// Generate OOXML for a paragraph, splitting runs at format boundaries
fn generate_paragraph_xml(paragraph: &DocxParagraph, code_format: &CodeSpanFormat) -> String {
    let mut xml = String::from("<w:p>");

    if let Some(style_id) = &paragraph.style_id {
        xml.push_str(&format!(
            r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#,
            escape_xml(style_id)
        ));
    }

    let text = &paragraph.text;
    let boundaries = paragraph
        .formats
        .iter()
        .flat_map(|&(start, end, _)| [start, end])
        .chain([0, text.len()])
        .sorted_unstable()
        .dedup();

    for (start, end) in boundaries.tuple_windows() {
        let kinds: Vec<FormatKind> = paragraph
            .formats
            .iter()
            .filter(|&&(s, e, _)| s <= start && end <= e)
            .map(|&(_, _, kind)| kind)
            .collect();
        xml.push_str(&generate_run_xml(&text[start..end], &kinds, code_format));
    }

    xml.push_str("</w:p>");
    xml
}

/// Generate OOXML for a text run with formatting
fn generate_run_xml(text: &str, kinds: &[FormatKind], code_format: &CodeSpanFormat) -> String {
    let bold = kinds.iter().any(|k| k.is_bold());
    let italic = kinds.iter().any(|k| k.is_italic());
    let code = kinds.contains(&FormatKind::Code);

    let mut xml = String::from("<w:r>");

    // Property order follows the CT_RPr schema sequence
    if bold || italic || code {
        xml.push_str("<w:rPr>");
        if code {
            let font = escape_xml(&code_format.font);
            xml.push_str(&format!(
                r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
                font
            ));
        }
        if bold {
            xml.push_str("<w:b/><w:bCs/>");
        }
        if italic {
            xml.push_str("<w:i/><w:iCs/>");
        }
        if code {
            let size = code_format.half_points();
            xml.push_str(&format!(
                r#"<w:color w:val="{}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#,
                escape_xml(&code_format.color)
            ));
            xml.push_str(&format!(
                r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                escape_xml(&code_format.shading)
            ));
        }
        xml.push_str("</w:rPr>");
    }

    for (line_idx, line) in text.split('\n').enumerate() {
        if line_idx > 0 {
            xml.push_str("<w:br/>");
        }
        for (tab_idx, piece) in line.split('\t').enumerate() {
            if tab_idx > 0 {
                xml.push_str("<w:tab/>");
            }
            if !piece.is_empty() {
                xml.push_str(&format!(
                    r#"<w:t xml:space="preserve">{}</w:t>"#,
                    escape_xml(piece)
                ));
            }
        }
    }

    xml.push_str("</w:r>");
    xml
}

/// Escape special XML characters, dropping characters XML 1.0 forbids
fn escape_xml(s: &str) -> String {
    s.chars()
        .filter(|&c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect::<String>()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
